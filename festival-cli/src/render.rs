//! Plain-text rendering of the shared view models.

use shared::catalog::{CatalogView, FilterOptions};
use shared::guide::{ArrivalGuide, EssentialsGuide};
use shared::lineup::{LineupView, MY_DAY_TAB_KEY};
use shared::planner::{DayPlan, NO_LINEUP_MESSAGE, NO_LINEUP_TITLE};
use shared::DetailView;

const DISABLED_LINK: &str = "(unavailable)";

pub fn catalog(view: &CatalogView) -> String {
    let mut lines = vec![format!("{}  [{}]", view.count_label, view.sort_label)];
    if view.empty {
        lines.push("No festivals match these filters.".to_string());
    }
    for card in &view.cards {
        lines.push(String::new());
        lines.push(format!("{}  ({})", card.title, card.id));
        lines.push(format!("  {}", card.kicker));
        lines.push(format!("  {}", card.sub));
        if !card.tags.is_empty() {
            lines.push(format!("  {}", card.tags.join(" · ")));
        }
    }
    lines.join("\n")
}

pub fn filters(options: &FilterOptions) -> String {
    [
        format!("Months: {}", options.months.join(", ")),
        format!("Genres: {}", options.genres.join(", ")),
        format!("Quick: {}", options.quick_genres.join(", ")),
    ]
    .join("\n")
}

pub fn detail(view: &DetailView) -> String {
    let links = &view.links;
    let mut lines = vec![
        view.header.name.clone(),
        view.header.meta.clone(),
        view.header.sub.clone(),
        String::new(),
        format!("Dates:    {}", view.facts.dates),
        format!("Location: {}", view.facts.location),
        format!("Genres:   {}", view.facts.genres),
        format!("Camping:  {}", view.facts.camping),
        String::new(),
        format!("Official site: {}", links.official.as_deref().unwrap_or(DISABLED_LINK)),
        format!("Tickets:       {}", links.tickets.as_deref().unwrap_or(DISABLED_LINK)),
        format!("City guide:    {}", links.city_guide.as_deref().unwrap_or(DISABLED_LINK)),
    ];

    lines.push(String::new());
    lines.extend(arrival(&view.arrival));
    lines.push(String::new());
    lines.extend(essentials(&view.essentials));

    if let Some(lineup_view) = &view.lineup {
        lines.push(String::new());
        lines.push(lineup(lineup_view));
    }
    lines.join("\n")
}

fn bullets<'a>(title: &str, items: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut lines = vec![format!("{}:", title)];
    lines.extend(items.into_iter().map(|item| format!("  - {}", item)));
    lines
}

fn arrival(guide: &ArrivalGuide) -> Vec<String> {
    let mut lines = vec!["Arrival".to_string()];
    for window in &guide.windows {
        lines.push(format!("  {}: {}", window.label, window.detail));
    }
    lines.extend(bullets("First steps", &guide.first_steps));
    lines.extend(bullets("Watch out", &guide.warnings));
    if let Some(notes) = &guide.camping_notes {
        lines.extend(bullets("Camping", notes));
    }
    lines
}

fn essentials(guide: &EssentialsGuide) -> Vec<String> {
    let mut lines = vec!["Essentials".to_string()];
    lines.extend(bullets("Pack", &guide.base));
    lines.extend(bullets("Weather", &guide.weather));
    if let Some(camping) = &guide.camping {
        lines.extend(bullets("Camping", camping));
    }
    if let Some(notes) = &guide.notes {
        lines.extend(bullets("Notes", notes));
    }
    lines
}

/// Tab strip followed by the selected tab's content.
pub fn lineup(view: &LineupView) -> String {
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|tab| {
            if tab.selected {
                format!("[{}]", tab.label)
            } else {
                tab.label.clone()
            }
        })
        .collect();
    let mut lines = vec![format!("Lineup  {}", tabs.join("  "))];

    if view.selected_tab() == Some(MY_DAY_TAB_KEY) {
        for item in &view.my_day {
            lines.push(format!(
                "  {:<8} {}  ({})",
                item.time, item.artist, item.stage_name
            ));
        }
        return lines.join("\n");
    }

    for day in view.days.iter().filter(|d| d.active) {
        for stage in &day.stages {
            let marker = if stage.expanded { "▾" } else { "▸" };
            lines.push(format!("{} {}", marker, stage.name));
            if let Some(placeholder) = &stage.placeholder {
                lines.push(format!("    {}", placeholder));
            }
            for slot in &stage.slots {
                lines.push(format!("  {} {:<8} {}", slot.glyph(), slot.time, slot.artist));
            }
        }
    }
    lines.join("\n")
}

pub fn plan(plan: &DayPlan) -> String {
    let mut lines = vec![plan.day_plan_title.clone(), String::new()];
    for entry in &plan.schedule {
        lines.push(format!("{:<8} {}", entry.time, entry.title));
        if !entry.details.is_empty() {
            lines.push(format!("         {}", entry.details));
        }
    }

    lines.push(String::new());
    lines.push(format!("Arrive: {}", plan.arrival.best_time));
    lines.extend(plan.arrival.notes.iter().map(|n| format!("  - {}", n)));

    if !plan.food_breaks.is_empty() {
        lines.push("Food:".to_string());
        lines.extend(
            plan.food_breaks
                .iter()
                .map(|b| format!("  {:<8} {}", b.time, b.idea)),
        );
    }

    lines.push(format!("Leave: {}", plan.exit.when_to_leave));
    lines.extend(plan.exit.notes.iter().map(|n| format!("  - {}", n)));

    if !plan.tips.is_empty() {
        lines.extend(bullets("Tips", &plan.tips));
    }
    lines.join("\n")
}

pub fn no_lineup() -> String {
    format!("{}\n{}", NO_LINEUP_TITLE, NO_LINEUP_MESSAGE)
}

pub fn plan_error(message: &str) -> String {
    format!("Error\n{}", message)
}
