//! Lineup normalization, set-time parsing and the "My Day" view.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::bookmarks::{BookmarkSet, SlotKey};
use crate::models::{Festival, Lineup, Slot};

/// Sort position for set times that do not parse.
pub const UNPARSEABLE_MINUTES: u32 = 9999;

/// Tab key of the synthetic saved-sets tab.
pub const MY_DAY_TAB_KEY: &str = "__myday__";
pub const MY_DAY_TAB_LABEL: &str = "My Day";

const SCHEDULE_TBD: &str = "Schedule TBD";

static ISO_DATE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));
static ORDINAL_DAY_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^day([0-9]+)$").expect("valid regex"));
static TIME_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").expect("valid regex"));
static TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2})(?::([0-9]{2}))?\s*(AM|PM)$").expect("valid regex")
});

pub fn is_iso_date_key(key: &str) -> bool {
    ISO_DATE_KEY.is_match(key)
}

fn ordinal_number(key: &str) -> Option<u64> {
    ORDINAL_DAY_KEY
        .captures(key)
        // Absurdly long ordinals still count as ordinals; they just sort last.
        .map(|caps| caps[1].parse().unwrap_or(u64::MAX))
}

/// Ordered day keys for tab display.
///
/// ISO date keys win and every other key is dropped; otherwise `dayN` keys
/// sorted by N; otherwise all keys lexicographically.
pub fn normalize_day_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let keys: Vec<&str> = keys.into_iter().collect();

    // Fixed-width zero-padded dates order the same as strings.
    let mut iso: Vec<&str> = keys.iter().copied().filter(|k| is_iso_date_key(k)).collect();
    if !iso.is_empty() {
        iso.sort();
        return iso.into_iter().map(String::from).collect();
    }

    let mut ordinals: Vec<(u64, &str)> = keys
        .iter()
        .filter_map(|k| ordinal_number(k).map(|n| (n, *k)))
        .collect();
    if !ordinals.is_empty() {
        ordinals.sort_by_key(|(n, _)| *n);
        return ordinals.into_iter().map(|(_, k)| k.to_string()).collect();
    }

    let mut all = keys;
    all.sort();
    all.into_iter().map(String::from).collect()
}

/// Normalized day keys of an optional lineup; empty means "no lineup data".
pub fn lineup_day_keys(lineup: Option<&Lineup>) -> Vec<String> {
    lineup.map(|l| normalize_day_keys(l.keys())).unwrap_or_default()
}

/// Minutes since midnight for `H:MM`, `HH:MM` or `H[:MM] AM|PM`.
pub fn parse_time_to_minutes(time: &str) -> Option<u32> {
    let s = time.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = TIME_24H.captures(s) {
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        return Some(hours * 60 + minutes);
    }

    if let Some(caps) = TIME_12H.captures(s) {
        let mut hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
        let pm = caps[3].eq_ignore_ascii_case("PM");
        if pm && hours != 12 {
            hours += 12;
        }
        if !pm && hours == 12 {
            hours = 0;
        }
        return Some(hours * 60 + minutes);
    }

    None
}

/// Tab label: `Sat, Apr 11` for dates, upper-cased key otherwise.
pub fn day_label(key: &str) -> String {
    if is_iso_date_key(key) {
        if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            return date.format("%a, %b %-d").to_string();
        }
        return key.to_string();
    }
    key.to_uppercase()
}

/// One bookmarked set as shown on the My Day tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyDayItem {
    pub key: SlotKey,
    pub day_key: String,
    pub day_index: usize,
    pub stage_name: String,
    pub artist: String,
    pub time: String,
    pub minutes: Option<u32>,
}

impl MyDayItem {
    fn sort_minutes(&self) -> u32 {
        self.minutes.unwrap_or(UNPARSEABLE_MINUTES)
    }

    fn chronological(&self, other: &Self) -> Ordering {
        self.day_index
            .cmp(&other.day_index)
            .then_with(|| self.sort_minutes().cmp(&other.sort_minutes()))
            .then_with(|| self.artist.cmp(&other.artist))
    }
}

/// Every bookmarked slot across the normalized days, in chronological order.
pub fn my_day_items(
    festival_id: &str,
    day_keys: &[String],
    lineup: &Lineup,
    saved: &BookmarkSet,
) -> Vec<MyDayItem> {
    let mut items = Vec::new();
    for (day_index, day_key) in day_keys.iter().enumerate() {
        let Some(day) = lineup.day(day_key) else {
            continue;
        };
        for stage in &day.stages {
            for slot in &stage.slots {
                let key = SlotKey::new(festival_id, day_key, &stage.name, slot);
                if !saved.contains(&key) {
                    continue;
                }
                items.push(MyDayItem {
                    key,
                    day_key: day_key.clone(),
                    day_index,
                    stage_name: stage.name.clone(),
                    artist: slot.artist.clone(),
                    time: slot.time.clone(),
                    minutes: parse_time_to_minutes(&slot.time),
                });
            }
        }
    }
    items.sort_by(MyDayItem::chronological);
    items
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupTab {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub key: SlotKey,
    pub time: String,
    pub artist: String,
    pub starred: bool,
}

impl SlotView {
    /// `★` when saved, `☆` otherwise.
    pub fn glyph(&self) -> &'static str {
        if self.starred {
            "★"
        } else {
            "☆"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePanel {
    pub name: String,
    pub expanded: bool,
    pub slots: Vec<SlotView>,
    /// Shown instead of slots when the stage has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPanel {
    pub key: String,
    pub active: bool,
    pub stages: Vec<StagePanel>,
}

/// Everything the lineup section needs, derived from the festival and the
/// persisted bookmark set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupView {
    pub tabs: Vec<LineupTab>,
    pub days: Vec<DayPanel>,
    pub my_day: Vec<MyDayItem>,
}

impl LineupView {
    /// Build the view, or `None` when the festival has no usable lineup and
    /// the section should be hidden.
    pub fn build(festival: &Festival, saved: &BookmarkSet) -> Option<Self> {
        let lineup = festival.lineup.as_ref()?;
        let day_keys = normalize_day_keys(lineup.keys());
        if day_keys.is_empty() {
            return None;
        }

        let my_day = my_day_items(&festival.id, &day_keys, lineup, saved);

        let mut tabs: Vec<LineupTab> = day_keys
            .iter()
            .enumerate()
            .map(|(idx, key)| LineupTab {
                key: key.clone(),
                label: day_label(key),
                selected: idx == 0,
            })
            .collect();
        if !my_day.is_empty() {
            tabs.push(LineupTab {
                key: MY_DAY_TAB_KEY.to_string(),
                label: MY_DAY_TAB_LABEL.to_string(),
                selected: false,
            });
        }

        let days = day_keys
            .iter()
            .enumerate()
            .map(|(idx, key)| DayPanel {
                key: key.clone(),
                active: idx == 0,
                stages: stage_panels(&festival.id, key, lineup, saved, idx == 0),
            })
            .collect();

        Some(Self { tabs, days, my_day })
    }

    /// Mark `key` as the selected tab and its panel as active. Unknown keys
    /// leave the selection unchanged.
    pub fn select(&mut self, key: &str) {
        if !self.tabs.iter().any(|t| t.key == key) {
            return;
        }
        for tab in &mut self.tabs {
            tab.selected = tab.key == key;
        }
        for day in &mut self.days {
            day.active = day.key == key;
        }
    }

    pub fn selected_tab(&self) -> Option<&str> {
        self.tabs.iter().find(|t| t.selected).map(|t| t.key.as_str())
    }

    pub fn has_my_day(&self) -> bool {
        !self.my_day.is_empty()
    }
}

fn stage_panels(
    festival_id: &str,
    day_key: &str,
    lineup: &Lineup,
    saved: &BookmarkSet,
    first_day: bool,
) -> Vec<StagePanel> {
    let stages = lineup.day(day_key).map(|d| d.stages.as_slice()).unwrap_or_default();
    if stages.is_empty() {
        return vec![StagePanel {
            name: String::new(),
            expanded: true,
            slots: Vec::new(),
            placeholder: Some(SCHEDULE_TBD.to_string()),
        }];
    }

    stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            let slots: Vec<SlotView> = stage
                .slots
                .iter()
                .map(|slot| slot_view(festival_id, day_key, &stage.name, slot, saved))
                .collect();
            let placeholder = slots.is_empty().then(|| SCHEDULE_TBD.to_string());
            StagePanel {
                name: stage.name.clone(),
                expanded: first_day && idx == 0,
                slots,
                placeholder,
            }
        })
        .collect()
}

fn slot_view(
    festival_id: &str,
    day_key: &str,
    stage_name: &str,
    slot: &Slot,
    saved: &BookmarkSet,
) -> SlotView {
    let key = SlotKey::new(festival_id, day_key, stage_name, slot);
    SlotView {
        starred: saved.contains(&key),
        key,
        time: slot.time.clone(),
        artist: slot.artist.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn festival(lineup: serde_json::Value) -> Festival {
        serde_json::from_value(json!({
            "id": "fest",
            "name": "Fest",
            "startDate": "2026-04-10",
            "endDate": "2026-04-11",
            "lineup": lineup
        }))
        .unwrap()
    }

    fn key(day: &str, stage: &str, artist: &str, time: &str) -> SlotKey {
        SlotKey::new("fest", day, stage, &Slot::new(artist, time))
    }

    #[test]
    fn test_iso_keys_win_and_sort() {
        let keys = normalize_day_keys(["day1", "2026-04-11", "2026-04-10"]);
        assert_eq!(keys, ["2026-04-10", "2026-04-11"]);
    }

    #[test]
    fn test_ordinal_keys_sort_numerically() {
        let keys = normalize_day_keys(["day2", "day10", "day1"]);
        assert_eq!(keys, ["day1", "day2", "day10"]);
        let keys = normalize_day_keys(["DAY3", "Day1", "friday"]);
        assert_eq!(keys, ["Day1", "DAY3"]);
    }

    #[test]
    fn test_other_keys_sort_lexicographically() {
        let keys = normalize_day_keys(["sunday", "friday", "saturday"]);
        assert_eq!(keys, ["friday", "saturday", "sunday"]);
    }

    #[test]
    fn test_empty_keys() {
        assert!(normalize_day_keys(Vec::<&str>::new()).is_empty());
        assert!(lineup_day_keys(None).is_empty());
    }

    #[test]
    fn test_parse_times() {
        assert_eq!(parse_time_to_minutes("18:45"), Some(1125));
        assert_eq!(parse_time_to_minutes("6:45 PM"), Some(1125));
        assert_eq!(parse_time_to_minutes("12 AM"), Some(0));
        assert_eq!(parse_time_to_minutes("12 PM"), Some(720));
        assert_eq!(parse_time_to_minutes("9pm"), Some(21 * 60));
        assert_eq!(parse_time_to_minutes(" 7:05 am "), Some(425));
        assert_eq!(parse_time_to_minutes("not a time"), None);
        assert_eq!(parse_time_to_minutes(""), None);
        assert_eq!(parse_time_to_minutes("18:4"), None);
    }

    #[test]
    fn test_day_labels() {
        assert_eq!(day_label("2026-04-11"), "Sat, Apr 11");
        assert_eq!(day_label("day2"), "DAY2");
    }

    #[test]
    fn test_my_day_orders_by_day_first() {
        let fest = festival(json!({
            "day1": { "Main": [{ "artist": "Late Act", "time": "11:00 PM" }] },
            "day2": { "Main": [{ "artist": "Early Act", "time": "1:00 PM" }] }
        }));
        let mut saved = BookmarkSet::default();
        saved.toggle(key("day2", "Main", "Early Act", "1:00 PM"));
        saved.toggle(key("day1", "Main", "Late Act", "11:00 PM"));

        let lineup = fest.lineup.as_ref().unwrap();
        let days = lineup_day_keys(Some(lineup));
        let items = my_day_items("fest", &days, lineup, &saved);
        let artists: Vec<_> = items.iter().map(|i| i.artist.as_str()).collect();
        assert_eq!(artists, ["Late Act", "Early Act"]);
    }

    #[test]
    fn test_my_day_unparseable_times_sort_by_artist_and_last() {
        let fest = festival(json!({
            "day1": {
                "Main": [
                    { "artist": "Zed", "time": "TBA" },
                    { "artist": "Abe", "time": "late" },
                    { "artist": "Mia", "time": "20:00" }
                ]
            }
        }));
        let mut saved = BookmarkSet::default();
        saved.toggle(key("day1", "Main", "Zed", "TBA"));
        saved.toggle(key("day1", "Main", "Abe", "late"));
        saved.toggle(key("day1", "Main", "Mia", "20:00"));

        let lineup = fest.lineup.as_ref().unwrap();
        let items = my_day_items("fest", &["day1".to_string()], lineup, &saved);
        let artists: Vec<_> = items.iter().map(|i| i.artist.as_str()).collect();
        assert_eq!(artists, ["Mia", "Abe", "Zed"]);
    }

    #[test]
    fn test_view_adds_my_day_tab_only_with_bookmarks() {
        let fest = festival(json!({
            "2026-04-11": { "Main": [{ "artist": "B", "time": "19:00" }] },
            "2026-04-10": {
                "Main": [{ "artist": "A", "time": "18:00" }],
                "Tent": []
            },
            "day9": { "Ignored": [] }
        }));

        let view = LineupView::build(&fest, &BookmarkSet::default()).unwrap();
        let tab_keys: Vec<_> = view.tabs.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(tab_keys, ["2026-04-10", "2026-04-11"]);
        assert!(!view.has_my_day());
        assert_eq!(view.selected_tab(), Some("2026-04-10"));
        assert!(view.days[0].stages[0].expanded);
        assert!(!view.days[0].stages[1].expanded);
        assert_eq!(view.days[0].stages[1].placeholder.as_deref(), Some("Schedule TBD"));
        assert!(!view.days[1].stages[0].expanded);

        let mut saved = BookmarkSet::default();
        saved.toggle(key("2026-04-11", "Main", "B", "19:00"));
        let mut view = LineupView::build(&fest, &saved).unwrap();
        assert_eq!(view.tabs.last().unwrap().key, MY_DAY_TAB_KEY);
        assert!(view.days[1].stages[0].slots[0].starred);
        assert_eq!(view.days[1].stages[0].slots[0].glyph(), "★");

        view.select(MY_DAY_TAB_KEY);
        assert_eq!(view.selected_tab(), Some(MY_DAY_TAB_KEY));
        assert!(view.days.iter().all(|d| !d.active));
    }

    #[test]
    fn test_view_hidden_without_lineup() {
        let fest = festival(json!({}));
        assert!(LineupView::build(&fest, &BookmarkSet::default()).is_none());
        let fest = festival(json!("tbd"));
        assert!(LineupView::build(&fest, &BookmarkSet::default()).is_none());
    }

    #[test]
    fn test_day_without_stages_gets_placeholder() {
        let fest = festival(json!({ "day1": {} }));
        let view = LineupView::build(&fest, &BookmarkSet::default()).unwrap();
        assert_eq!(view.days[0].stages.len(), 1);
        assert_eq!(view.days[0].stages[0].placeholder.as_deref(), Some("Schedule TBD"));
    }
}
