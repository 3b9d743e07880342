//! Catalog browsing: filter vocabularies, search predicate, sort order and
//! the card list view model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Festival;
use crate::Error;

/// Selection value meaning "no constraint".
pub const ALL: &str = "all";

/// Genre shortcuts offered above the grid.
pub const QUICK_GENRES: [&str; 6] = ["EDM", "Hip-Hop", "Pop", "Rock", "Country", "Indie"];

const MAX_CARD_TAGS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Soonest,
    Name,
}

impl SortMode {
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Soonest => SortMode::Name,
            SortMode::Name => SortMode::Soonest,
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            SortMode::Soonest => "Sort: Soonest",
            SortMode::Name => "Sort: Name",
        }
    }
}

impl FromStr for SortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soonest" => Ok(SortMode::Soonest),
            "name" => Ok(SortMode::Name),
            other => Err(Error::Validation(format!("Unknown sort mode: {}", other))),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Soonest => f.write_str("soonest"),
            SortMode::Name => f.write_str("name"),
        }
    }
}

/// Current search box, month and genre selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub term: String,
    pub month: String,
    pub genre: String,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            term: String::new(),
            month: ALL.to_string(),
            genre: ALL.to_string(),
        }
    }
}

impl CatalogQuery {
    pub fn matches(&self, festival: &Festival) -> bool {
        matches_search(festival, &self.term)
            && matches_month(festival, &self.month)
            && matches_genre(festival, &self.genre)
    }
}

fn is_all(selection: &str) -> bool {
    selection.is_empty() || selection == ALL
}

pub fn matches_search(festival: &Festival, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || festival.search_haystack().contains(&term)
}

pub fn matches_month(festival: &Festival, month: &str) -> bool {
    is_all(month) || festival.month_label() == month
}

pub fn matches_genre(festival: &Festival, genre: &str) -> bool {
    is_all(genre) || festival.genres.iter().any(|g| g == genre)
}

/// Festivals passing the query, in their original order.
pub fn filter_festivals<'a>(festivals: &'a [Festival], query: &CatalogQuery) -> Vec<&'a Festival> {
    festivals.iter().filter(|f| query.matches(f)).collect()
}

/// Stable sort, so equal start dates keep their original order.
pub fn sort_festivals(festivals: &mut [&Festival], mode: SortMode) {
    match mode {
        SortMode::Soonest => festivals.sort_by_key(|f| f.start_date),
        SortMode::Name => festivals.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

/// Dropdown and chip vocabularies derived from the loaded list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Month names in calendar order
    pub months: Vec<String>,
    /// Genres sorted alphabetically
    pub genres: Vec<String>,
    pub quick_genres: Vec<String>,
}

impl FilterOptions {
    pub fn from_festivals(festivals: &[Festival]) -> Self {
        let months: BTreeSet<u32> = festivals.iter().map(|f| f.start_date.month()).collect();
        let months = months
            .into_iter()
            .filter_map(|m| NaiveDate::from_ymd_opt(2000, m, 1))
            .map(|d| d.format("%B").to_string())
            .collect();

        let genres: BTreeSet<&str> = festivals
            .iter()
            .flat_map(|f| f.genres.iter())
            .map(String::as_str)
            .filter(|g| !g.is_empty())
            .collect();

        Self {
            months,
            genres: genres.into_iter().map(String::from).collect(),
            quick_genres: QUICK_GENRES.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// One card in the browse grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalCard {
    pub id: String,
    pub kicker: String,
    pub title: String,
    pub sub: String,
    pub tags: Vec<String>,
    pub href: String,
}

impl FestivalCard {
    pub fn from_festival(festival: &Festival) -> Self {
        Self {
            id: festival.id.clone(),
            kicker: festival.date_range_label(),
            title: festival.name.clone(),
            sub: format!("{} • {}", festival.location_label(), festival.venue),
            tags: festival.genres.iter().take(MAX_CARD_TAGS).cloned().collect(),
            href: detail_href(&festival.id),
        }
    }
}

/// Link from a card to the detail page.
pub fn detail_href(festival_id: &str) -> String {
    format!("festival.html?festival={}", urlencoding::encode(festival_id))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub count_label: String,
    pub sort_label: String,
    pub cards: Vec<FestivalCard>,
    pub empty: bool,
}

pub fn count_label(count: usize) -> String {
    format!(
        "{} festival{} shown",
        count,
        if count == 1 { "" } else { "s" }
    )
}

/// Browse-page state: the loaded list plus the session's sort mode.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    festivals: Vec<Festival>,
    sort_mode: SortMode,
}

impl CatalogState {
    pub fn new(festivals: Vec<Festival>) -> Self {
        Self {
            festivals,
            sort_mode: SortMode::default(),
        }
    }

    pub fn with_sort_mode(mut self, sort_mode: SortMode) -> Self {
        self.sort_mode = sort_mode;
        self
    }

    pub fn festivals(&self) -> &[Festival] {
        &self.festivals
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn toggle_sort(&mut self) -> SortMode {
        self.sort_mode = self.sort_mode.toggled();
        self.sort_mode
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_festivals(&self.festivals)
    }

    pub fn render(&self, query: &CatalogQuery) -> CatalogView {
        let mut visible = filter_festivals(&self.festivals, query);
        sort_festivals(&mut visible, self.sort_mode);
        let cards: Vec<FestivalCard> = visible.into_iter().map(FestivalCard::from_festival).collect();
        CatalogView {
            count_label: count_label(cards.len()),
            sort_label: self.sort_mode.button_label().to_string(),
            empty: cards.is_empty(),
            cards,
        }
    }
}
