//! Festival data models as they appear in the static festival document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One festival entry from `festivals.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Festival {
    /// Unique within the document
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub venue: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub has_camping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_guide_venue_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineup: Option<Lineup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<ArrivalOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub essentials: Option<EssentialsOverrides>,
}

impl Festival {
    /// `City, ST`, or just the city when there is no state.
    pub fn location_label(&self) -> String {
        if self.state.is_empty() {
            self.city.clone()
        } else {
            format!("{}, {}", self.city, self.state)
        }
    }

    /// `Apr 10–Apr 12, 2026`, year taken from the start date.
    pub fn date_range_label(&self) -> String {
        format!(
            "{}–{}, {}",
            self.start_date.format("%b %-d"),
            self.end_date.format("%b %-d"),
            self.start_date.format("%Y")
        )
    }

    /// Full English month name of the start date, e.g. `April`.
    pub fn month_label(&self) -> String {
        self.start_date.format("%B").to_string()
    }

    /// Lower-cased text matched by the catalog search box.
    pub fn search_haystack(&self) -> String {
        let mut parts = vec![
            self.name.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
            self.venue.as_str(),
        ];
        parts.extend(self.genres.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// Map position of the festival grounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Per-festival replacements for the default arrival guidance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalOverrides {
    #[serde(default)]
    pub windows: Option<Vec<ArrivalWindow>>,
    #[serde(default)]
    pub first_steps: Option<Vec<String>>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub camping_notes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalWindow {
    pub label: String,
    pub detail: String,
}

/// Per-festival replacements for the default packing lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EssentialsOverrides {
    #[serde(default)]
    pub base: Option<Vec<String>>,
    #[serde(default)]
    pub weather: Option<Vec<String>>,
    #[serde(default)]
    pub camping: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
}

/// Day key -> stage -> slots, with source key order preserved.
///
/// Parsing is lenient: anything that is not an object is an empty lineup, a
/// stage whose value is not an array has no slots, and missing slot fields
/// are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct Lineup {
    days: Vec<LineupDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineupDay {
    pub key: String,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub slots: Vec<Slot>,
}

/// One performance. `time` is display text and may not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub artist: String,
    pub time: String,
}

impl Slot {
    pub fn new(artist: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            time: time.into(),
        }
    }
}

impl Lineup {
    /// Days in source order.
    pub fn days(&self) -> &[LineupDay] {
        &self.days
    }

    /// Raw day keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|day| day.key.as_str())
    }

    pub fn day(&self, key: &str) -> Option<&LineupDay> {
        self.days.iter().find(|day| day.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// `{ "<key>": { stage: [slots] } }` for a single day, or `None` if the
    /// day is unknown.
    pub fn slice(&self, key: &str) -> Option<Value> {
        let day = self.day(key)?;
        let mut map = Map::new();
        map.insert(day.key.clone(), stages_to_value(&day.stages));
        Some(Value::Object(map))
    }
}

fn stages_to_value(stages: &[Stage]) -> Value {
    let stages = stages
        .iter()
        .map(|stage| {
            let slots = stage
                .slots
                .iter()
                .map(|slot| serde_json::json!({ "artist": slot.artist, "time": slot.time }))
                .collect();
            (stage.name.clone(), Value::Array(slots))
        })
        .collect::<Map<_, _>>();
    Value::Object(stages)
}

fn text_field(slot: &Value, field: &str) -> String {
    slot.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl From<Value> for Lineup {
    fn from(value: Value) -> Self {
        let Value::Object(days) = value else {
            return Lineup::default();
        };

        let days = days
            .into_iter()
            .map(|(key, stages)| {
                let stages = match stages {
                    Value::Object(stages) => stages
                        .into_iter()
                        .map(|(name, slots)| {
                            let slots = match slots {
                                Value::Array(slots) => slots
                                    .iter()
                                    .map(|slot| Slot {
                                        artist: text_field(slot, "artist"),
                                        time: text_field(slot, "time"),
                                    })
                                    .collect(),
                                _ => Vec::new(),
                            };
                            Stage { name, slots }
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                LineupDay { key, stages }
            })
            .collect();

        Lineup { days }
    }
}

impl From<Lineup> for Value {
    fn from(lineup: Lineup) -> Self {
        let days = lineup
            .days
            .iter()
            .map(|day| (day.key.clone(), stages_to_value(&day.stages)))
            .collect::<Map<_, _>>();
        Value::Object(days)
    }
}
