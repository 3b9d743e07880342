//! Static guide panels: arrival advice and packing lists.
//!
//! Every list falls back to a built-in default when the festival does not
//! override it. Camping content only appears for festivals with camping.

use serde::Serialize;

use crate::models::{ArrivalWindow, Festival};

const DEFAULT_WINDOWS: [(&str, &str); 3] = [
    ("Early", "Gates open – 1 PM (shortest lines, easiest entry)"),
    ("Midday", "1 PM – 4 PM (balanced entry + time to explore)"),
    ("Late", "After 4 PM (peak lines + congested walkways)"),
];

const DEFAULT_FIRST_STEPS: [&str; 5] = [
    "Set a meetup point immediately (landmark + time).",
    "Fill water / hydrate before you start moving stage-to-stage.",
    "Screenshot: ticket/QR, entry gate, and pickup zone.",
    "Bathrooms early — lines surge later.",
    "Confirm your exit plan before headliner crowds build.",
];

const DEFAULT_WARNINGS: [&str; 4] = [
    "Cell service can get unreliable near gates and after sunset.",
    "Security lines spike 60–90 minutes before headliners.",
    "Rideshare zones get congested — leaving 10 minutes early helps.",
    "Don’t rely on finding friends after dark without a meetup plan.",
];

const DEFAULT_CAMPING_NOTES: [&str; 3] = [
    "Arrive earlier than you think — check-in lines can snowball.",
    "Set up essentials first (shade, water, chargers).",
    "Night temps can drop — pack a layer even if it’s hot.",
];

const DEFAULT_BASE: [&str; 6] = [
    "Ticket / wristband",
    "ID",
    "Portable phone charger",
    "Comfortable walking shoes",
    "Water plan (bottle or hydration pack if allowed)",
    "Earplugs",
];

const DEFAULT_WEATHER: [&str; 4] = [
    "Sunscreen",
    "Hat / sunglasses",
    "Light layers (temps drop at night)",
    "Small towel or bandana",
];

const DEFAULT_CAMPING_GEAR: [&str; 4] = [
    "Headlamp / flashlight",
    "Extra battery packs",
    "Warm layer for night",
    "Shade plan (tarp/canopy if you’re allowed)",
];

const DEFAULT_NOTES: [&str; 2] = [
    "Screenshot your ticket + important info before service drops.",
    "Pick a meetup landmark early.",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn or_default(items: Option<&Vec<String>>, default: &[&str]) -> Vec<String> {
    items.cloned().unwrap_or_else(|| owned(default))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalGuide {
    pub windows: Vec<ArrivalWindow>,
    pub first_steps: Vec<String>,
    pub warnings: Vec<String>,
    /// `None` hides the camping card
    pub camping_notes: Option<Vec<String>>,
}

impl ArrivalGuide {
    pub fn for_festival(festival: &Festival) -> Self {
        let overrides = festival.arrival.clone().unwrap_or_default();

        let windows = overrides.windows.unwrap_or_else(|| {
            DEFAULT_WINDOWS
                .iter()
                .map(|(label, detail)| ArrivalWindow {
                    label: label.to_string(),
                    detail: detail.to_string(),
                })
                .collect()
        });

        let camping_notes = festival
            .has_camping
            .then(|| or_default(overrides.camping_notes.as_ref(), &DEFAULT_CAMPING_NOTES))
            .filter(|notes| !notes.is_empty());

        Self {
            windows,
            first_steps: or_default(overrides.first_steps.as_ref(), &DEFAULT_FIRST_STEPS),
            warnings: or_default(overrides.warnings.as_ref(), &DEFAULT_WARNINGS),
            camping_notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EssentialsGuide {
    pub base: Vec<String>,
    pub weather: Vec<String>,
    /// `None` hides the camping card
    pub camping: Option<Vec<String>>,
    /// `None` hides the notes card
    pub notes: Option<Vec<String>>,
}

impl EssentialsGuide {
    pub fn for_festival(festival: &Festival) -> Self {
        let overrides = festival.essentials.clone().unwrap_or_default();

        let camping = festival
            .has_camping
            .then(|| or_default(overrides.camping.as_ref(), &DEFAULT_CAMPING_GEAR))
            .filter(|items| !items.is_empty());
        let notes = Some(or_default(overrides.notes.as_ref(), &DEFAULT_NOTES))
            .filter(|items| !items.is_empty());

        Self {
            base: or_default(overrides.base.as_ref(), &DEFAULT_BASE),
            weather: or_default(overrides.weather.as_ref(), &DEFAULT_WEATHER),
            camping,
            notes,
        }
    }
}
