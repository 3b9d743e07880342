//! Festival detail page view model.

use serde::Serialize;

use crate::bookmarks::BookmarkSet;
use crate::guide::{ArrivalGuide, EssentialsGuide};
use crate::lineup::LineupView;
use crate::models::Festival;
use crate::{Error, Result};

/// Locate a festival by id. A missing or blank id is a validation error.
pub fn find_festival<'a>(festivals: &'a [Festival], id: Option<&str>) -> Result<&'a Festival> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Validation("Missing festival id".to_string()))?;
    festivals
        .iter()
        .find(|f| f.id == id)
        .ok_or_else(|| Error::NotFound("Festival not found".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailHeader {
    pub page_title: String,
    pub name: String,
    pub meta: String,
    pub sub: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFacts {
    pub dates: String,
    pub location: String,
    pub genres: String,
    pub camping: String,
}

/// Outbound links. `None` renders as a disabled button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLinks {
    pub official: Option<String>,
    pub tickets: Option<String>,
    pub city_guide: Option<String>,
}

impl DetailLinks {
    pub fn for_festival(festival: &Festival, city_guide_base: &str) -> Self {
        let official_url = non_blank(festival.official_url.as_deref());
        let ticket_url = non_blank(festival.ticket_url.as_deref());
        Self {
            official: official_url.or(ticket_url).map(String::from),
            tickets: ticket_url.or(official_url).map(String::from),
            city_guide: city_guide_url(festival, city_guide_base),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Map link: coordinates first, then the venue key, otherwise none.
pub fn city_guide_url(festival: &Festival, base: &str) -> Option<String> {
    if let Some((lat, lng)) = festival
        .coordinates
        .and_then(|c| c.lat.zip(c.lng))
        .filter(|(lat, lng)| lat.is_finite() && lng.is_finite())
    {
        return Some(format!(
            "{}?lat={}&lng={}&venue={}",
            base,
            lat,
            lng,
            urlencoding::encode(&festival.name)
        ));
    }
    non_blank(festival.city_guide_venue_key.as_deref())
        .map(|key| format!("{}?venue={}", base, urlencoding::encode(key)))
}

/// Everything shown on the detail page for one festival.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub id: String,
    pub header: DetailHeader,
    pub facts: DetailFacts,
    pub links: DetailLinks,
    pub arrival: ArrivalGuide,
    pub essentials: EssentialsGuide,
    /// `None` hides the lineup section
    pub lineup: Option<LineupView>,
}

impl DetailView {
    pub fn build(festival: &Festival, saved: &BookmarkSet, city_guide_base: &str) -> Self {
        let mut loc = festival.location_label();
        if !festival.country.is_empty() {
            loc = format!("{} • {}", loc, festival.country);
        }
        let genres = if festival.genres.is_empty() {
            "—".to_string()
        } else {
            festival.genres.join(", ")
        };

        Self {
            id: festival.id.clone(),
            header: DetailHeader {
                page_title: format!("Concerto — {}", festival.name),
                name: festival.name.clone(),
                meta: festival.date_range_label(),
                sub: format!("{} • {}", loc, festival.venue),
            },
            facts: DetailFacts {
                dates: festival.date_range_label(),
                location: festival.location_label(),
                genres,
                camping: if festival.has_camping { "Yes" } else { "No" }.to_string(),
            },
            links: DetailLinks::for_festival(festival, city_guide_base),
            arrival: ArrivalGuide::for_festival(festival),
            essentials: EssentialsGuide::for_festival(festival),
            lineup: LineupView::build(festival, saved),
        }
    }
}
