//! Loading the static festival document.

use std::collections::HashSet;
use std::path::Path;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::{info, warn};

use crate::models::Festival;
use crate::{Error, Result};

/// Message shown when the document cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Couldn’t load festivals.json";

/// Parse the festival array. Duplicate ids are kept but logged; lookups
/// resolve to the first entry.
pub fn parse_festivals(json: &str) -> Result<Vec<Festival>> {
    let festivals: Vec<Festival> =
        serde_json::from_str(json).map_err(|e| Error::DataLoad(e.to_string()))?;

    let mut seen = HashSet::new();
    for festival in &festivals {
        if !seen.insert(festival.id.as_str()) {
            warn!(id = %festival.id, "Duplicate festival id in document");
        }
    }
    Ok(festivals)
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Load from a local path or fetch over HTTP, bypassing caches.
pub async fn load_festivals(source: &str) -> Result<Vec<Festival>> {
    let body = if is_remote(source) {
        fetch_document(source).await?
    } else {
        tokio::fs::read_to_string(Path::new(source))
            .await
            .map_err(|e| Error::DataLoad(format!("{}: {}", source, e)))?
    };

    let festivals = parse_festivals(&body)?;
    info!(source, count = festivals.len(), "Loaded festivals");
    Ok(festivals)
}

async fn fetch_document(url: &str) -> Result<String> {
    let response = reqwest::Client::new()
        .get(url)
        .header(CACHE_CONTROL, "no-store")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|e| Error::DataLoad(format!("Failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::DataLoad(format!("HTTP {} fetching {}", status, url)));
    }

    response
        .text()
        .await
        .map_err(|e| Error::DataLoad(format!("Failed to read {}: {}", url, e)))
}
