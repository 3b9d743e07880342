//! Shared library for the Concerto festival directory.
//!
//! Holds the festival data model, the headless view models for the catalog
//! and detail pages, saved-set persistence, and the day-plan contract used by
//! the Lambda functions and the CLI.

pub mod bookmarks;
pub mod catalog;
pub mod config;
pub mod data;
pub mod detail;
pub mod error;
pub mod guide;
pub mod http;
pub mod lineup;
pub mod models;
pub mod planner;
pub mod secrets;

pub use bookmarks::{BookmarkSet, BookmarkStorage, Bookmarks, FileStorage, MemoryStorage, SlotKey};
pub use catalog::{CatalogQuery, CatalogState, CatalogView, FilterOptions, SortMode};
pub use config::{ApiKeySource, Config, PlannerConfig};
pub use data::{load_festivals, parse_festivals};
pub use detail::{find_festival, DetailView};
pub use error::{Error, Result};
pub use lineup::{normalize_day_keys, parse_time_to_minutes, LineupView, MyDayItem};
pub use models::{Festival, Lineup, Slot};
pub use planner::{DayPlan, PlanEndpointClient, PlanRequest, PlanResponse, PlanTrigger, PlannerClient};
pub use secrets::resolve_api_key;
