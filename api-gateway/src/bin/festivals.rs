//! Festivals Lambda - Serves catalog and detail view models.
//!
//! Endpoints:
//! - GET /v1/festivals - Filtered, sorted card list plus filter vocabularies
//! - GET /v1/festivals/{id} - Detail page for one festival

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::Serialize;
use shared::catalog::{CatalogQuery, CatalogState, CatalogView, FilterOptions, SortMode};
use shared::data::LOAD_FAILED_MESSAGE;
use shared::http::{error_response, from_error, json_response, ApiResponse};
use shared::{find_festival, load_festivals, BookmarkSet, Config, DetailView, Festival};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Catalog response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    filters: FilterOptions,
    sort: SortMode,
    view: CatalogView,
}

/// Application state
struct AppState {
    /// `Err` keeps the load failure so every request reports it
    festivals: Result<Vec<Festival>, String>,
    city_guide_base: String,
}

impl AppState {
    async fn new() -> Self {
        let config = Config::from_env();
        let festivals = load_festivals(&config.data_source).await.map_err(|e| {
            error!("Failed to load festivals: {}", e);
            e.message()
        });
        Self {
            festivals,
            city_guide_base: config.city_guide_base,
        }
    }
}

/// Query string values relevant to the catalog.
#[derive(Debug, Default)]
struct CatalogParams {
    q: Option<String>,
    month: Option<String>,
    genre: Option<String>,
    sort: Option<String>,
}

impl CatalogParams {
    fn from_request(event: &Request) -> Self {
        let params = event.query_string_parameters();
        let get = |name: &str| params.first(name).map(String::from);
        Self {
            q: get("q"),
            month: get("month"),
            genre: get("genre"),
            sort: get("sort"),
        }
    }
}

fn catalog(festivals: &[Festival], params: &CatalogParams) -> Result<Response<Body>, Error> {
    let sort = match params.sort.as_deref() {
        Some(raw) => match raw.parse::<SortMode>() {
            Ok(mode) => mode,
            Err(e) => return from_error(&e),
        },
        None => SortMode::default(),
    };

    let defaults = CatalogQuery::default();
    let query = CatalogQuery {
        term: params.q.clone().unwrap_or(defaults.term),
        month: params.month.clone().unwrap_or(defaults.month),
        genre: params.genre.clone().unwrap_or(defaults.genre),
    };

    let state = CatalogState::new(festivals.to_vec()).with_sort_mode(sort);
    let view = state.render(&query);
    info!(shown = view.cards.len(), "Catalog rendered");

    json_response(
        200,
        &ApiResponse::success(CatalogResponse {
            filters: state.filter_options(),
            sort,
            view,
        }),
    )
}

fn detail(festivals: &[Festival], id: &str, city_guide_base: &str) -> Result<Response<Body>, Error> {
    match find_festival(festivals, Some(id)) {
        Ok(festival) => {
            // Saved sets live on the visitor's device, never on the server.
            let view = DetailView::build(festival, &BookmarkSet::default(), city_guide_base);
            json_response(200, &ApiResponse::success(view))
        }
        Err(e) => from_error(&e),
    }
}

fn route(
    state: &AppState,
    method: &str,
    path: &str,
    params: &CatalogParams,
) -> Result<Response<Body>, Error> {
    let festivals = match &state.festivals {
        Ok(festivals) => festivals,
        Err(e) => {
            return error_response(500, format!("{}: {}", LOAD_FAILED_MESSAGE, e));
        }
    };

    let path = path.trim_end_matches('/');
    match (method, path) {
        ("GET", "/v1/festivals") => catalog(festivals, params),
        ("GET", _) if path.starts_with("/v1/festivals/") => {
            let raw_id = path.trim_start_matches("/v1/festivals/");
            let id = urlencoding::decode(raw_id)
                .map(|id| id.into_owned())
                .unwrap_or_else(|_| raw_id.to_string());
            detail(festivals, &id, &state.city_guide_base)
        }
        (_, _) if path.starts_with("/v1/festivals") => error_response(405, "Method not allowed"),
        _ => error_response(404, "Not found"),
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();
    info!("Festivals request: {} {}", method, path);

    let params = CatalogParams::from_request(&event);
    route(&state, &method, &path, &params)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
