//! Plan Lambda - Handles POST /v1/plan.
//!
//! Turns a festival, a selected day, the day's lineup slice and the user's
//! saved sets into a one-day plan by forwarding to the language-model API.
//! Responds with `{ "ok": true, "plan": ... }` or `{ "ok": false, "error": ... }`.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::json_response;
use shared::planner::{PlanRequest, PlanResponse, PlannerClient};
use shared::{resolve_api_key, Config};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    /// `None` when no API key could be resolved at cold start
    planner: Option<PlannerClient>,
    key_error: String,
}

impl AppState {
    async fn new() -> Self {
        let config = Config::from_env();
        match resolve_api_key(&config.planner.api_key, &config.aws_region).await {
            Ok(key) => Self {
                planner: Some(PlannerClient::new(key, config.planner)),
                key_error: String::new(),
            },
            Err(e) => {
                warn!("Planner disabled: {}", e);
                Self {
                    planner: None,
                    key_error: e.message(),
                }
            }
        }
    }
}

/// Status and envelope for one request.
async fn respond(state: &AppState, method: &str, body: &[u8]) -> (u16, PlanResponse) {
    if method != "POST" {
        return (405, PlanResponse::failure("Method Not Allowed"));
    }

    let Some(planner) = state.planner.as_ref() else {
        return (500, PlanResponse::failure(state.key_error.clone()));
    };

    // Only a body that is not a JSON object becomes an empty request; bad
    // individual fields fall back to their defaults while decoding.
    let request: PlanRequest = serde_json::from_slice(body).unwrap_or_default();
    if let Err(e) = request.ensure_valid() {
        return (e.status_code(), PlanResponse::from_error(&e));
    }

    info!(
        festival = %request.festival.name,
        day = request.day.as_deref().unwrap_or_default(),
        saved = request.saved_sets.as_ref().map_or(0, Vec::len),
        "Generating plan"
    );

    match planner.generate(&request).await {
        Ok(plan) => (200, PlanResponse::success(plan)),
        Err(e) => {
            error!("Plan generation failed: {}", e);
            (e.status_code(), PlanResponse::from_error(&e))
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str().to_string();
    let (status, response) = respond(&state, &method, event.body().as_ref()).await;
    json_response(status, &response)
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

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PlannerConfig;

    fn state_with_key() -> AppState {
        AppState {
            planner: Some(PlannerClient::new("sk-test".into(), PlannerConfig::default())),
            key_error: String::new(),
        }
    }

    #[tokio::test]
    async fn test_rejects_get() {
        let (status, response) = respond(&state_with_key(), "GET", b"").await;
        assert_eq!(status, 405);
        assert_eq!(response.error.as_deref(), Some("Method Not Allowed"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let state = AppState {
            planner: None,
            key_error: "Missing OPENAI_API_KEY".into(),
        };
        let (status, response) = respond(&state, "POST", b"{}").await;
        assert_eq!(status, 500);
        assert_eq!(response.error.as_deref(), Some("Missing OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_missing_festival_name() {
        let body = br#"{"festival":{"id":"x"},"day":"day1"}"#;
        let (status, response) = respond(&state_with_key(), "POST", body).await;
        assert_eq!(status, 400);
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("Missing festival.name"));

        let (status, _) = respond(&state_with_key(), "POST", b"not json").await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_loosely_typed_festival_passes_validation() {
        let bodies: [&[u8]; 3] = [
            br#"{"festival":{"name":"Coachella","venue":null},"day":"day1"}"#,
            br#"{"festival":{"name":"Coachella","genres":"EDM"}}"#,
            br#"{"festival":{"name":"Coachella","hasCamping":"yes","city":42},"savedSets":null}"#,
        ];
        // Nothing listens on the discard port, so a request that passes
        // validation fails upstream instead.
        let state = AppState {
            planner: Some(PlannerClient::new(
                "sk-test".into(),
                PlannerConfig {
                    base_url: "http://127.0.0.1:9".into(),
                    ..PlannerConfig::default()
                },
            )),
            key_error: String::new(),
        };
        for body in bodies {
            let request: PlanRequest = serde_json::from_slice(body).unwrap();
            assert_eq!(request.festival.name, "Coachella");

            let (status, response) = respond(&state, "POST", body).await;
            assert_eq!(status, 500);
            assert_ne!(response.error.as_deref(), Some("Missing festival.name"));
        }
    }
}
