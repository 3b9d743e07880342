//! Day-plan generation.
//!
//! One request/response contract shared by the serverless endpoint (which
//! forwards to a language-model API) and its callers (which only see the
//! `{ ok, plan | error }` envelope).

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use validator::Validate;

use crate::bookmarks::BookmarkSet;
use crate::config::PlannerConfig;
use crate::lineup::lineup_day_keys;
use crate::models::Festival;
use crate::{Error, Result};

pub const DEFAULT_DAY_LABEL: &str = "Day 1";
pub const MISSING_FESTIVAL_NAME: &str = "Missing festival.name";
pub const INVALID_MODEL_JSON: &str = "Model did not return valid JSON";
pub const NO_LINEUP_TITLE: &str = "No lineup yet";
pub const NO_LINEUP_MESSAGE: &str =
    "Add lineup data to this festival first, then AI can build a real schedule.";

const PLANNER_INSTRUCTIONS: &str = "You are Concerto's Festival Planner.
Return ONLY valid JSON that matches the schema exactly. No markdown. No emojis. No extra keys.
Tone: concise, premium, practical.

Rules:
- If lineup is missing/empty, still produce a useful plan (arrival, pacing, food/water, exit logistics).
- If savedSets exist, prioritize them and reduce conflicts; suggest swaps when needed.
- Keep schedule scannable: 6–12 rows max.";

/// Public festival fields sent to the planner.
///
/// Callers are untrusted, so null or wrong-typed fields decode to their
/// empty value instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanFestival {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[validate(length(min = 1, message = "Missing festival.name"))]
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(deserialize_with = "lenient::string")]
    pub state: String,
    #[serde(deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(deserialize_with = "lenient::string")]
    pub venue: String,
    #[serde(deserialize_with = "lenient::string")]
    pub start_date: String,
    #[serde(deserialize_with = "lenient::string")]
    pub end_date: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub genres: Vec<String>,
    #[serde(deserialize_with = "lenient::truthy")]
    pub has_camping: bool,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::PlanFestival;

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(text(Value::deserialize(d)?))
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(opt_strings(d)?.unwrap_or_default())
    }

    /// Arrays keep their text items; anything else is absent.
    pub fn opt_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(items.into_iter().filter_map(text).collect()),
            _ => None,
        })
    }

    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    pub fn festival<'de, D: Deserializer<'de>>(d: D) -> Result<PlanFestival, D::Error> {
        Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
    }
}

impl From<&Festival> for PlanFestival {
    fn from(festival: &Festival) -> Self {
        Self {
            id: festival.id.clone(),
            name: festival.name.clone(),
            city: festival.city.clone(),
            state: festival.state.clone(),
            country: festival.country.clone(),
            venue: festival.venue.clone(),
            start_date: festival.start_date.to_string(),
            end_date: festival.end_date.to_string(),
            genres: festival.genres.clone(),
            has_camping: festival.has_camping,
        }
    }
}

/// Body of a plan request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanRequest {
    #[validate(nested)]
    #[serde(deserialize_with = "lenient::festival")]
    pub festival: PlanFestival,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub day: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub prompt: Option<String>,
    /// `{ "<day>": stages }` for the selected day only
    pub lineup: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_strings")]
    pub saved_sets: Option<Vec<String>>,
}

impl PlanRequest {
    /// Build a request for one day of a festival's lineup.
    ///
    /// Fails when the festival has no lineup to plan around.
    pub fn for_day(
        festival: &Festival,
        day_key: &str,
        prompt: &str,
        saved: Option<&BookmarkSet>,
    ) -> Result<Self> {
        if lineup_day_keys(festival.lineup.as_ref()).is_empty() {
            return Err(Error::Validation(NO_LINEUP_MESSAGE.to_string()));
        }
        Ok(Self {
            festival: PlanFestival::from(festival),
            day: Some(day_key.to_string()),
            prompt: Some(prompt.trim().to_string()),
            lineup: festival.lineup.as_ref().and_then(|l| l.slice(day_key)),
            saved_sets: saved.map(BookmarkSet::to_strings),
        })
    }

    /// Reject requests without a festival name.
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate()
            .map_err(|_| Error::Validation(MISSING_FESTIVAL_NAME.to_string()))
    }

    /// Capped, defaulted payload that goes into the model prompt.
    pub fn prompt_payload(&self, config: &PlannerConfig) -> Value {
        let mut festival = self.festival.clone();
        festival.genres.truncate(config.max_genres);

        let saved: Vec<&String> = self
            .saved_sets
            .iter()
            .flatten()
            .take(config.max_saved_sets)
            .collect();

        json!({
            "festival": festival,
            "day": self.day.as_deref().filter(|d| !d.is_empty()).unwrap_or(DEFAULT_DAY_LABEL),
            "prompt": self.prompt.as_deref().unwrap_or_default(),
            "lineup": cap_lineup(self.lineup.as_ref(), config.max_lineup_chars),
            "savedSets": saved,
        })
    }
}

/// Drop the lineup entirely once its serialized form is too large; a
/// clipped JSON document would not parse.
fn cap_lineup(lineup: Option<&Value>, max_chars: usize) -> Value {
    match lineup {
        Some(value @ (Value::Object(_) | Value::Array(_))) => {
            match serde_json::to_string(value) {
                Ok(s) if s.chars().count() <= max_chars => value.clone(),
                Ok(_) => {
                    warn!(max_chars, "Lineup too large for prompt, dropping it");
                    Value::Null
                }
                Err(_) => Value::Null,
            }
        }
        Some(Value::Null) | None => Value::Null,
        Some(other) => other.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: String,
    pub title: String,
    #[serde(alias = "detail")]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalPlan {
    pub best_time: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodBreak {
    pub time: String,
    pub idea: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitPlan {
    pub when_to_leave: String,
    pub notes: Vec<String>,
}

/// A generated one-day plan. Every field is required; anything less is an
/// error rather than a partial plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub day_plan_title: String,
    pub schedule: Vec<ScheduleEntry>,
    pub tips: Vec<String>,
    pub arrival: ArrivalPlan,
    pub food_breaks: Vec<FoodBreak>,
    pub exit: ExitPlan,
}

/// `{ "ok": true, "plan": ... }` or `{ "ok": false, "error": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<DayPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl PlanResponse {
    pub fn success(plan: DayPlan) -> Self {
        Self {
            ok: true,
            plan: Some(plan),
            error: None,
            raw: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            plan: None,
            error: Some(message.into()),
            raw: None,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidPlan { message, raw } => Self {
                raw: raw.clone(),
                ..Self::failure(message.clone())
            },
            other => Self::failure(other.message()),
        }
    }
}

/// Strict JSON schema handed to the model.
pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "dayPlanTitle": { "type": "string" },
            "schedule": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "time": { "type": "string" },
                        "title": { "type": "string" },
                        "details": { "type": "string" }
                    },
                    "required": ["time", "title", "details"]
                }
            },
            "tips": { "type": "array", "items": { "type": "string" } },
            "arrival": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "bestTime": { "type": "string" },
                    "notes": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["bestTime", "notes"]
            },
            "foodBreaks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "time": { "type": "string" },
                        "idea": { "type": "string" }
                    },
                    "required": ["time", "idea"]
                }
            },
            "exit": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "whenToLeave": { "type": "string" },
                    "notes": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["whenToLeave", "notes"]
            }
        },
        "required": ["dayPlanTitle", "schedule", "tips", "arrival", "foodBreaks", "exit"]
    })
}

/// Body for `POST {base}/responses`.
pub fn responses_payload(model: &str, prompt_payload: &Value) -> Value {
    json!({
        "model": model,
        "instructions": PLANNER_INSTRUCTIONS,
        "input": [
            {
                "role": "user",
                "content": [{ "type": "input_text", "text": prompt_payload.to_string() }]
            }
        ],
        "text": {
            "format": {
                "type": "json_schema",
                "name": "festival_plan",
                "schema": plan_schema(),
                "strict": true
            }
        }
    })
}

/// Model text from a Responses API body: `output_text`, else the first
/// `output_text` content block of the first output item.
pub fn extract_output_text(body: &Value) -> String {
    if let Some(text) = body
        .get("output_text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
    {
        return text.to_string();
    }

    body.get("output")
        .and_then(|output| output.get(0))
        .and_then(|item| item.get("content"))
        .and_then(Value::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(Value::as_str) == Some("output_text"))
        })
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parse model text into a plan.
pub fn parse_plan(text: &str) -> Result<DayPlan> {
    serde_json::from_str(text).map_err(|_| Error::InvalidPlan {
        message: INVALID_MODEL_JSON.to_string(),
        raw: Some(text.to_string()),
    })
}

/// Forwards plan requests to the OpenAI Responses API.
pub struct PlannerClient {
    http: Client,
    api_key: String,
    config: PlannerConfig,
}

impl PlannerClient {
    pub fn new(api_key: String, config: PlannerConfig) -> Self {
        Self {
            http: Client::new(),
            api_key,
            config,
        }
    }

    pub async fn generate(&self, request: &PlanRequest) -> Result<DayPlan> {
        request.ensure_valid()?;

        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));
        let payload = responses_payload(&self.config.model, &request.prompt_payload(&self.config));

        info!(
            festival = %request.festival.name,
            model = %self.config.model,
            "Requesting day plan"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Planner request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Planner response unreadable: {}", e)))?;

        if !status.is_success() {
            error!(%status, "Planner API returned an error");
            return Err(Error::Upstream(body));
        }

        decode_responses_body(&body)
    }
}

/// Plan from a successful Responses API body. A body that is not JSON is an
/// upstream failure; model text that is not a plan is an invalid plan.
pub fn decode_responses_body(body: &str) -> Result<DayPlan> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::Upstream(format!("Planner response was not JSON: {}", e)))?;
    parse_plan(&extract_output_text(&value))
}

/// Interpret the plan endpoint's HTTP response. Anything other than a
/// successful envelope carrying a complete plan is an error.
pub fn decode_plan_response(status: u16, body: &str) -> Result<DayPlan> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Err(Error::Upstream(body.to_string())),
    };

    let ok = value.get("ok").and_then(Value::as_bool) == Some(true);
    if !(200..300).contains(&status) || !ok {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| value.to_string());
        return Err(Error::Upstream(message));
    }

    let plan = value.get("plan").cloned().unwrap_or(Value::Null);
    serde_json::from_value(plan.clone()).map_err(|e| Error::InvalidPlan {
        message: format!("Malformed plan: {}", e),
        raw: Some(plan.to_string()),
    })
}

/// Calls a deployed plan endpoint.
pub struct PlanEndpointClient {
    http: Client,
    url: String,
}

impl PlanEndpointClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    pub async fn request_plan(&self, request: &PlanRequest) -> Result<DayPlan> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;
        decode_plan_response(status, &body)
    }
}

/// Keeps at most one plan request in flight.
#[derive(Debug, Default)]
pub struct PlanTrigger {
    busy: AtomicBool,
}

/// Held for the duration of a plan request.
#[derive(Debug)]
pub struct PlanGuard<'a> {
    trigger: &'a PlanTrigger,
}

impl Drop for PlanGuard<'_> {
    fn drop(&mut self) {
        self.trigger.busy.store(false, Ordering::Release);
    }
}

impl PlanTrigger {
    pub fn try_start(&self) -> Result<PlanGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;
        Ok(PlanGuard { trigger: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Button text; the button is disabled while busy.
    pub fn label(&self) -> &'static str {
        if self.is_busy() {
            "Generating…"
        } else {
            "Generate plan"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_json() -> Value {
        json!({
            "dayPlanTitle": "Saturday at the Polo Field",
            "schedule": [
                { "time": "2:00 PM", "title": "Arrive", "details": "Gate 3" }
            ],
            "tips": ["Hydrate"],
            "arrival": { "bestTime": "1:30 PM", "notes": ["Use shuttle"] },
            "foodBreaks": [{ "time": "5:00 PM", "idea": "Tacos" }],
            "exit": { "whenToLeave": "Before encore", "notes": [] }
        })
    }

    fn festival() -> Festival {
        serde_json::from_value(json!({
            "id": "fest",
            "name": "Fest",
            "startDate": "2026-04-10",
            "endDate": "2026-04-11",
            "genres": ["EDM"],
            "lineup": {
                "day1": { "Main": [{ "artist": "A", "time": "20:00" }] },
                "day2": { "Main": [{ "artist": "B", "time": "21:00" }] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_missing_schedule_is_an_error() {
        let mut plan = plan_json();
        plan.as_object_mut().unwrap().remove("schedule");
        let body = json!({ "ok": true, "plan": plan }).to_string();
        let err = decode_plan_response(200, &body).unwrap_err();
        assert!(matches!(err, Error::InvalidPlan { .. }));
    }

    #[test]
    fn test_decode_success() {
        let body = json!({ "ok": true, "plan": plan_json() }).to_string();
        let plan = decode_plan_response(200, &body).unwrap();
        assert_eq!(plan.schedule[0].details, "Gate 3");
        assert_eq!(plan.exit.when_to_leave, "Before encore");
    }

    #[test]
    fn test_decode_error_envelope_is_verbatim() {
        let body = json!({ "ok": false, "error": "Missing OPENAI_API_KEY" }).to_string();
        let err = decode_plan_response(500, &body).unwrap_err();
        assert_eq!(err.to_string(), "Missing OPENAI_API_KEY");

        let err = decode_plan_response(502, "Bad Gateway").unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_for_day_slices_lineup() {
        let mut saved = BookmarkSet::default();
        saved.toggle("fest|day2|Main|B|21:00".to_string().into());

        let request = PlanRequest::for_day(&festival(), "day2", "  chill vibes ", Some(&saved)).unwrap();
        assert_eq!(request.prompt.as_deref(), Some("chill vibes"));
        assert_eq!(
            request.lineup,
            Some(json!({ "day2": { "Main": [{ "artist": "B", "time": "21:00" }] } }))
        );
        assert_eq!(request.saved_sets.unwrap(), ["fest|day2|Main|B|21:00"]);
        assert_eq!(request.festival.start_date, "2026-04-10");
    }

    #[test]
    fn test_for_day_requires_lineup() {
        let mut fest = festival();
        fest.lineup = None;
        let err = PlanRequest::for_day(&fest, "day1", "", None).unwrap_err();
        assert_eq!(err.to_string(), format!("Validation error: {}", NO_LINEUP_MESSAGE));
    }

    #[test]
    fn test_validation_requires_name() {
        let request: PlanRequest = serde_json::from_value(json!({ "day": "day1" })).unwrap();
        let err = request.ensure_valid().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Missing festival.name");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_wrong_typed_fields_fall_back_to_defaults() {
        let request: PlanRequest = serde_json::from_value(json!({
            "festival": {
                "name": "Coachella",
                "venue": null,
                "genres": "EDM",
                "hasCamping": 1,
                "startDate": 20260410
            },
            "day": null,
            "prompt": ["x"],
            "savedSets": [ "a|b", 7, null ]
        }))
        .unwrap();
        assert!(request.ensure_valid().is_ok());
        assert_eq!(request.festival.name, "Coachella");
        assert_eq!(request.festival.venue, "");
        assert!(request.festival.genres.is_empty());
        assert!(request.festival.has_camping);
        assert_eq!(request.festival.start_date, "20260410");
        assert_eq!(request.day, None);
        assert_eq!(request.prompt, None);
        assert_eq!(request.saved_sets.unwrap(), ["a|b", "7"]);

        let request: PlanRequest =
            serde_json::from_value(json!({ "festival": "Coachella", "savedSets": {} })).unwrap();
        assert_eq!(request.festival, PlanFestival::default());
        assert_eq!(request.saved_sets, None);
    }

    #[test]
    fn test_non_json_responses_body_is_upstream_error() {
        let err = decode_responses_body("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
        assert_eq!(err.status_code(), 500);

        let body = json!({ "output_text": plan_json().to_string() }).to_string();
        assert!(decode_responses_body(&body).is_ok());

        let err = decode_responses_body(&json!({ "output_text": "nope" }).to_string()).unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_prompt_payload_caps_and_defaults() {
        let config = PlannerConfig {
            max_genres: 2,
            max_saved_sets: 1,
            max_lineup_chars: 10,
            ..PlannerConfig::default()
        };
        let request = PlanRequest {
            festival: PlanFestival {
                name: "Fest".into(),
                genres: vec!["a".into(), "b".into(), "c".into()],
                ..PlanFestival::default()
            },
            lineup: Some(json!({ "day1": { "Main": [{ "artist": "Long name", "time": "1 PM" }] } })),
            saved_sets: Some(vec!["one".into(), "two".into()]),
            ..PlanRequest::default()
        };
        let payload = request.prompt_payload(&config);
        assert_eq!(payload["day"], "Day 1");
        assert_eq!(payload["prompt"], "");
        assert_eq!(payload["festival"]["genres"], json!(["a", "b"]));
        assert_eq!(payload["savedSets"], json!(["one"]));
        assert_eq!(payload["lineup"], Value::Null);
        assert_eq!(payload["festival"]["hasCamping"], false);
    }

    #[test]
    fn test_extract_output_text() {
        assert_eq!(extract_output_text(&json!({ "output_text": "{}" })), "{}");
        let body = json!({
            "output": [{
                "content": [
                    { "type": "refusal", "text": "no" },
                    { "type": "output_text", "text": "plan" }
                ]
            }]
        });
        assert_eq!(extract_output_text(&body), "plan");
        assert_eq!(extract_output_text(&json!({})), "");
    }

    #[test]
    fn test_parse_plan_keeps_raw_text() {
        match parse_plan("not json") {
            Err(Error::InvalidPlan { message, raw }) => {
                assert_eq!(message, INVALID_MODEL_JSON);
                assert_eq!(raw.as_deref(), Some("not json"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(parse_plan(&plan_json().to_string()).is_ok());
    }

    #[test]
    fn test_responses_payload_shape() {
        let payload = responses_payload("gpt-4.1-mini", &json!({ "day": "day1" }));
        assert_eq!(payload["model"], "gpt-4.1-mini");
        assert_eq!(payload["text"]["format"]["strict"], true);
        assert_eq!(payload["input"][0]["content"][0]["text"], r#"{"day":"day1"}"#);
    }

    #[test]
    fn test_trigger_allows_one_in_flight() {
        let trigger = PlanTrigger::default();
        assert_eq!(trigger.label(), "Generate plan");
        let guard = trigger.try_start().unwrap();
        assert!(matches!(trigger.try_start(), Err(Error::Busy)));
        assert_eq!(trigger.label(), "Generating…");
        drop(guard);
        assert!(!trigger.is_busy());
    }

    #[test]
    fn test_error_envelope_carries_raw() {
        let err = Error::InvalidPlan {
            message: INVALID_MODEL_JSON.into(),
            raw: Some("oops".into()),
        };
        let response = PlanResponse::from_error(&err);
        assert!(!response.ok);
        assert_eq!(response.raw.as_deref(), Some("oops"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "ok": false, "error": INVALID_MODEL_JSON, "raw": "oops" })
        );
    }
}
