//! Configuration management for the festival services.

use std::env;

/// Default location of the static festival document.
pub const DEFAULT_DATA_SOURCE: &str = "data/festivals.json";
/// Default prefix for per-festival bookmark storage keys.
pub const DEFAULT_BOOKMARK_NAMESPACE: &str = "concerto_fest_saved";
/// Default base for the external city guide map.
pub const DEFAULT_CITY_GUIDE_BASE: &str = "https://concerto-venue-map.netlify.app/";

const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_LINEUP_CHARS: usize = 18_000;
const DEFAULT_MAX_SAVED_SETS: usize = 250;
const DEFAULT_MAX_GENRES: usize = 25;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or http(s) URL of the festival document
    pub data_source: String,
    /// Prefix for bookmark storage keys
    pub bookmark_namespace: String,
    /// Base URL of the city guide map
    pub city_guide_base: String,
    /// AWS region
    pub aws_region: String,
    /// Language-model settings for the planning endpoint
    pub planner: PlannerConfig,
}

/// Where the language-model API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Key given directly in the environment
    Env(String),
    /// ARN of a Secrets Manager secret holding the key
    Secret(String),
    /// Not configured
    Missing,
}

/// Settings for the language-model backed planner.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub api_key: ApiKeySource,
    pub model: String,
    pub base_url: String,
    /// Serialized lineup slices longer than this are dropped from the prompt
    pub max_lineup_chars: usize,
    pub max_saved_sets: usize,
    pub max_genres: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_key: ApiKeySource::Missing,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            max_lineup_chars: DEFAULT_MAX_LINEUP_CHARS,
            max_saved_sets: DEFAULT_MAX_SAVED_SETS,
            max_genres: DEFAULT_MAX_GENRES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            bookmark_namespace: DEFAULT_BOOKMARK_NAMESPACE.to_string(),
            city_guide_base: DEFAULT_CITY_GUIDE_BASE.to_string(),
            aws_region: "us-east-1".to_string(),
            planner: PlannerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = match (non_empty("OPENAI_API_KEY"), non_empty("OPENAI_API_KEY_SECRET_ARN")) {
            (Some(key), _) => ApiKeySource::Env(key),
            (None, Some(arn)) => ApiKeySource::Secret(arn),
            (None, None) => ApiKeySource::Missing,
        };

        let planner = PlannerConfig {
            api_key,
            model: non_empty("OPENAI_MODEL").unwrap_or(defaults.planner.model),
            base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.planner.base_url),
            max_lineup_chars: non_empty("PLAN_MAX_LINEUP_CHARS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.planner.max_lineup_chars),
            ..defaults.planner
        };

        Self {
            data_source: non_empty("FESTIVALS_DATA").unwrap_or(defaults.data_source),
            bookmark_namespace: non_empty("BOOKMARK_NAMESPACE")
                .unwrap_or(defaults.bookmark_namespace),
            city_guide_base: non_empty("CITY_GUIDE_BASE_URL").unwrap_or(defaults.city_guide_base),
            aws_region: non_empty("AWS_REGION").unwrap_or(defaults.aws_region),
            planner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.data_source, DEFAULT_DATA_SOURCE);
        assert_eq!(config.bookmark_namespace, DEFAULT_BOOKMARK_NAMESPACE);
        assert_eq!(config.planner.model, "gpt-4.1-mini");
        assert_eq!(config.planner.api_key, ApiKeySource::Missing);
        assert_eq!(config.planner.max_lineup_chars, 18_000);
        assert_eq!(config.aws_region, "us-east-1");
    }

    #[test]
    fn test_region_from_env() {
        let config = Config::from_lookup(lookup(&[("AWS_REGION", "eu-west-1")]));
        assert_eq!(config.aws_region, "eu-west-1");
    }

    #[test]
    fn test_env_key_wins_over_secret() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_KEY_SECRET_ARN", "arn:aws:secretsmanager:x"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
        ]));
        assert_eq!(config.planner.api_key, ApiKeySource::Env("sk-test".into()));
        assert_eq!(config.planner.model, "gpt-4o-mini");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "  "),
            ("OPENAI_API_KEY_SECRET_ARN", "arn:secret"),
            ("FESTIVALS_DATA", ""),
        ]));
        assert_eq!(config.planner.api_key, ApiKeySource::Secret("arn:secret".into()));
        assert_eq!(config.data_source, DEFAULT_DATA_SOURCE);
    }
}
