//! Configuration file for mounting a provider
//!
//! ```json
//! {
//!   "base_url": "http://localhost:8080",
//!   "fetch": { "request_timeout": "10s", "user_agent": "tacobi" },
//!   "spec": { "datasets": [ ... ] }
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use taco_core::{create_taco_bi, TacoSpec, TacoState};

use crate::DataError;

/// Settings applied to the HTTP client used for fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one request, e.g. `"30s"` or `"1m 30s"`
    #[serde(
        default = "default_request_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            user_agent: None,
        }
    }
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&humantime::format_duration(*duration))
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

/// Everything needed to mount a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacoConfig {
    /// Prefix of every dataset route
    pub base_url: String,

    #[serde(default)]
    pub fetch: FetchConfig,

    pub spec: TacoSpec,
}

impl TacoConfig {
    /// Load a configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Application state described by this configuration
    pub fn state(&self) -> TacoState {
        create_taco_bi(self.spec.clone(), self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "base_url": "http://localhost:8080/",
        "fetch": { "request_timeout": "1m 30s", "user_agent": "tacobi-test" },
        "spec": {
            "datasets": [
                {
                    "id": "dataset-1",
                    "route": "/dataset-1",
                    "type": "tabular",
                    "dataset_schema": {
                        "columns": [
                            { "name": "Beverage", "valueType": "string" },
                            { "name": "Price", "valueType": "number" }
                        ]
                    }
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_config() {
        let config = TacoConfig::from_json_str(CONFIG).unwrap();

        assert_eq!(config.fetch.request_timeout, Duration::from_secs(90));
        assert_eq!(config.fetch.user_agent.as_deref(), Some("tacobi-test"));
        assert_eq!(config.spec.len(), 1);
        assert!(config.spec.contains("dataset-1"));
    }

    #[test]
    fn test_state_trims_base_url() {
        let config = TacoConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.state().base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_fetch_defaults() {
        let config = TacoConfig::from_json_str(
            r#"{ "base_url": "http://localhost", "spec": { "datasets": [] } }"#,
        )
        .unwrap();

        assert_eq!(config.fetch, FetchConfig::default());
        assert_eq!(config.fetch.request_timeout, Duration::from_secs(30));
        assert!(config.spec.is_empty());
    }

    #[test]
    fn test_invalid_duration() {
        let result = TacoConfig::from_json_str(
            r#"{
                "base_url": "http://localhost",
                "fetch": { "request_timeout": "soon" },
                "spec": { "datasets": [] }
            }"#,
        );
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dataset = r#"{ "id": "a", "route": "/a", "dataset_schema": { "columns": [] } }"#;
        let text = format!(
            r#"{{ "base_url": "http://localhost", "spec": {{ "datasets": [{dataset}, {dataset}] }} }}"#
        );

        let error = TacoConfig::from_json_str(&text).unwrap_err();
        assert!(error.to_string().contains("duplicate dataset id 'a'"));
        assert!(matches!(error, DataError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let result = TacoConfig::from_path("/nonexistent/tacobi.json");
        assert!(matches!(result, Err(DataError::Io(_))));
    }

    #[test]
    fn test_serialize_round_trip_keeps_timeout_readable() {
        let config = TacoConfig::from_json_str(CONFIG).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["fetch"]["request_timeout"], "1m 30s");
    }
}
