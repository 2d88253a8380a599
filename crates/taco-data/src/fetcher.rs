//! Fetching raw dataset payloads

use async_trait::async_trait;
use serde_json::Value as Json;
use taco_core::{DatasetMetadata, FetchError};

use crate::config::FetchConfig;
use crate::DataError;

/// Trait for anything that can produce the JSON payload of a dataset.
///
/// The provider decodes and validates the payload against the dataset schema,
/// so implementations only deal with transport.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Fetch the body served for `metadata` under `base_url`
    async fn fetch(&self, base_url: &str, metadata: &DatasetMetadata) -> Result<Json, FetchError>;
}

/// Default fetcher: `GET {base_url}{route}` over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default [`FetchConfig`], including its
    /// request timeout
    pub fn new() -> Result<Self, DataError> {
        Self::from_config(&FetchConfig::default())
    }

    /// Create a fetcher from fetch configuration
    pub fn from_config(config: &FetchConfig) -> Result<Self, DataError> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let http = builder
            .build()
            .map_err(|e| DataError::HttpClient(e.to_string()))?;
        Ok(Self { http })
    }

    /// Use an existing client
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, base_url: &str, metadata: &DatasetMetadata) -> Result<Json, FetchError> {
        let url = metadata.url(base_url);
        tracing::debug!("Fetching dataset '{}' from {}", metadata.id, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                status_text: status_text(&response),
            });
        }

        response
            .json::<Json>()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Reason phrase the server sent, or the canonical one when it sent none
fn status_text(response: &reqwest::Response) -> String {
    // Only present when the phrase differs from the canonical one
    if let Some(reason) = response.extensions().get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }

    response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}
