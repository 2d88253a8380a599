//! Fetching and caching of TacoBI datasets
//!
//! [`TacoProvider`] fetches every dataset declared in a spec once, keeps the
//! per-dataset request states and answers ordered lookups against them.

pub mod accessor;
pub mod batch;
pub mod config;
pub mod fetcher;
pub mod provider;
pub mod subscriber;

use thiserror::Error;

use arrow::error::ArrowError;
use taco_core::{RequestState, UnknownDatasetId};

// Re-exports
pub use batch::{arrow_schema, rows_to_record_batch};
pub use config::{FetchConfig, TacoConfig};
pub use fetcher::{DatasetFetcher, HttpFetcher};
pub use provider::{DatasetRequestById, TacoProvider};
pub use subscriber::{DatasetChange, DatasetSubscriber};

/// Errors that can occur outside of a single dataset's fetch
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error(transparent)]
    UnknownDataset(#[from] UnknownDatasetId),

    #[error("Dataset '{id}' is {state}, not loaded")]
    NotLoaded { id: String, state: RequestState },

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Config(error.to_string())
    }
}
