//! Core types for the TacoBI dataset layer
//!
//! This crate provides the declarative dataset schema, the registry of
//! datasets an application works with, the per-dataset request states and
//! the typed row machinery. It performs no I/O; fetching and caching live in
//! `taco-data`.

pub mod error;
pub mod request;
pub mod row;
pub mod schema;
pub mod spec;
pub mod state;
pub mod typed;

// Re-export commonly used types
pub use error::{FetchError, SchemaViolation, SpecError, UnknownDatasetId};
pub use request::{combined_state, DatasetRequest, RequestState, TypedRequest};
pub use row::{Row, Value};
pub use schema::{ColumnSchema, DatasetKind, DatasetMetadata, DatasetSchema, ValueType};
pub use spec::{TacoSpec, TacoSpecBuilder};
pub use state::{create_taco_bi, TacoState};
pub use typed::{ColumnType, Dataset, DatasetSet, FromRow};
