//! Per-dataset request lifecycle: pending, then loaded or error

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::FetchError;
use crate::row::Row;
use crate::typed::{Dataset, FromRow};

/// Lifecycle phase of a dataset request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Error,
    Loaded,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "pending",
            RequestState::Error => "error",
            RequestState::Loaded => "loaded",
        }
    }

    /// Whether the request has reached its final state
    pub fn is_settled(&self) -> bool {
        !matches!(self, RequestState::Pending)
    }

    /// Aggregate state of a group of requests, as a card showing several
    /// datasets sees it: any error wins, then any pending, else loaded.
    pub fn combine<I>(states: I) -> RequestState
    where
        I: IntoIterator<Item = RequestState>,
    {
        states
            .into_iter()
            .fold(RequestState::Loaded, |acc, state| match (acc, state) {
                (RequestState::Error, _) | (_, RequestState::Error) => RequestState::Error,
                (RequestState::Pending, _) | (_, RequestState::Pending) => RequestState::Pending,
                _ => RequestState::Loaded,
            })
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of one dataset, tagged by its id.
///
/// Loaded rows are shared, so cloning a request is cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetRequest {
    Pending { id: String },
    Error { id: String, error: FetchError },
    Loaded { id: String, source: Arc<[Row]> },
}

impl DatasetRequest {
    pub fn pending(id: impl Into<String>) -> Self {
        DatasetRequest::Pending { id: id.into() }
    }

    pub fn loaded(id: impl Into<String>, rows: Vec<Row>) -> Self {
        DatasetRequest::Loaded {
            id: id.into(),
            source: rows.into(),
        }
    }

    pub fn failed(id: impl Into<String>, error: FetchError) -> Self {
        DatasetRequest::Error {
            id: id.into(),
            error,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DatasetRequest::Pending { id }
            | DatasetRequest::Error { id, .. }
            | DatasetRequest::Loaded { id, .. } => id,
        }
    }

    pub fn state(&self) -> RequestState {
        match self {
            DatasetRequest::Pending { .. } => RequestState::Pending,
            DatasetRequest::Error { .. } => RequestState::Error,
            DatasetRequest::Loaded { .. } => RequestState::Loaded,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DatasetRequest::Pending { .. })
    }

    pub fn is_settled(&self) -> bool {
        self.state().is_settled()
    }

    /// Loaded rows, if the dataset has loaded
    pub fn source(&self) -> Option<&[Row]> {
        match self {
            DatasetRequest::Loaded { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            DatasetRequest::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for DatasetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetRequest::Pending { id } => write!(f, "{id}: pending"),
            DatasetRequest::Error { id, error } => write!(f, "{id}: error ({error})"),
            DatasetRequest::Loaded { id, source } => {
                write!(f, "{id}: loaded ({} rows)", source.len())
            }
        }
    }
}

/// Combined state of the given requests, see [`RequestState::combine`]
pub fn combined_state(requests: &[DatasetRequest]) -> RequestState {
    RequestState::combine(requests.iter().map(DatasetRequest::state))
}

/// A dataset request whose rows are decoded into the dataset's row type
pub enum TypedRequest<D: Dataset> {
    Pending,
    Error(FetchError),
    Loaded(Vec<D::Row>),
}

impl<D: Dataset> TypedRequest<D> {
    /// Convert an untyped request. Rows that do not fit `D::Row` turn the
    /// request into an error rather than being passed through.
    pub fn from_request(request: DatasetRequest) -> Self {
        match request {
            DatasetRequest::Pending { .. } => TypedRequest::Pending,
            DatasetRequest::Error { error, .. } => TypedRequest::Error(error),
            DatasetRequest::Loaded { source, .. } => {
                let rows = source
                    .iter()
                    .enumerate()
                    .map(|(index, row)| D::Row::from_row(index, row))
                    .collect::<Result<Vec<_>, _>>();
                match rows {
                    Ok(rows) => TypedRequest::Loaded(rows),
                    Err(violation) => TypedRequest::Error(violation.into()),
                }
            }
        }
    }

    pub fn id(&self) -> &'static str {
        D::ID
    }

    pub fn state(&self) -> RequestState {
        match self {
            TypedRequest::Pending => RequestState::Pending,
            TypedRequest::Error(_) => RequestState::Error,
            TypedRequest::Loaded(_) => RequestState::Loaded,
        }
    }

    pub fn rows(&self) -> Option<&[D::Row]> {
        match self {
            TypedRequest::Loaded(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            TypedRequest::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl<D: Dataset> Clone for TypedRequest<D> {
    fn clone(&self) -> Self {
        match self {
            TypedRequest::Pending => TypedRequest::Pending,
            TypedRequest::Error(error) => TypedRequest::Error(error.clone()),
            TypedRequest::Loaded(rows) => TypedRequest::Loaded(rows.clone()),
        }
    }
}

impl<D: Dataset> fmt::Debug for TypedRequest<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedRequest::Pending => f.debug_struct("Pending").field("id", &D::ID).finish(),
            TypedRequest::Error(error) => f
                .debug_struct("Error")
                .field("id", &D::ID)
                .field("error", error)
                .finish(),
            TypedRequest::Loaded(rows) => f
                .debug_struct("Loaded")
                .field("id", &D::ID)
                .field("source", rows)
                .finish(),
        }
    }
}

impl<D: Dataset> PartialEq for TypedRequest<D> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypedRequest::Pending, TypedRequest::Pending) => true,
            (TypedRequest::Error(a), TypedRequest::Error(b)) => a == b,
            (TypedRequest::Loaded(a), TypedRequest::Loaded(b)) => a == b,
            _ => false,
        }
    }
}
