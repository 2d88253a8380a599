//! Errors raised while declaring, looking up and fetching datasets

use thiserror::Error;

use crate::schema::ValueType;

/// A malformed `TacoSpec`, detected on construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("duplicate dataset id '{0}'")]
    DuplicateDatasetId(String),

    #[error("dataset '{dataset}' declares column '{column}' more than once")]
    DuplicateColumn { dataset: String, column: String },
}

/// A dataset id that the `TacoSpec` does not declare
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dataset id '{id}' is not declared. Valid ids are: {}", .valid.join(", "))]
pub struct UnknownDatasetId {
    pub id: String,
    pub valid: Vec<String>,
}

/// A fetched payload that does not match the declared column layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("expected a JSON array of rows, found {found}")]
    NotAnArray { found: &'static str },

    #[error("row {row}: expected a JSON object, found {found}")]
    NotAnObject { row: usize, found: &'static str },

    #[error("row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    #[error("row {row}: unexpected column '{column}'")]
    UnexpectedColumn { row: usize, column: String },

    #[error("row {row}: column '{column}' expected {expected}, found {found}")]
    TypeMismatch {
        row: usize,
        column: String,
        expected: ValueType,
        found: &'static str,
    },
}

/// Why a single dataset ended up in the error state.
///
/// These are stored inside that dataset's request and never affect sibling
/// datasets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network level failure: DNS, refused connection, timeout, reset
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status
    #[error("HTTP {code} {status_text}")]
    Status { code: u16, status_text: String },

    /// The body could not be read or is not JSON
    #[error("invalid response body: {0}")]
    Body(String),

    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),
}

impl FetchError {
    /// Status text of an HTTP failure, if this is one
    pub fn status_text(&self) -> Option<&str> {
        match self {
            FetchError::Status { status_text, .. } => Some(status_text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_lists_valid_ids() {
        let error = UnknownDatasetId {
            id: "dataset-x".to_string(),
            valid: vec!["dataset-1".to_string(), "dataset-2".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("'dataset-x'"));
        assert!(message.contains("dataset-1, dataset-2"));
    }

    #[test]
    fn test_status_error_carries_status_text() {
        let error = FetchError::Status {
            code: 404,
            status_text: "Not Found".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 404 Not Found");
        assert_eq!(error.status_text(), Some("Not Found"));
        assert_eq!(FetchError::Transport("reset".into()).status_text(), None);
    }

    #[test]
    fn test_schema_violation_converts() {
        let error: FetchError = SchemaViolation::NotAnArray { found: "object" }.into();
        assert!(matches!(error, FetchError::Schema(_)));
        assert!(error.to_string().contains("found object"));
    }
}
