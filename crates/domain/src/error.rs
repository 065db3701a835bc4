//! Domain error types.

use shared::pagination::PaginationError;
use thiserror::Error;

/// One record of a batch write that the record API rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// Errors surfaced by entity services and page controllers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The record API answered with `success: false`.
    #[error("Remote rejected the request: {0}")]
    RemoteRejected(String),

    /// Some records of a batch write failed.
    #[error("{} of {} records failed", .failures.len(), .succeeded + .failures.len())]
    PartialFailure {
        succeeded: usize,
        failures: Vec<RecordFailure>,
    },

    /// Input that never reaches the record API.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Write attempted against a table that is permanently read-only.
    #[error("Table {0} is in read-only mode")]
    ReadOnly(&'static str),

    /// Transport, decoding or configuration failure.
    #[error("Record API unavailable: {0}")]
    Network(String),
}

impl ServiceError {
    /// Creates an [`ServiceError::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }
}

impl From<PaginationError> for ServiceError {
    fn from(err: PaginationError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_display() {
        let err = ServiceError::PartialFailure {
            succeeded: 2,
            failures: vec![RecordFailure {
                index: 1,
                message: "app_name: required".to_string(),
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 records failed");
    }

    #[test]
    fn test_read_only_display() {
        let err = ServiceError::ReadOnly("user_details");
        assert_eq!(err.to_string(), "Table user_details is in read-only mode");
    }

    #[test]
    fn test_invalid_helper() {
        assert_eq!(
            ServiceError::invalid("bad id"),
            ServiceError::InvalidInput("bad id".to_string())
        );
    }
}
