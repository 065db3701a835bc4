use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::error::ServiceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Read-only: {0}")]
    ReadOnly(String),

    #[error("Record API rejected the request: {0}")]
    RemoteRejected(String),

    #[error("{message}")]
    PartialFailure {
        message: String,
        details: Vec<ErrorDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Machine-readable code carried in the `error` field of the body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::ReadOnly(_) => "read_only",
            ApiError::RemoteRejected(_) => "remote_rejected",
            ApiError::PartialFailure { .. } => "partial_failure",
            ApiError::Internal(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ReadOnly(_) => StatusCode::FORBIDDEN,
            ApiError::RemoteRejected(_) | ApiError::PartialFailure { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, details) = match self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
            ApiError::PartialFailure { message, details } => (message, Some(details)),
            ApiError::NotFound(msg)
            | ApiError::Validation(msg)
            | ApiError::ReadOnly(msg)
            | ApiError::RemoteRejected(msg)
            | ApiError::ServiceUnavailable(msg) => (msg, None),
        };

        let body = ErrorBody {
            error: code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => ApiError::Validation(msg),
            ServiceError::ReadOnly(table) => {
                ApiError::ReadOnly(format!("Table {} is in read-only mode", table))
            }
            ServiceError::RemoteRejected(msg) => ApiError::RemoteRejected(msg),
            ServiceError::Network(msg) => ApiError::ServiceUnavailable(msg),
            err @ ServiceError::PartialFailure { .. } => {
                let message = err.to_string();
                let details = match err {
                    ServiceError::PartialFailure { failures, .. } => failures
                        .into_iter()
                        .map(|f| ErrorDetail {
                            field: format!("records[{}]", f.index),
                            message: f.message,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                ApiError::PartialFailure { message, details }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ErrorDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message)
    }
}
