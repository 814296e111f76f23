//! Error types for the ticker registry
//!
//! Business outcomes (taken, reserved, similar, badly formatted) are values,
//! not errors. Everything here is exceptional.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No record exists for the requested ticker
    #[error("ticker not found: {0}")]
    TickerNotFound(String),

    /// The backing store failed; the answer to the request is unknown
    #[error("storage failure: {0}")]
    Storage(#[from] storage::StorageError),

    /// A stored record could not be decoded or encoded
    #[error("corrupt ticker record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The registry was configured with unusable values
    #[error("invalid registry configuration: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::TickerNotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::Storage(err) if err.kind().is_retryable() => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RegistryError::Storage(_)
            | RegistryError::Serialization(_)
            | RegistryError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::TickerNotFound(_) => "TICKER_UNKNOWN",
            RegistryError::Storage(err) if err.kind().is_retryable() => "STORAGE_UNAVAILABLE",
            RegistryError::Storage(_) => "STORAGE_FAILED",
            RegistryError::Serialization(_) => "RECORD_INVALID",
            RegistryError::InvalidConfig(_) => "CONFIG_INVALID",
        }
    }
}

/// Error response format
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, serde::Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        if let RegistryError::Storage(err) = &self {
            tracing::error!(%code, kind = %err.kind(), "{message}\n{}", err.span_trace());
        } else if status.is_server_error() {
            tracing::error!(%code, "{message}");
        }

        let body = ErrorResponse {
            errors: vec![ErrorDetail { code, message }],
        };

        (status, axum::Json(body)).into_response()
    }
}
