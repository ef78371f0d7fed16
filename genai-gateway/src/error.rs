//! Caller-facing failures of the callable endpoints.
//!
//! Every failure leaving an operation is one of these two kinds; transport
//! and parsing errors are logged and collapsed into [`CallableError::Internal`]
//! before they reach the wire.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallableError {
    /// A required field is missing, empty or oversized. Raised before any
    /// upstream traffic.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The upstream call failed or was rejected. The message is generic; the
    /// cause is only logged.
    #[error("internal: {0}")]
    Internal(String),
}

impl CallableError {
    /// Machine-readable status of the callable protocol.
    pub fn status(&self) -> &'static str {
        match self {
            CallableError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CallableError::Internal(_) => "INTERNAL",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CallableError::InvalidArgument(msg) | CallableError::Internal(msg) => msg,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            CallableError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CallableError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `{"error": {"status": ..., "message": ...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                status: self.status().to_string(),
                message: self.message().to_string(),
            },
        };

        (self.http_status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_is_400() {
        let err = CallableError::InvalidArgument("missing prompt".to_string());
        assert_eq!(err.status(), "INVALID_ARGUMENT");
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "missing prompt");
    }

    #[test]
    fn internal_is_500() {
        let response = CallableError::Internal("oops".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
