//! Server Error Types
//!
//! Defines error types for the HTTP layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::callback::DispatchError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed request (bad reference, missing value)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No binding or resource matches the request
    #[error("Not found: {0}")]
    NotFound(String),

    /// The callback rejected its input values
    #[error("{0}")]
    Callback(DispatchError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DispatchError> for ServerError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::InvalidReference(_) | DispatchError::ArgumentCount { .. } => {
                ServerError::BadRequest(error.to_string())
            }
            DispatchError::UnknownBinding(_) => ServerError::NotFound(error.to_string()),
            DispatchError::ShapeMismatch { .. } => ServerError::Internal(error.to_string()),
            DispatchError::Callback { .. } => ServerError::Callback(error),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServerError::Callback(_) => (StatusCode::UNPROCESSABLE_ENTITY, "CALLBACK_ERROR"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ServerError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "Request failed"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CallbackError;

    #[test]
    fn test_dispatch_error_mapping() {
        let err = ServerError::from(DispatchError::UnknownBinding("a.b".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = ServerError::from(DispatchError::InvalidReference("x".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let err = ServerError::from(DispatchError::Callback {
            output: "a.b".to_string(),
            source: CallbackError::Failed("boom".to_string()),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
