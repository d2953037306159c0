//! Error types for coinlens-api
//!
//! Server-side failures carry only a generic message; the underlying cause is
//! logged where the failure happens and never returned to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coinlens_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map a common error to its HTTP kind
    ///
    /// Client-caused errors keep their message. Anything else is logged with
    /// `context` and replaced by it.
    pub fn from_common(err: CommonError, context: &str) -> Self {
        match err {
            CommonError::InvalidInput(msg) => ApiError::BadRequest(msg),
            CommonError::NotFound(msg) => ApiError::NotFound(msg),
            other => {
                error!("{}: {}", context, other);
                ApiError::Internal(context.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiError::NotFound(msg) => ("NOT_FOUND", msg),
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::from_common(CommonError::InvalidInput("Name is required".into()), "ctx");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Name is required"));

        let err = ApiError::from_common(CommonError::NotFound("Coin not found".into()), "ctx");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = ApiError::from_common(CommonError::Io(io), "Failed to update coin");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Internal(ref m) if m == "Failed to update coin"));
    }
}
