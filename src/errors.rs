// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for the venue cache and its HTTP surface

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Covers the three failure families of the cache
/// (transport, storage, parse) plus request validation failures of the HTTP layer.
/// Each variant maps to an HTTP status code and a JSON error body.
#[derive(Error, Debug)]
pub enum VenueError {
    /// Network or search failure reported by the places provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Outbound search quota exhausted before any request was sent
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Write, commit or read failure in the venue store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Response payload did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl VenueError {
    fn code(&self) -> (StatusCode, &'static str) {
        match self {
            VenueError::Transport(_) => (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR"),
            VenueError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
            VenueError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            VenueError::Parse(_) => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
            VenueError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            VenueError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }
}

impl From<sqlx::Error> for VenueError {
    fn from(e: sqlx::Error) -> Self {
        VenueError::Storage(e.to_string())
    }
}

/// Convert VenueError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for VenueError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code) = self.code();

        let body = json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.code().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            VenueError::Transport("down".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            VenueError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            VenueError::Storage("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            VenueError::ValidationError("lat".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_sqlx_error_becomes_storage() {
        let err: VenueError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, VenueError::Storage(_)));
    }
}
