/// Unified error types for the Shareit backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ShareError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors (malformed input, empty comment text, bad query params)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Login with an unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authorization header absent or not a bearer token
    #[error("Unauthorized: Invalid or missing token")]
    MissingToken,

    /// Token past its expiry
    #[error("Token expired, please log in again")]
    ExpiredToken,

    /// Any other token verification failure
    #[error("Invalid token")]
    InvalidToken,

    /// Signup with an email that is already registered
    #[error("Email already registered: {0}")]
    DuplicateIdentity(String),

    /// Missing user or media record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Both the remote store and the local fallback failed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Remote blob storage errors, recovered by the local fallback and
    /// surfaced only when wrapped in StorageUnavailable
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Convert ShareError to HTTP response
impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ShareError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "ValidationError".to_string(),
                Some(msg.clone()),
            ),
            ShareError::InvalidCredentials
            | ShareError::MissingToken
            | ShareError::ExpiredToken
            | ShareError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            ShareError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "Not found".to_string(),
                Some(msg.clone()),
            ),
            ShareError::DuplicateIdentity(_) => (StatusCode::CONFLICT, self.to_string(), None),
            ShareError::StorageUnavailable(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload failed".to_string(),
                Some(msg.clone()),
            ),
            ShareError::Database(e) => {
                // Don't leak details
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ShareError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ShareError::BlobStorage(e) | ShareError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse { error, details });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type ShareResult<T> = Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ShareError::Validation("empty text".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ShareError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ShareError::MissingToken, StatusCode::UNAUTHORIZED),
            (ShareError::ExpiredToken, StatusCode::UNAUTHORIZED),
            (ShareError::InvalidToken, StatusCode::UNAUTHORIZED),
            (ShareError::NotFound("photo".into()), StatusCode::NOT_FOUND),
            (
                ShareError::DuplicateIdentity("a@b.c".into()),
                StatusCode::CONFLICT,
            ),
            (
                ShareError::StorageUnavailable("both tiers failed".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_errors_keep_generic_body() {
        let resp = ShareError::Internal("secret detail".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
