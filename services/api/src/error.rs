//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// Username/password pair did not check out; deliberately carries no
    /// detail about which half failed
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Unknown or expired bearer token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// No Authorization header on a request that needs one
    #[error("Missing auth header")]
    MissingAuthHeader,

    /// Authorization header present but not a usable bearer token
    #[error("Invalid auth header")]
    InvalidAuthHeader,

    /// Duplicate resource (e.g. username already registered)
    #[error("{0}")]
    Conflict(String),

    /// Unknown id or token
    #[error("{0}")]
    NotFound(String),

    /// Declared image type outside the allow-list
    #[error("Unsupported image type: {0}")]
    UnsupportedMediaType(String),

    /// Image payload could not be decoded
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// Object storage call failed
    #[error("Object storage failure: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidCredentials
            | ApiError::MissingAuthHeader
            | ApiError::InvalidAuthHeader
            | ApiError::Conflict(_)
            | ApiError::Decode(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// True when the underlying database error is a foreign-key violation.
///
/// Used to turn an outfit referencing a nonexistent clothing id into a 400
/// instead of a 500.
pub fn is_fk_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .map(|code| code == "23503")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("Missing username".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Clothing not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::UnsupportedMediaType("webp".into()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::Upstream("put_object failed".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_credentials_error_is_uniform() {
        // Both login failure modes must serialize to the same message.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
    }
}
