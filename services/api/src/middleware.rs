//! Middleware for bearer-token session authentication

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// The user resolved from a verified session token, inserted into request
/// extensions for handlers behind the auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Pull the bearer token out of the Authorization header
///
/// The `Bearer` scheme is matched case-sensitively and the remainder is
/// trimmed; a missing header and an unusable one are distinct errors.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingAuthHeader)?;

    let value = value.to_str().map_err(|_| ApiError::InvalidAuthHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(ApiError::InvalidAuthHeader);
    }

    Ok(token.to_string())
}

/// Require a live session token and expose the owning user to the handler
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let user = state
        .session_service
        .verify_session(&token)
        .await?
        .ok_or(ApiError::InvalidToken)?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}
