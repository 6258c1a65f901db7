//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub mod wardrobe;

/// User entity
///
/// Session state lives directly on the user row: one current session token,
/// its expiry, and the update token used to mint a replacement. Auth
/// operations only ever mutate these three fields; the row itself is never
/// deleted.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub session_token: String,
    pub session_expires_at: DateTime<Utc>,
    pub update_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token triple returned by register, login, and session renewal
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_token: String,
    pub session_expiration: DateTime<Utc>,
    pub update_token: String,
}
