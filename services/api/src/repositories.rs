//! Repositories for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::User;

pub mod wardrobe;

const USER_COLUMNS: &str = "id, username, password_hash, session_token, session_expires_at, \
                            update_token, created_at, updated_at";

/// User repository for database operations
///
/// Owns every read and write of the users table, including the session
/// fields the session service rotates.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user with their initial session state
    ///
    /// Returns `None` when the username is already taken; the unique
    /// constraint arbitrates concurrent registrations.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        session_token: &str,
        session_expires_at: DateTime<Utc>,
        update_token: &str,
    ) -> Result<Option<User>> {
        info!("Creating new user: {}", username);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, session_token, session_expires_at, update_token)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(session_token)
        .bind(session_expires_at)
        .bind(update_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by their current session token
    pub async fn find_by_session_token(&self, session_token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE session_token = $1"
        ))
        .bind(session_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by their update token
    pub async fn find_by_update_token(&self, update_token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE update_token = $1"
        ))
        .bind(update_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace a user's session token, expiry, and update token
    pub async fn rotate_session(
        &self,
        user_id: Uuid,
        session_token: &str,
        session_expires_at: DateTime<Utc>,
        update_token: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET session_token = $2, session_expires_at = $3, update_token = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(session_token)
        .bind(session_expires_at)
        .bind(update_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Expire a user's session immediately and swap in a replacement token
    /// nobody holds
    pub async fn invalidate_session(&self, user_id: Uuid, replacement_token: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET session_token = $2, session_expires_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(replacement_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
