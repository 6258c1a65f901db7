//! Session lifecycle: credential hashing, opaque token issuance, rotation,
//! and validity checking
//!
//! Tokens are 32 bytes from the OS CSPRNG, hex-encoded (256 bits of
//! entropy). Session state lives on the user row; login and renewal rotate
//! the session token, its expiry, and the update token together, and logout
//! both expires the session and rotates the token to a value no caller
//! holds.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::OnceLock;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    models::{SessionResponse, User},
    repositories::UserRepository,
    validation,
};

/// How long a freshly issued session token stays valid
const SESSION_TTL_HOURS: i64 = 24;

/// Generate an opaque bearer token: 32 CSPRNG bytes, hex-encoded
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a raw password with argon2 and a fresh per-password salt
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })?
        .to_string();

    Ok(hash)
}

/// Verify a raw password against a stored argon2 PHC string
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// A stored hash verified against on the unknown-username login path, so
/// that path costs the same as a wrong-password verification.
fn dummy_hash() -> &'static str {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();
    DUMMY_HASH.get_or_init(|| {
        hash_password("fitcheck.dummy.credential").expect("hashing a fixed string cannot fail")
    })
}

/// True while `now` is strictly before the stored expiry
fn session_active(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now < expires_at
}

/// Session manager: owns token issuance, renewal, and validity checking
#[derive(Clone)]
pub struct SessionService {
    users: UserRepository,
}

impl SessionService {
    /// Create a new session service
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user and hand back their first token triple
    pub async fn register(&self, username: &str, password: &str) -> ApiResult<SessionResponse> {
        validation::validate_username(username).map_err(ApiError::Validation)?;
        validation::validate_password(password).map_err(ApiError::Validation)?;

        let password_hash = hash_password(password)?;
        let session_token = generate_token();
        let update_token = generate_token();
        let session_expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

        let created = self
            .users
            .create(
                username,
                &password_hash,
                &session_token,
                session_expires_at,
                &update_token,
            )
            .await
            .map_err(|e| {
                error!("Failed to create user: {}", e);
                ApiError::InternalServerError
            })?;

        match created {
            Some(user) => {
                info!("Registered user: {}", user.username);
                Ok(SessionResponse {
                    session_token,
                    session_expiration: session_expires_at,
                    update_token,
                })
            }
            None => Err(ApiError::Conflict("Username taken".to_string())),
        }
    }

    /// Authenticate a username/password pair and rotate the token triple
    ///
    /// The unknown-username and wrong-password paths return the same error
    /// and burn the same hashing cost.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<SessionResponse> {
        let user = self.users.find_by_username(username).await.map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?;

        match user {
            Some(user) => {
                if !verify_password(password, &user.password_hash) {
                    return Err(ApiError::InvalidCredentials);
                }
                self.issue(&user).await
            }
            None => {
                let _ = verify_password(password, dummy_hash());
                Err(ApiError::InvalidCredentials)
            }
        }
    }

    /// Invalidate the session behind a live session token
    ///
    /// The expiry is set to now and the token is replaced with a fresh value
    /// never disclosed to any caller, so the old token cannot be replayed
    /// inside the same clock tick.
    pub async fn logout(&self, session_token: &str) -> ApiResult<()> {
        let user = self
            .users
            .find_by_session_token(session_token)
            .await
            .map_err(|e| {
                error!("Failed to look up session token: {}", e);
                ApiError::InternalServerError
            })?
            .ok_or(ApiError::InvalidToken)?;

        if !session_active(user.session_expires_at, Utc::now()) {
            return Err(ApiError::InvalidToken);
        }

        self.users
            .invalidate_session(user.id, &generate_token())
            .await
            .map_err(|e| {
                error!("Failed to invalidate session: {}", e);
                ApiError::InternalServerError
            })?;

        info!("Logged out user: {}", user.username);
        Ok(())
    }

    /// Mint a fresh token triple from an update token
    pub async fn renew(&self, update_token: &str) -> ApiResult<SessionResponse> {
        let user = self
            .users
            .find_by_update_token(update_token)
            .await
            .map_err(|e| {
                error!("Failed to look up update token: {}", e);
                ApiError::InternalServerError
            })?
            .ok_or(ApiError::InvalidToken)?;

        self.issue(&user).await
    }

    /// Resolve the user behind a session token, if it is still active
    pub async fn verify_session(&self, session_token: &str) -> ApiResult<Option<User>> {
        let user = self
            .users
            .find_by_session_token(session_token)
            .await
            .map_err(|e| {
                error!("Failed to look up session token: {}", e);
                ApiError::InternalServerError
            })?;

        Ok(user.filter(|u| session_active(u.session_expires_at, Utc::now())))
    }

    /// Rotate session token, expiry, and update token for a user
    async fn issue(&self, user: &User) -> ApiResult<SessionResponse> {
        let session_token = generate_token();
        let update_token = generate_token();
        let session_expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);

        self.users
            .rotate_session(user.id, &session_token, session_expires_at, &update_token)
            .await
            .map_err(|e| {
                error!("Failed to rotate session: {}", e);
                ApiError::InternalServerError
            })?;

        info!("Issued new session for user: {}", user.username);
        Ok(SessionResponse {
            session_token,
            session_expiration: session_expires_at,
            update_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_token_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").expect("hashing failed");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("hunter2hunter3", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }

    #[test]
    fn test_session_active_boundary() {
        let now = Utc::now();
        assert!(session_active(now + Duration::seconds(1), now));
        // Expiry is exclusive: a token expiring exactly now is dead.
        assert!(!session_active(now, now));
        assert!(!session_active(now - Duration::seconds(1), now));
    }
}
