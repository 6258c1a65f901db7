//! Integration tests for the session lifecycle and the wardrobe store
//!
//! These tests exercise the service/repository layer against a live
//! PostgreSQL instance (`DATABASE_URL`); they apply migrations themselves
//! and are ignored by default. Run with `cargo test -- --ignored`.

use api::{
    error::ApiError,
    models::wardrobe::Clothing,
    repositories::{
        UserRepository,
        wardrobe::{AssetRepository, ClothingRepository, OutfitRepository, TagRepository},
    },
    sessions::{SessionService, generate_token},
};
use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = DatabaseConfig::from_env()?;
    let pool = init_pool(&config).await?;
    sqlx::migrate!().run(&pool).await?;
    Ok(pool)
}

fn unique_username() -> String {
    format!("user_{}", &generate_token()[..12])
}

/// Register a fresh user and give them one clothing item.
async fn seed_clothing(pool: &PgPool) -> Result<(Uuid, Clothing), Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool.clone());
    let sessions = SessionService::new(users.clone());
    let username = unique_username();

    sessions.register(&username, "correct-password").await?;
    let user = users
        .find_by_username(&username)
        .await?
        .expect("just registered");

    let asset = AssetRepository::new(pool.clone())
        .insert(
            "https://assets.test",
            &generate_token()[..16],
            "png",
            1,
            1,
        )
        .await?;
    let item = ClothingRepository::new(pool.clone())
        .create(user.id, asset.id, "top")
        .await?;

    Ok((user.id, item))
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_registration_conflicts() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let sessions = SessionService::new(UserRepository::new(pool));
    let username = unique_username();

    sessions.register(&username, "first-password").await?;

    let second = sessions.register(&username, "other-password").await;
    assert!(matches!(second, Err(ApiError::Conflict(_))));

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_login_failures_are_indistinguishable() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let sessions = SessionService::new(UserRepository::new(pool));
    let username = unique_username();

    sessions.register(&username, "correct-password").await?;

    let wrong_password = sessions.login(&username, "wrong-password").await;
    let unknown_user = sessions.login(&unique_username(), "wrong-password").await;

    let wrong_password = wrong_password.expect_err("wrong password must fail");
    let unknown_user = unknown_user.expect_err("unknown user must fail");

    assert!(matches!(wrong_password, ApiError::InvalidCredentials));
    assert!(matches!(unknown_user, ApiError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_renew_rotates_all_three_values() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let sessions = SessionService::new(UserRepository::new(pool));

    let first = sessions
        .register(&unique_username(), "correct-password")
        .await?;
    let renewed = sessions.renew(&first.update_token).await?;

    assert_ne!(renewed.session_token, first.session_token);
    assert_ne!(renewed.update_token, first.update_token);
    assert!(renewed.session_expiration > first.session_expiration);

    // The old update token is gone after rotation.
    let replay = sessions.renew(&first.update_token).await;
    assert!(matches!(replay, Err(ApiError::InvalidToken)));

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_verify_session_rejects_expired_token() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let sessions = SessionService::new(UserRepository::new(pool.clone()));
    let username = unique_username();

    let session = sessions.register(&username, "correct-password").await?;

    let user = sessions
        .verify_session(&session.session_token)
        .await?
        .expect("fresh session must verify");
    assert_eq!(user.username, username);

    // Force the stored expiry into the past; the token string still matches.
    sqlx::query("UPDATE users SET session_expires_at = now() - interval '1 second' WHERE username = $1")
        .bind(&username)
        .execute(&pool)
        .await?;

    let user = sessions.verify_session(&session.session_token).await?;
    assert!(user.is_none());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_logout_invalidates_and_rotates() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let sessions = SessionService::new(UserRepository::new(pool));

    let session = sessions
        .register(&unique_username(), "correct-password")
        .await?;

    sessions.logout(&session.session_token).await?;

    // The old token no longer resolves at all, not merely as expired.
    let user = sessions.verify_session(&session.session_token).await?;
    assert!(user.is_none());

    let again = sessions.logout(&session.session_token).await;
    assert!(matches!(again, Err(ApiError::InvalidToken)));

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_nonexistent_returns_none() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let clothing = ClothingRepository::new(pool.clone());
    let outfits = OutfitRepository::new(pool);

    assert!(clothing.delete(Uuid::new_v4(), Uuid::new_v4()).await?.is_none());
    assert!(outfits.delete(Uuid::new_v4(), Uuid::new_v4()).await?.is_none());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_clothing_clears_outfit_roles() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let (user_id, item) = seed_clothing(&pool).await?;
    let clothing = ClothingRepository::new(pool.clone());
    let outfits = OutfitRepository::new(pool);

    let outfit = outfits
        .create(user_id, None, Some(item.id), None, None)
        .await?;
    assert_eq!(outfit.top_id, Some(item.id));

    // Deleting a referenced item must succeed; the outfit keeps its row but
    // drops the reference.
    let deleted = clothing.delete(item.id, user_id).await?;
    assert!(deleted.is_some());

    let outfit = outfits.find(outfit.id).await?.expect("outfit survives");
    assert_eq!(outfit.top_id, None);

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_is_scoped_to_owner() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let (owner_id, item) = seed_clothing(&pool).await?;
    let (other_id, _) = seed_clothing(&pool).await?;
    let clothing = ClothingRepository::new(pool.clone());
    let outfits = OutfitRepository::new(pool);

    // Someone else's id deletes nothing and leaves the row in place.
    assert!(clothing.delete(item.id, other_id).await?.is_none());
    assert!(clothing.delete(item.id, owner_id).await?.is_some());

    let outfit = outfits.create(owner_id, None, None, None, None).await?;
    assert!(outfits.delete(outfit.id, other_id).await?.is_none());
    assert!(outfits.delete(outfit.id, owner_id).await?.is_some());

    Ok(())
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_concurrent_tag_upsert_converges() -> Result<(), Box<dyn std::error::Error>> {
    let pool = setup().await?;
    let tags = TagRepository::new(pool);
    let label = format!("tag_{}", &generate_token()[..12]);

    let (a, b) = tokio::join!(tags.find_or_create(&label), tags.find_or_create(&label));
    let (a, b) = (a?, b?);

    assert_eq!(a.id, b.id);
    assert_eq!(a.label, label);

    Ok(())
}
