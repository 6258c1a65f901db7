//! Wardrobe repositories: assets, clothing, outfits, tags

use anyhow::Result;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::wardrobe::{
    Asset, AssetResponse, Clothing, ClothingAssetResponse, Outfit, Tag,
};

/// Asset repository for database operations
///
/// Assets are insert-only: created during ingestion, never updated or
/// deleted.
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a stored image
    pub async fn insert(
        &self,
        base_url: &str,
        salt: &str,
        extension: &str,
        width: i32,
        height: i32,
    ) -> Result<Asset> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (base_url, salt, extension, width, height)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, base_url, salt, extension, width, height, created_at
            "#,
        )
        .bind(base_url)
        .bind(salt)
        .bind(extension)
        .bind(width)
        .bind(height)
        .fetch_one(&self.pool)
        .await?;

        info!("Recorded asset {}", asset.object_key());
        Ok(asset)
    }
}

/// Clothing repository for database operations
#[derive(Clone)]
pub struct ClothingRepository {
    pool: PgPool,
}

impl ClothingRepository {
    /// Create a new clothing repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a clothing item owned by a user and backed by an asset
    pub async fn create(
        &self,
        user_id: Uuid,
        asset_id: Uuid,
        classification: &str,
    ) -> Result<Clothing> {
        let clothing = sqlx::query_as::<_, Clothing>(
            r#"
            INSERT INTO clothing (user_id, asset_id, classification)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, asset_id, classification, created_at
            "#,
        )
        .bind(user_id)
        .bind(asset_id)
        .bind(classification)
        .fetch_one(&self.pool)
        .await?;

        Ok(clothing)
    }

    /// Delete a clothing item owned by `user_id`, returning the deleted row
    ///
    /// The backing asset row is deliberately left in place, and outfit role
    /// columns referencing the item fall back to NULL via the schema.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<Option<Clothing>> {
        let clothing = sqlx::query_as::<_, Clothing>(
            r#"
            DELETE FROM clothing
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, asset_id, classification, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(clothing)
    }

    /// List a user's clothing with its assets, optionally restricted to one
    /// classification
    pub async fn filter(
        &self,
        user_id: Uuid,
        classification: Option<&str>,
    ) -> Result<Vec<ClothingAssetResponse>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.user_id, c.classification,
                   a.id AS asset_id, a.base_url, a.salt, a.extension,
                   a.width, a.height, a.created_at AS asset_created_at
            FROM clothing c
            JOIN assets a ON a.id = c.asset_id
            WHERE c.user_id = $1
              AND ($2::text IS NULL OR c.classification = $2)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(classification)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let asset = Asset {
                    id: row.get("asset_id"),
                    base_url: row.get("base_url"),
                    salt: row.get("salt"),
                    extension: row.get("extension"),
                    width: row.get("width"),
                    height: row.get("height"),
                    created_at: row.get("asset_created_at"),
                };
                ClothingAssetResponse {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    classification: row.get("classification"),
                    asset: AssetResponse::from(&asset),
                }
            })
            .collect();

        Ok(items)
    }
}

/// Outfit repository for database operations
#[derive(Clone)]
pub struct OutfitRepository {
    pool: PgPool,
}

impl OutfitRepository {
    /// Create a new outfit repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an outfit; every role reference is optional
    pub async fn create(
        &self,
        user_id: Uuid,
        headwear_id: Option<Uuid>,
        top_id: Option<Uuid>,
        bottom_id: Option<Uuid>,
        shoes_id: Option<Uuid>,
    ) -> Result<Outfit> {
        let outfit = sqlx::query_as::<_, Outfit>(
            r#"
            INSERT INTO outfits (user_id, headwear_id, top_id, bottom_id, shoes_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, headwear_id, top_id, bottom_id, shoes_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(headwear_id)
        .bind(top_id)
        .bind(bottom_id)
        .bind(shoes_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(outfit)
    }

    /// Find an outfit by id
    pub async fn find(&self, id: Uuid) -> Result<Option<Outfit>> {
        let outfit = sqlx::query_as::<_, Outfit>(
            r#"
            SELECT id, user_id, headwear_id, top_id, bottom_id, shoes_id, created_at
            FROM outfits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(outfit)
    }

    /// Delete an outfit owned by `user_id`, returning the deleted row
    ///
    /// Association rows go with it via ON DELETE CASCADE.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<Option<Outfit>> {
        let outfit = sqlx::query_as::<_, Outfit>(
            r#"
            DELETE FROM outfits
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, headwear_id, top_id, bottom_id, shoes_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(outfit)
    }

    /// Tags attached to an outfit
    pub async fn tags_for(&self, outfit_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.label
            FROM tags t
            JOIN outfit_tags ot ON ot.tag_id = t.id
            WHERE ot.outfit_id = $1
            ORDER BY t.label
            "#,
        )
        .bind(outfit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }
}

/// Tag repository for database operations
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a tag by label, creating it if absent
    ///
    /// A single upsert against the unique label column, so concurrent calls
    /// with the same label converge on one row. The DO UPDATE arm makes the
    /// statement return the existing row instead of nothing.
    pub async fn find_or_create(&self, label: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (label)
            VALUES ($1)
            ON CONFLICT (label) DO UPDATE SET label = EXCLUDED.label
            RETURNING id, label
            "#,
        )
        .bind(label)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    /// Attach a tag to an outfit; attaching twice is a no-op
    pub async fn attach(&self, outfit_id: Uuid, tag_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outfit_tags (outfit_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(outfit_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
