//! Wardrobe models: assets, clothing, outfits, and tags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored image: the object key is `{salt}.{extension}` under `base_url`
#[derive(Debug, Clone, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub base_url: String,
    pub salt: String,
    pub extension: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Object-storage key for this asset
    pub fn object_key(&self) -> String {
        format!("{}.{}", self.salt, self.extension)
    }

    /// Public URL the stored image is served from
    pub fn public_url(&self) -> String {
        format!("{}/{}", self.base_url, self.object_key())
    }
}

/// Clothing entity: one owner, one asset, one classification label
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Clothing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub asset_id: Uuid,
    pub classification: String,
    pub created_at: DateTime<Utc>,
}

/// Outfit entity: up to four clothing references by role
#[derive(Debug, Clone, FromRow)]
pub struct Outfit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headwear_id: Option<Uuid>,
    pub top_id: Option<Uuid>,
    pub bottom_id: Option<Uuid>,
    pub shoes_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Tag entity: a deduplicated label attachable to many outfits
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
}

/// Request for clothing creation with an embedded base64 image
#[derive(Deserialize)]
pub struct CreateClothingRequest {
    pub classification: Option<String>,
    pub username: Option<String>,
    pub image_data: Option<String>,
}

/// Request for filtering clothing by owner and classification
#[derive(Deserialize)]
pub struct ClothingFilterRequest {
    pub username: Option<String>,
    pub classification: Option<String>,
}

/// Request for outfit creation; every role reference is optional
#[derive(Deserialize)]
pub struct CreateOutfitRequest {
    pub headwear_id: Option<Uuid>,
    pub top_id: Option<Uuid>,
    pub bottom_id: Option<Uuid>,
    pub shoes_id: Option<Uuid>,
    pub username: Option<String>,
}

/// Request for attaching a tag to an outfit
#[derive(Deserialize)]
pub struct AddTagRequest {
    pub label: Option<String>,
}

/// Response for asset operations
#[derive(Debug, Clone, Serialize)]
pub struct AssetResponse {
    pub id: Uuid,
    pub url: String,
    pub extension: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Asset> for AssetResponse {
    fn from(asset: &Asset) -> Self {
        AssetResponse {
            id: asset.id,
            url: asset.public_url(),
            extension: asset.extension.clone(),
            width: asset.width,
            height: asset.height,
            created_at: asset.created_at,
        }
    }
}

/// Clothing serialized together with its asset, as returned by the filter
/// endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ClothingAssetResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub classification: String,
    pub asset: AssetResponse,
}

/// Outfit serialized together with its tags
#[derive(Debug, Clone, Serialize)]
pub struct OutfitResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headwear_id: Option<Uuid>,
    pub top_id: Option<Uuid>,
    pub bottom_id: Option<Uuid>,
    pub shoes_id: Option<Uuid>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
}

impl OutfitResponse {
    pub fn new(outfit: Outfit, tags: Vec<Tag>) -> Self {
        OutfitResponse {
            id: outfit.id,
            user_id: outfit.user_id,
            headwear_id: outfit.headwear_id,
            top_id: outfit.top_id,
            bottom_id: outfit.bottom_id,
            shoes_id: outfit.shoes_id,
            tags,
            created_at: outfit.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_asset_object_key_and_url() {
        let asset = Asset {
            id: Uuid::new_v4(),
            base_url: "https://assets.example.com".to_string(),
            salt: "A1B2C3D4E5F6G7H8".to_string(),
            extension: "png".to_string(),
            width: 640,
            height: 480,
            created_at: Utc::now(),
        };

        assert_eq!(asset.object_key(), "A1B2C3D4E5F6G7H8.png");
        assert_eq!(
            asset.public_url(),
            "https://assets.example.com/A1B2C3D4E5F6G7H8.png"
        );
    }
}
