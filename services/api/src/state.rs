//! Application state shared across handlers

use crate::{
    assets::AssetIngestor,
    repositories::wardrobe::{ClothingRepository, OutfitRepository, TagRepository},
    sessions::SessionService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub clothing_repository: ClothingRepository,
    pub outfit_repository: OutfitRepository,
    pub tag_repository: TagRepository,
    pub session_service: SessionService,
    pub asset_ingestor: AssetIngestor,
}
