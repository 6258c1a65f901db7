use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};
use common::storage::{self, StorageConfig};

use api::{
    assets::AssetIngestor,
    repositories::{
        UserRepository,
        wardrobe::{AssetRepository, ClothingRepository, OutfitRepository, TagRepository},
    },
    routes,
    sessions::SessionService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Fitcheck API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply schema migrations
    sqlx::migrate!().run(&pool).await?;
    info!("Database migrations applied");

    // Initialize the image bucket client
    let storage_config = StorageConfig::from_env()?;
    let s3_client = storage::init_client().await?;

    // Initialize repositories and services
    let user_repository = UserRepository::new(pool.clone());
    let asset_repository = AssetRepository::new(pool.clone());
    let clothing_repository = ClothingRepository::new(pool.clone());
    let outfit_repository = OutfitRepository::new(pool.clone());
    let tag_repository = TagRepository::new(pool.clone());

    let session_service = SessionService::new(user_repository);
    let asset_ingestor = AssetIngestor::new(
        s3_client,
        storage_config.bucket.clone(),
        storage_config.base_url.clone(),
        asset_repository,
    );

    let app_state = AppState {
        clothing_repository,
        outfit_repository,
        tag_repository,
        session_service,
        asset_ingestor,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    info!("Fitcheck API service listening on 0.0.0.0:8000");

    axum::serve(listener, app).await?;

    Ok(())
}
