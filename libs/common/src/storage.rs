//! Object-storage module for the Fitcheck application
//!
//! This module provides configuration and client construction for the
//! S3-compatible bucket that holds uploaded clothing images. Uploaded
//! objects are keyed `{salt}.{extension}` and publicly readable under the
//! configured base URL.

use crate::error::{StorageError, StorageResult};
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use std::env;
use tracing::info;

/// Configuration for the image bucket
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding uploaded images
    pub bucket: String,
    /// Public base URL under which uploaded objects are served
    pub base_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ASSET_BUCKET_NAME`: bucket for uploaded images (default: "fitcheck-assets")
    /// - `ASSET_BASE_URL`: public base URL for uploaded objects
    ///
    /// AWS credentials and region (or a custom `AWS_ENDPOINT_URL` for
    /// S3-compatible stores) come from the standard AWS environment.
    pub fn from_env() -> StorageResult<Self> {
        let bucket =
            env::var("ASSET_BUCKET_NAME").unwrap_or_else(|_| "fitcheck-assets".to_string());

        let base_url = env::var("ASSET_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Ok(StorageConfig {
            bucket,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Build an S3 client from the ambient AWS environment
pub async fn init_client() -> StorageResult<Client> {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Client::new(&config);
    info!("S3 client initialized");
    Ok(client)
}

/// Check that the configured bucket is reachable
pub async fn health_check(client: &Client, config: &StorageConfig) -> StorageResult<bool> {
    client
        .head_bucket()
        .bucket(&config.bucket)
        .send()
        .await
        .map_err(|e| StorageError::Request(e.to_string()))?;

    Ok(true)
}
