//! Image-asset ingestion: data-URI parsing, decoding, and upload to the
//! public image bucket
//!
//! Ingestion is staged so each failure surfaces as a typed error: the
//! declared MIME type is checked against the allow-list before anything is
//! decoded, the payload is decoded and measured before anything
//! touches the network, and only then is the image spilled to a scoped temp
//! file and uploaded under its `{salt}.{extension}` key.

use aws_sdk_s3::{Client, primitives::ByteStream, types::ObjectCannedAcl};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::GenericImageView;
use rand::Rng;
use std::io::Write;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    error::ApiError,
    models::wardrobe::Asset,
    repositories::wardrobe::AssetRepository,
};

/// Declared image types accepted for upload
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "gif", "jpg", "jpeg"];

/// Length of the random object-key salt
const SALT_LEN: usize = 16;

const SALT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Typed failure for each stage of ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    /// Declared MIME type outside the allow-list
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Payload is not a decodable base64 image
    #[error("could not decode image: {0}")]
    Decode(String),

    /// Object-storage upload failed
    #[error("object storage upload failed: {0}")]
    Upstream(String),

    /// Local temp-file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Recording the asset row failed
    #[error("failed to record asset: {0}")]
    Database(String),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedType(t) => ApiError::UnsupportedMediaType(t),
            IngestError::Decode(msg) => ApiError::Decode(msg),
            IngestError::Upstream(msg) => ApiError::Upstream(msg),
            IngestError::Io(e) => {
                error!("Ingestion I/O error: {}", e);
                ApiError::InternalServerError
            }
            IngestError::Database(msg) => {
                error!("Failed to record asset: {}", msg);
                ApiError::InternalServerError
            }
        }
    }
}

/// A validated, decoded upload ready for storage
#[derive(Debug)]
pub struct DecodedUpload {
    pub bytes: Vec<u8>,
    pub extension: String,
    pub width: i32,
    pub height: i32,
}

impl DecodedUpload {
    /// Parse a `data:image/...;base64,` URI into raw bytes plus dimensions
    ///
    /// Pure CPU work; nothing here touches the database or the network, so
    /// a disallowed type is rejected before any upstream call is made.
    pub fn parse(image_data: &str) -> Result<Self, IngestError> {
        let rest = image_data
            .strip_prefix("data:")
            .ok_or_else(|| IngestError::Decode("missing data URI prefix".to_string()))?;

        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| IngestError::Decode("missing base64 marker".to_string()))?;

        let extension = mime
            .strip_prefix("image/")
            .filter(|subtype| ALLOWED_EXTENSIONS.contains(subtype))
            .ok_or_else(|| IngestError::UnsupportedType(mime.to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| IngestError::Decode(format!("invalid base64 payload: {}", e)))?;

        let dimensions = image::load_from_memory(&bytes)
            .map_err(|e| IngestError::Decode(format!("undecodable image payload: {}", e)))?;

        Ok(DecodedUpload {
            width: dimensions.width() as i32,
            height: dimensions.height() as i32,
            extension: extension.to_string(),
            bytes,
        })
    }

    /// Content type to store the object with
    pub fn content_type(&self) -> &'static str {
        match self.extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "image/jpeg",
        }
    }
}

/// Generate a random object-key salt: 16 uppercase alphanumerics
///
/// Statistical uniqueness only; the unique (salt, extension) constraint on
/// the assets table catches the astronomically unlikely collision.
pub fn generate_object_salt() -> String {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN)
        .map(|_| SALT_CHARSET[rng.gen_range(0..SALT_CHARSET.len())] as char)
        .collect()
}

/// Validates, stores, and records uploaded images
#[derive(Clone)]
pub struct AssetIngestor {
    s3_client: Client,
    bucket: String,
    base_url: String,
    assets: AssetRepository,
}

impl AssetIngestor {
    /// Create a new asset ingestor
    pub fn new(s3_client: Client, bucket: String, base_url: String, assets: AssetRepository) -> Self {
        Self {
            s3_client,
            bucket,
            base_url,
            assets,
        }
    }

    /// Ingest a base64 data-URI image: decode, upload, record
    ///
    /// No retry on upload failure; the whole ingestion fails and the temp
    /// file is cleaned up on every exit path.
    pub async fn ingest(&self, image_data: &str) -> Result<Asset, IngestError> {
        let upload = DecodedUpload::parse(image_data)?;
        let salt = generate_object_salt();
        let key = format!("{}.{}", salt, upload.extension);

        // NamedTempFile unlinks itself on drop, success or failure.
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(&upload.bytes)?;
        temp_file.flush()?;

        let body = ByteStream::from_path(temp_file.path())
            .await
            .map_err(|e| IngestError::Upstream(e.to_string()))?;

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(upload.content_type())
            .body(body)
            .send()
            .await
            .map_err(|e| IngestError::Upstream(e.to_string()))?;

        info!("Uploaded object {} to bucket {}", key, self.bucket);

        let asset = self
            .assets
            .insert(
                &self.base_url,
                &salt,
                &upload.extension,
                upload.width,
                upload.height,
            )
            .await
            .map_err(|e| IngestError::Database(e.to_string()))?;

        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    // 1x1 transparent GIF
    const GIF_1X1: &str =
        "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

    #[test]
    fn test_parse_png_dimensions() {
        let upload = DecodedUpload::parse(PNG_1X1).expect("valid PNG should parse");
        assert_eq!(upload.extension, "png");
        assert_eq!(upload.width, 1);
        assert_eq!(upload.height, 1);
        assert_eq!(upload.content_type(), "image/png");
    }

    #[test]
    fn test_parse_gif() {
        let upload = DecodedUpload::parse(GIF_1X1).expect("valid GIF should parse");
        assert_eq!(upload.extension, "gif");
        assert_eq!(upload.width, 1);
        assert_eq!(upload.height, 1);
        assert_eq!(upload.content_type(), "image/gif");
    }

    #[test]
    fn test_disallowed_type_rejected_before_decoding() {
        let err = DecodedUpload::parse("data:image/webp;base64,AAAA").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedType(t) if t == "image/webp"));

        let err = DecodedUpload::parse("data:application/pdf;base64,AAAA").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedType(_)));
    }

    #[test]
    fn test_missing_prefix_is_decode_error() {
        assert!(matches!(
            DecodedUpload::parse("just some text"),
            Err(IngestError::Decode(_))
        ));
        assert!(matches!(
            DecodedUpload::parse("data:image/png,AAAA"),
            Err(IngestError::Decode(_))
        ));
    }

    #[test]
    fn test_malformed_base64_is_decode_error() {
        assert!(matches!(
            DecodedUpload::parse("data:image/png;base64,!!!not-base64!!!"),
            Err(IngestError::Decode(_))
        ));
    }

    #[test]
    fn test_non_image_payload_is_decode_error() {
        // Valid base64, but the bytes are not an image.
        let payload = STANDARD.encode(b"hello there");
        let uri = format!("data:image/png;base64,{}", payload);
        assert!(matches!(
            DecodedUpload::parse(&uri),
            Err(IngestError::Decode(_))
        ));
    }

    #[test]
    fn test_object_salt_shape() {
        let salt = generate_object_salt();
        assert_eq!(salt.len(), 16);
        assert!(
            salt.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
        assert_ne!(salt, generate_object_salt());
    }
}
