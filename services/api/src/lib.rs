//! Fitcheck API service
//!
//! A wardrobe/outfit-tracking backend: bearer-token session auth, base64
//! image ingestion into an S3-compatible bucket, and clothing / outfit /
//! tag CRUD over PostgreSQL.

pub mod assets;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod validation;
