//! Custom error types for the common library
//!
//! This module defines infrastructure error types shared by the Fitcheck
//! services: database connectivity/query failures and object-storage
//! failures.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Custom error type for object-storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage backend rejected or failed the request
    #[error("Object storage request failed: {0}")]
    Request(String),

    /// Configuration error
    #[error("Object storage configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
