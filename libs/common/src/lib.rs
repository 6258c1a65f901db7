//! Common library for the Fitcheck application
//!
//! This crate provides shared infrastructure used by the Fitcheck services:
//! PostgreSQL connection pooling, S3 object-storage client construction,
//! and the error types both of them surface.

pub mod database;
pub mod error;
pub mod storage;
