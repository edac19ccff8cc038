//! Error types for the vigil storage layer

use thiserror::Error;

/// Errors that can occur in the persistence layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection error
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("store query failed: {0}")]
    Query(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Video id could not be resolved in the videos table
    #[error("video not found: {0}")]
    VideoNotFound(String),

    /// Serialization error
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Schema setup error
    #[error("schema setup failed: {0}")]
    SchemaSetup(String),

    /// Insert/update that returned no row
    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
