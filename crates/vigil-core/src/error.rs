use thiserror::Error;
use vigil_store::StoreError;

/// Errors produced by core domain operations.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("workspace error: {0}")]
    Workspace(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("report error: {0}")]
    Report(String),
}

pub type VigilResult<T> = Result<T, VigilError>;
