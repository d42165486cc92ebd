//! Error types for catalog operations

use thiserror::Error;

/// Main error type for container catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open container: {0}")]
    OpenFailed(String),

    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Pixel decode failed: {0}")]
    DecodeFailed(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Catalog is closed")]
    Closed,
}

/// Specialized Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::InvalidFormat(err.to_string())
    }
}
