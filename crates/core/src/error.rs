//! Core error types.

use thiserror::Error;

/// Errors from core domain validation and parsing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid asset id: {0}")]
    InvalidAssetId(String),

    #[error("invalid resource id: {0}")]
    InvalidResourceId(String),

    #[error("unknown variant code: {0}")]
    UnknownVariantCode(String),

    #[error("unknown asset kind: {0}")]
    UnknownAssetKind(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
