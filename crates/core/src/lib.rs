//! Core domain types and shared logic for basecamp.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Asset identifiers and storage key derivation
//! - Asset kinds and the closed variant-code table
//! - Delivery URL construction
//! - Application configuration

pub mod asset;
pub mod config;
pub mod error;
pub mod variant;

pub use asset::{AssetId, asset_prefix, delivery_url, storage_key};
pub use error::{Error, Result};
pub use variant::{AssetKind, VariantCode};

/// Default presigned upload credential lifetime: 15 minutes.
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 900;

/// Default maximum accepted source file size: 64 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 64 * 1024 * 1024;
