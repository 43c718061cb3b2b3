//! Metadata persistence for basecamp.
//!
//! Resources, committed assets, and their variant rows live here. The store
//! is trait-based so server handlers and tests depend on `MetadataStore`
//! rather than a concrete database.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use repos::{AssetRepo, ResourceRepo};
pub use store::{MetadataStore, SqliteStore};

use basecamp_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store))
        }
    }
}
