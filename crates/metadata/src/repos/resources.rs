//! Recreation resource repository.

use crate::error::MetadataResult;
use crate::models::ResourceRow;
use async_trait::async_trait;

/// Operations on the resources table.
#[async_trait]
pub trait ResourceRepo {
    /// Insert a resource row.
    async fn create_resource(&self, resource: &ResourceRow) -> MetadataResult<()>;

    /// Fetch a resource by id.
    async fn get_resource(&self, rec_resource_id: &str) -> MetadataResult<Option<ResourceRow>>;

    /// Check whether a resource exists.
    async fn resource_exists(&self, rec_resource_id: &str) -> MetadataResult<bool>;
}
