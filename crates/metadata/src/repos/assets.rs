//! Asset repository.

use crate::error::MetadataResult;
use crate::models::{AssetRow, AssetVariantRow, AssetWithVariants};
use async_trait::async_trait;

/// Operations on the assets and asset_variants tables.
#[async_trait]
pub trait AssetRepo {
    /// Insert an asset and its variant rows in a single transaction.
    ///
    /// Fails with `AlreadyExists` if the asset id is already committed; the
    /// transaction leaves no partial rows behind on any failure.
    async fn create_asset(
        &self,
        asset: &AssetRow,
        variants: &[AssetVariantRow],
    ) -> MetadataResult<()>;

    /// Fetch an asset by id.
    async fn get_asset(&self, asset_id: &str) -> MetadataResult<Option<AssetRow>>;

    /// Fetch the variant rows of an asset, in stable size-code order.
    async fn get_asset_variants(&self, asset_id: &str) -> MetadataResult<Vec<AssetVariantRow>>;

    /// List all committed assets of one kind under a resource, newest first.
    async fn list_assets(
        &self,
        rec_resource_id: &str,
        kind: &str,
    ) -> MetadataResult<Vec<AssetWithVariants>>;

    /// Delete an asset row and its variants in a single transaction.
    ///
    /// Fails with `NotFound` if the asset does not exist.
    async fn delete_asset(&self, asset_id: &str) -> MetadataResult<()>;
}
