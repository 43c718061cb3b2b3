//! Direct upload execution: presign, derive, transfer, finalize.

use crate::api::{AssetApi, AssetSummary, PresignedUpload};
use crate::error::UploadError;
use crate::processor::{ProcessedVariant, ProgressFn, VariantProcessor};
use crate::transfer::VariantTransfer;
use basecamp_core::variant::AssetKind;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

/// Runs one complete direct upload.
///
/// All renditions are derived before any byte is transferred, the PUTs run
/// concurrently, and the commit only happens once every transfer succeeded.
/// There is no partial success: a failed transfer leaves the asset
/// uncommitted and invisible.
pub struct UploadExecutor {
    api: Arc<dyn AssetApi>,
    transfer: Arc<dyn VariantTransfer>,
    processor: Arc<dyn VariantProcessor>,
}

impl UploadExecutor {
    pub fn new(
        api: Arc<dyn AssetApi>,
        transfer: Arc<dyn VariantTransfer>,
        processor: Arc<dyn VariantProcessor>,
    ) -> Self {
        Self {
            api,
            transfer,
            processor,
        }
    }

    /// Request upload credentials for a new asset.
    pub async fn request_credentials(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        file_name: &str,
    ) -> Result<PresignedUpload, UploadError> {
        self.api.presign(kind, rec_resource_id, file_name).await
    }

    /// Derive the rendition set for a source file.
    pub async fn derive_variants(
        &self,
        kind: AssetKind,
        source: bytes::Bytes,
        progress: ProgressFn,
    ) -> Result<Vec<ProcessedVariant>, UploadError> {
        self.processor.process(kind, source, progress).await
    }

    /// Transfer every rendition to its presigned URL, concurrently.
    ///
    /// Each required variant must have both a grant and derived bytes; a
    /// mismatch fails before any transfer starts.
    pub async fn transfer_variants(
        &self,
        kind: AssetKind,
        grants: &PresignedUpload,
        variants: &[ProcessedVariant],
    ) -> Result<HashMap<String, u64>, UploadError> {
        let mut puts = Vec::with_capacity(kind.required_variants().len());
        let mut sizes = HashMap::new();

        for code in kind.required_variants() {
            let grant = grants
                .presigned_urls
                .iter()
                .find(|g| g.size_code == code.as_str())
                .ok_or_else(|| {
                    UploadError::Transfer(format!("no upload credential for variant {code}"))
                })?;
            let variant = variants.iter().find(|v| v.code == *code).ok_or_else(|| {
                UploadError::Transfer(format!("no derived rendition for variant {code}"))
            })?;

            sizes.insert(code.as_str().to_string(), variant.bytes.len() as u64);
            puts.push(self.transfer.put(
                &grant.url,
                kind.content_type(),
                variant.bytes.clone(),
            ));
        }

        try_join_all(puts).await?;
        Ok(sizes)
    }

    /// Commit the uploaded asset.
    pub async fn finalize(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        asset_id: &str,
        file_name: &str,
        variant_sizes: &HashMap<String, u64>,
    ) -> Result<AssetSummary, UploadError> {
        self.api
            .finalize(kind, rec_resource_id, asset_id, file_name, variant_sizes)
            .await
    }

    /// Run the full pipeline in one call.
    pub async fn upload(
        &self,
        kind: AssetKind,
        rec_resource_id: &str,
        file_name: &str,
        source: bytes::Bytes,
        progress: ProgressFn,
    ) -> Result<AssetSummary, UploadError> {
        let grants = self
            .request_credentials(kind, rec_resource_id, file_name)
            .await?;
        let variants = self.derive_variants(kind, source, progress).await?;
        let sizes = self.transfer_variants(kind, &grants, &variants).await?;
        self.finalize(kind, rec_resource_id, &grants.asset_id, file_name, &sizes)
            .await
    }
}
