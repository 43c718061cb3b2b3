//! Kind-generic asset operations.
//!
//! The image and document handlers are thin wrappers around the functions
//! here; the upload lifecycle (presign, finalize, list, delete) is identical
//! for both kinds apart from the variant set and storage namespace.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use basecamp_core::asset::{AssetId, asset_prefix, delivery_url, storage_key, validate_resource_id};
use basecamp_core::variant::{AssetKind, VariantCode};
use basecamp_metadata::models::{AssetRow, AssetVariantRow};
use basecamp_metadata::{AssetRepo, ResourceRepo};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Query parameters for the presign endpoint.
#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    /// Original filename, stored as an object tag on the original variant.
    pub file_name: Option<String>,
}

/// One presigned upload grant.
#[derive(Debug, Serialize)]
pub struct PresignedVariantDto {
    pub size_code: String,
    pub url: String,
    pub key: String,
}

/// Response for the presign endpoint.
#[derive(Debug, Serialize)]
pub struct PresignResponse {
    pub asset_id: String,
    pub presigned_urls: Vec<PresignedVariantDto>,
}

/// Request body for the finalize endpoint.
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    /// Display name recorded for the asset.
    pub file_name: String,
    /// Uploaded byte counts keyed by size code.
    pub variant_sizes: HashMap<String, u64>,
}

/// One committed variant in a list/finalize response.
#[derive(Debug, Serialize)]
pub struct VariantDto {
    pub size_code: String,
    pub extension: String,
    pub size_bytes: i64,
    pub url: String,
}

/// One committed asset in a list/finalize response.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub asset_id: String,
    pub rec_resource_id: String,
    pub kind: String,
    pub display_name: String,
    pub created_at: String,
    pub created_by: String,
    pub variants: Vec<VariantDto>,
}

/// Response for the list endpoint.
#[derive(Debug, Serialize)]
pub struct ListAssetsResponse {
    pub assets: Vec<AssetResponse>,
}

/// Build the object tag carrying the original filename.
fn filename_tag(file_name: &str) -> String {
    format!(
        "filename={}",
        utf8_percent_encode(file_name, NON_ALPHANUMERIC)
    )
}

/// Ensure the resource exists, returning 404 otherwise.
async fn require_resource(state: &AppState, rec_resource_id: &str) -> ApiResult<()> {
    validate_resource_id(rec_resource_id)?;
    if !state.metadata.resource_exists(rec_resource_id).await? {
        return Err(ApiError::NotFound(format!(
            "rec_resource_id {rec_resource_id} not found"
        )));
    }
    Ok(())
}

/// Issue presigned upload grants for every required variant of a new asset.
///
/// No metadata is written here. The asset only becomes visible once the
/// client finalizes it.
pub async fn issue_upload_credentials(
    state: &AppState,
    kind: AssetKind,
    rec_resource_id: &str,
    file_name: Option<&str>,
) -> ApiResult<PresignResponse> {
    require_resource(state, rec_resource_id).await?;

    let asset_id = AssetId::generate();
    let ttl = state.config.server.presign_ttl();

    let mut grants = Vec::with_capacity(kind.required_variants().len());
    for variant in kind.required_variants() {
        let key = storage_key(kind, rec_resource_id, &asset_id, *variant);

        // The original carries the source filename as an object tag; derived
        // variants are unnamed.
        let tagging = match (variant.carries_upload_tags(), file_name) {
            (true, Some(name)) => Some(filename_tag(name)),
            _ => None,
        };

        let presigned = state
            .storage
            .presign_put(&key, kind.content_type(), ttl, tagging.as_deref())
            .await
            .map_err(|e| ApiError::SigningFailed(e.to_string()))?;

        grants.push(PresignedVariantDto {
            size_code: variant.as_str().to_string(),
            url: presigned.url,
            key,
        });
    }

    Ok(PresignResponse {
        asset_id: asset_id.to_string(),
        presigned_urls: grants,
    })
}

/// Commit an uploaded asset to metadata.
///
/// This is the only place asset rows are created. Storage objects are taken
/// at face value; no existence probe is made against the backend.
pub async fn finalize_commit(
    state: &AppState,
    kind: AssetKind,
    rec_resource_id: &str,
    asset_id: &str,
    req: FinalizeRequest,
) -> ApiResult<AssetResponse> {
    require_resource(state, rec_resource_id).await?;

    let asset_id: AssetId = asset_id.parse()?;

    if req.file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("file_name must not be empty".into()));
    }

    for size_code in req.variant_sizes.keys() {
        let code: VariantCode = size_code
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("unknown size_code {size_code}")))?;
        if !kind.required_variants().contains(&code) {
            return Err(ApiError::BadRequest(format!(
                "size_code {size_code} is not valid for {kind} assets"
            )));
        }
    }

    let mut variants = Vec::with_capacity(kind.required_variants().len());
    for variant in kind.required_variants() {
        let size_bytes = req.variant_sizes.get(variant.as_str()).ok_or_else(|| {
            ApiError::BadRequest(format!("missing size for variant {variant}"))
        })?;
        let size_bytes = i64::try_from(*size_bytes).map_err(|_| {
            ApiError::BadRequest(format!("size for variant {variant} is out of range"))
        })?;
        variants.push(AssetVariantRow {
            asset_id: asset_id.to_string(),
            size_code: variant.as_str().to_string(),
            extension: kind.extension().to_string(),
            size_bytes,
            storage_key: storage_key(kind, rec_resource_id, &asset_id, *variant),
        });
    }

    // created_by and created_at are assigned here, never taken from the client.
    let asset = AssetRow {
        asset_id: asset_id.to_string(),
        rec_resource_id: rec_resource_id.to_string(),
        kind: kind.as_str().to_string(),
        display_name: req.file_name,
        created_at: OffsetDateTime::now_utc(),
        created_by: state.config.server.created_by.clone(),
    };

    state
        .metadata
        .create_asset(&asset, &variants)
        .await
        .map_err(|e| match e {
            basecamp_metadata::MetadataError::AlreadyExists(_) => ApiError::Metadata(e),
            other => ApiError::CommitFailed(other.to_string()),
        })?;

    Ok(to_asset_response(state, asset, variants))
}

/// List committed assets of one kind for a resource.
pub async fn list_committed_assets(
    state: &AppState,
    kind: AssetKind,
    rec_resource_id: &str,
) -> ApiResult<ListAssetsResponse> {
    require_resource(state, rec_resource_id).await?;

    let rows = state
        .metadata
        .list_assets(rec_resource_id, kind.as_str())
        .await?;

    let assets = rows
        .into_iter()
        .map(|row| to_asset_response(state, row.asset, row.variants))
        .collect();

    Ok(ListAssetsResponse { assets })
}

/// Delete an asset: all storage objects first, metadata last.
///
/// If any object deletion fails the metadata row is left in place so the
/// asset stays discoverable and the operation can be retried.
pub async fn delete_committed_asset(
    state: &AppState,
    kind: AssetKind,
    rec_resource_id: &str,
    asset_id: &str,
) -> ApiResult<()> {
    validate_resource_id(rec_resource_id)?;
    let asset_id: AssetId = asset_id.parse()?;

    let asset = state
        .metadata
        .get_asset(asset_id.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("asset_id {asset_id} not found")))?;

    if asset.rec_resource_id != rec_resource_id || asset.kind != kind.as_str() {
        return Err(ApiError::NotFound(format!(
            "asset_id {asset_id} not found for rec_resource_id {rec_resource_id}"
        )));
    }

    // Enumerate rather than trusting the variant rows: stray or partially
    // uploaded objects under the asset prefix are removed too.
    let prefix = asset_prefix(kind, rec_resource_id, &asset_id);
    let keys = state
        .storage
        .list(&prefix)
        .await
        .map_err(|e| ApiError::PartialDeletion {
            asset_id: asset_id.to_string(),
            detail: format!("listing objects failed: {e}"),
        })?;

    for key in &keys {
        state
            .storage
            .delete(key)
            .await
            .map_err(|e| ApiError::PartialDeletion {
                asset_id: asset_id.to_string(),
                detail: format!("deleting object {key} failed: {e}"),
            })?;
    }

    state.metadata.delete_asset(asset_id.as_str()).await?;
    Ok(())
}

fn to_asset_response(
    state: &AppState,
    asset: AssetRow,
    variants: Vec<AssetVariantRow>,
) -> AssetResponse {
    let base = &state.config.delivery.base_url;
    let created_at = asset
        .created_at
        .format(&Rfc3339)
        .unwrap_or_else(|_| asset.created_at.to_string());

    AssetResponse {
        asset_id: asset.asset_id,
        rec_resource_id: asset.rec_resource_id,
        kind: asset.kind,
        display_name: asset.display_name,
        created_at,
        created_by: asset.created_by,
        variants: variants
            .into_iter()
            .map(|v| VariantDto {
                size_code: v.size_code,
                extension: v.extension,
                size_bytes: v.size_bytes,
                url: delivery_url(base, &v.storage_key),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_tag_percent_encodes() {
        assert_eq!(filename_tag("photo.jpg"), "filename=photo%2Ejpg");
        assert_eq!(
            filename_tag("camp site 1.png"),
            "filename=camp%20site%201%2Epng"
        );
    }

    #[test]
    fn filename_tag_plain_name() {
        assert_eq!(filename_tag("photo"), "filename=photo");
    }
}
