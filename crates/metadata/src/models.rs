//! Database row types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// A recreation resource that owns assets.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ResourceRow {
    pub rec_resource_id: String,
    pub name: String,
    pub closest_community: Option<String>,
}

/// A committed asset.
///
/// `created_at` and `created_by` are always server-assigned at commit time;
/// client-supplied values are never persisted.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AssetRow {
    pub asset_id: String,
    pub rec_resource_id: String,
    /// Asset kind wire name ("image" or "document").
    pub kind: String,
    pub display_name: String,
    pub created_at: OffsetDateTime,
    pub created_by: String,
}

/// One stored rendition of a committed asset.
#[derive(Clone, Debug, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AssetVariantRow {
    pub asset_id: String,
    /// Variant wire name ("original", "scr", "pre", "thm").
    pub size_code: String,
    pub extension: String,
    pub size_bytes: i64,
    pub storage_key: String,
}

/// An asset with its variant set, as returned by listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetWithVariants {
    pub asset: AssetRow,
    pub variants: Vec<AssetVariantRow>,
}
