//! Asset identifiers and storage key derivation.
//!
//! Storage keys follow the fixed convention
//! `{namespace}/{owner_resource_id}/{asset_id}/{size_code}.{extension}`.
//! Listing, deletion and credential issuance all depend on every key of an
//! asset falling under the asset's prefix, so key construction is centralized
//! here and nowhere else.

use crate::error::Error;
use crate::variant::{AssetKind, VariantCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum accepted asset id length.
const MAX_ASSET_ID_LEN: usize = 128;

/// A validated asset identifier.
///
/// Asset ids are opaque but constrained to a filesystem- and URL-safe
/// alphabet so they can be embedded in storage keys verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Parse and validate an asset id.
    pub fn new(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_ASSET_ID_LEN {
            return Err(Error::InvalidAssetId(id));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(Error::InvalidAssetId(id));
        }
        Ok(Self(id))
    }

    /// Generate a fresh random asset id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

/// Validate an owning resource id for use inside a storage key.
pub fn validate_resource_id(rec_resource_id: &str) -> Result<(), Error> {
    if rec_resource_id.is_empty()
        || rec_resource_id.len() > MAX_ASSET_ID_LEN
        || rec_resource_id.contains('/')
    {
        return Err(Error::InvalidResourceId(rec_resource_id.to_string()));
    }
    Ok(())
}

/// Derive the storage key for one variant of an asset.
pub fn storage_key(
    kind: AssetKind,
    rec_resource_id: &str,
    asset_id: &AssetId,
    variant: VariantCode,
) -> String {
    format!(
        "{}/{}/{}/{}.{}",
        kind.namespace(),
        rec_resource_id,
        asset_id,
        variant.as_str(),
        kind.extension()
    )
}

/// Derive the storage prefix covering every object of an asset.
///
/// Ends with a trailing slash so prefix listings cannot match a sibling
/// asset whose id shares a leading substring.
pub fn asset_prefix(kind: AssetKind, rec_resource_id: &str, asset_id: &AssetId) -> String {
    format!("{}/{}/{}/", kind.namespace(), rec_resource_id, asset_id)
}

/// Build the public delivery URL for a stored object.
pub fn delivery_url(base_url: &str, storage_key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        storage_key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_accepts_uuids_and_safe_names() {
        AssetId::new(Uuid::new_v4().to_string()).unwrap();
        AssetId::new("photo_2024-06.v2").unwrap();
    }

    #[test]
    fn asset_id_rejects_unsafe_input() {
        assert!(AssetId::new("").is_err());
        assert!(AssetId::new("a/b").is_err());
        assert!(AssetId::new("a b").is_err());
        assert!(AssetId::new("..%2f..").is_err());
        assert!(AssetId::new("x".repeat(200)).is_err());
    }

    #[test]
    fn storage_key_is_deterministic() {
        let id = AssetId::new("4f2c1d").unwrap();
        let a = storage_key(AssetKind::Image, "REC204", &id, VariantCode::Thm);
        let b = storage_key(AssetKind::Image, "REC204", &id, VariantCode::Thm);
        assert_eq!(a, b);
        assert_eq!(a, "images/REC204/4f2c1d/thm.webp");
    }

    #[test]
    fn document_key_uses_docs_namespace() {
        let id = AssetId::new("brochure-1").unwrap();
        assert_eq!(
            storage_key(AssetKind::Document, "REC1", &id, VariantCode::Original),
            "docs/REC1/brochure-1/original.pdf"
        );
    }

    #[test]
    fn every_variant_key_falls_under_the_asset_prefix() {
        let id = AssetId::new("abc123").unwrap();
        for kind in [AssetKind::Image, AssetKind::Document] {
            let prefix = asset_prefix(kind, "REC77", &id);
            for variant in kind.required_variants() {
                let key = storage_key(kind, "REC77", &id, *variant);
                assert!(key.starts_with(&prefix), "{key} not under {prefix}");
            }
        }
    }

    #[test]
    fn prefix_does_not_match_sibling_assets() {
        let a = AssetId::new("abc").unwrap();
        let ab = AssetId::new("abcd").unwrap();
        let prefix = asset_prefix(AssetKind::Image, "REC1", &a);
        let sibling_key = storage_key(AssetKind::Image, "REC1", &ab, VariantCode::Original);
        assert!(!sibling_key.starts_with(&prefix));
    }

    #[test]
    fn delivery_url_trims_duplicate_slashes() {
        assert_eq!(
            delivery_url("https://cdn.example.com/", "images/R/a/thm.webp"),
            "https://cdn.example.com/images/R/a/thm.webp"
        );
    }
}
