//! Asset kinds and the closed variant-code table.
//!
//! Every derived rendition of an asset is identified by a [`VariantCode`].
//! The set of codes is closed: adding a new rendition means extending the
//! enum, and every property of a variant (wire name, display label, whether
//! it carries upload tags) lives in one exhaustive table here rather than in
//! string comparisons at call sites.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A derived rendition of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantCode {
    /// The full-quality source rendition.
    Original,
    /// Screen-size rendition (1400x800 bounding box).
    Scr,
    /// Preview rendition (900x540 bounding box).
    Pre,
    /// Square thumbnail (250x250, center-cropped).
    Thm,
}

impl VariantCode {
    /// All codes, in pipeline order.
    pub const ALL: [VariantCode; 4] = [
        VariantCode::Original,
        VariantCode::Scr,
        VariantCode::Pre,
        VariantCode::Thm,
    ];

    /// Wire name used in storage keys and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Scr => "scr",
            Self::Pre => "pre",
            Self::Thm => "thm",
        }
    }

    /// Human-readable label for progress reporting and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Scr => "screen size",
            Self::Pre => "preview",
            Self::Thm => "thumbnail",
        }
    }

    /// Whether upload tags (e.g. the source filename) are attached to this
    /// variant's presigned credential. Only the primary rendition carries
    /// them; derived renditions never do.
    pub fn carries_upload_tags(&self) -> bool {
        matches!(self, Self::Original)
    }
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(Self::Original),
            "scr" => Ok(Self::Scr),
            "pre" => Ok(Self::Pre),
            "thm" => Ok(Self::Thm),
            other => Err(Error::UnknownVariantCode(other.to_string())),
        }
    }
}

/// The kind of asset being managed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Photographic imagery, stored as a WebP variant set.
    Image,
    /// PDF documents, stored as a single original rendition.
    Document,
}

impl AssetKind {
    /// Storage key namespace for this kind.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Document => "docs",
        }
    }

    /// File extension of stored renditions.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "webp",
            Self::Document => "pdf",
        }
    }

    /// Content type of stored renditions.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Image => "image/webp",
            Self::Document => "application/pdf",
        }
    }

    /// The variant set a committed asset of this kind must have.
    pub fn required_variants(&self) -> &'static [VariantCode] {
        match self {
            Self::Image => &VariantCode::ALL,
            Self::Document => &[VariantCode::Original],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "document" => Ok(Self::Document),
            other => Err(Error::UnknownAssetKind(other.to_string())),
        }
    }
}
