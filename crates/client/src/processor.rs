//! Local rendition derivation.
//!
//! Image uploads derive their full rendition set on the client before any
//! byte leaves the machine: the stored objects are exactly what the client
//! produced, and a decode failure aborts the upload before credentials are
//! consumed.

use crate::error::UploadError;
use async_trait::async_trait;
use basecamp_core::variant::{AssetKind, VariantCode};
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::sync::Arc;

/// Progress callback: percentage (0..=100) and a short stage label.
pub type ProgressFn = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// One derived rendition ready for transfer.
#[derive(Clone, Debug)]
pub struct ProcessedVariant {
    pub code: VariantCode,
    pub bytes: Bytes,
}

/// Derives the rendition set for a source file.
#[async_trait]
pub trait VariantProcessor: Send + Sync {
    async fn process(
        &self,
        kind: AssetKind,
        source: Bytes,
        progress: ProgressFn,
    ) -> Result<Vec<ProcessedVariant>, UploadError>;
}

/// Maximum edge length kept for the original rendition.
const ORIGINAL_MAX_EDGE: u32 = 4096;
/// Screen-size bounding box.
const SCR_BOX: (u32, u32) = (1400, 800);
/// Preview bounding box.
const PRE_BOX: (u32, u32) = (900, 540);
/// Thumbnail crop size.
const THM_SIZE: u32 = 250;

/// Image rendition pipeline producing WebP output.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }
}

/// Fit within a bounding box, never upscaling.
fn fit_within(img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    if img.width() <= max_w && img.height() <= max_h {
        img.clone()
    } else {
        img.resize(max_w, max_h, FilterType::Lanczos3)
    }
}

/// Center-crop to a square thumbnail, never upscaling.
fn square_crop(img: &DynamicImage, size: u32) -> DynamicImage {
    if img.width() <= size && img.height() <= size {
        img.clone()
    } else {
        img.resize_to_fill(size, size, FilterType::Lanczos3)
    }
}

fn encode_webp(img: &DynamicImage) -> Result<Bytes, UploadError> {
    // The WebP encoder only accepts 8-bit RGB(A) buffers.
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut buf = Cursor::new(Vec::new());
    rgba.write_to(&mut buf, ImageFormat::WebP)
        .map_err(|e| UploadError::Processing(format!("webp encoding failed: {e}")))?;
    Ok(Bytes::from(buf.into_inner()))
}

fn derive_image_variants(
    source: &Bytes,
    progress: &ProgressFn,
) -> Result<Vec<ProcessedVariant>, UploadError> {
    progress(0, "validating");
    if source.is_empty() {
        return Err(UploadError::Processing("source file is empty".to_string()));
    }

    progress(10, "loading");
    let img = image::load_from_memory(source)
        .map_err(|e| UploadError::Processing(format!("failed to decode image: {e}")))?;

    progress(25, VariantCode::Original.label());
    let original = encode_webp(&fit_within(&img, ORIGINAL_MAX_EDGE, ORIGINAL_MAX_EDGE))?;

    progress(50, VariantCode::Scr.label());
    let scr = encode_webp(&fit_within(&img, SCR_BOX.0, SCR_BOX.1))?;

    progress(75, VariantCode::Pre.label());
    let pre = encode_webp(&fit_within(&img, PRE_BOX.0, PRE_BOX.1))?;

    progress(90, VariantCode::Thm.label());
    let thm = encode_webp(&square_crop(&img, THM_SIZE))?;

    progress(100, "complete");
    Ok(vec![
        ProcessedVariant {
            code: VariantCode::Original,
            bytes: original,
        },
        ProcessedVariant {
            code: VariantCode::Scr,
            bytes: scr,
        },
        ProcessedVariant {
            code: VariantCode::Pre,
            bytes: pre,
        },
        ProcessedVariant {
            code: VariantCode::Thm,
            bytes: thm,
        },
    ])
}

#[async_trait]
impl VariantProcessor for ImageProcessor {
    async fn process(
        &self,
        kind: AssetKind,
        source: Bytes,
        progress: ProgressFn,
    ) -> Result<Vec<ProcessedVariant>, UploadError> {
        if kind != AssetKind::Image {
            return Err(UploadError::Processing(format!(
                "image processor cannot handle {kind} assets"
            )));
        }

        // Decoding and re-encoding large images is CPU-bound.
        tokio::task::spawn_blocking(move || derive_image_variants(&source, &progress))
            .await
            .map_err(|e| UploadError::Processing(format!("processing task failed: {e}")))?
    }
}

/// Passthrough pipeline for documents: the original is the only rendition.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VariantProcessor for DocumentProcessor {
    async fn process(
        &self,
        kind: AssetKind,
        source: Bytes,
        progress: ProgressFn,
    ) -> Result<Vec<ProcessedVariant>, UploadError> {
        if kind != AssetKind::Document {
            return Err(UploadError::Processing(format!(
                "document processor cannot handle {kind} assets"
            )));
        }

        progress(0, "validating");
        if !source.starts_with(b"%PDF-") {
            return Err(UploadError::Processing(
                "source file is not a PDF".to_string(),
            ));
        }

        progress(100, "complete");
        Ok(vec![ProcessedVariant {
            code: VariantCode::Original,
            bytes: source,
        }])
    }
}
