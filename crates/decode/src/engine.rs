//! Multi-strategy decode orchestration.
//!
//! For each page of a claimed file the engine runs two geometrically
//! different recognition attempts: one on the page resized to a fixed
//! width, and one on the same page composited onto a larger white canvas.
//! Barcodes whose modules touch the image edge are frequently missed by
//! the first attempt and caught by the second. Results from all attempts
//! across all pages are concatenated; deduplication is a routing-time
//! concern.
//!
//! Decoding is off the request-latency-critical path, so trading extra
//! recognizer invocations for recall is the right side of the bargain.

use crate::error::{ErrorKind, Result};
use crate::family::ExtFamily;
use crate::raster::{load_raster, rasterize_document};
use crate::recognize::recognize;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};

/// Width every page is resized to before recognition, preserving aspect
/// ratio. Normalizes recognizer accuracy regardless of source resolution.
pub const RESIZE_WIDTH: u32 = 2_500;

/// White margin, in pixels, added on all sides for the second attempt.
pub const PAD_MARGIN: u32 = 40;

/// The decode seam between the intake pipeline and the recognition stack.
///
/// Infallible at this boundary: internal rasterizer or recognizer failures
/// are logged and contribute zero results, so a corrupt file is
/// indistinguishable from a barcode-free one — both route to the error
/// location.
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Decode all barcode text values found in the file at `path`.
    ///
    /// `original_extension` is the extension of the file as originally
    /// observed (claim markers hide the real extension from the path).
    async fn decode(&self, path: &Path, original_extension: &str) -> Vec<String>;
}

/// Shared handle to a [`Decoder`] implementation.
pub type DecoderHandle = Arc<dyn Decoder>;

/// The production [`Decoder`]: rasterize, resize, recognize, pad, recognize
/// again.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecodeEngine;

impl DecodeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous decode of every page of the file at `path`.
    ///
    /// # Errors
    /// Fails when the file cannot be rasterized at all (unsupported
    /// extension, unreadable image, pdfium failure). Recognition itself
    /// never fails.
    pub fn decode_pages(&self, path: &Path, original_extension: &str) -> Result<Vec<String>> {
        let Some(family) = ExtFamily::from_extension(original_extension) else {
            exn::bail!(ErrorKind::Unsupported(original_extension.to_owned()));
        };
        let pages = match family {
            ExtFamily::Raster => load_raster(path)?,
            ExtFamily::Document => rasterize_document(path)?,
        };

        let mut values = Vec::new();
        for page in &pages {
            let resized = resize_to_width(page, RESIZE_WIDTH).into_luma8();
            // First attempt: the page as-is.
            values.extend(recognize(&resized));
            // Second attempt: same page inside a white border.
            values.extend(recognize(&pad(&resized, PAD_MARGIN)));
        }
        Ok(values)
    }
}

#[async_trait]
impl Decoder for DecodeEngine {
    async fn decode(&self, path: &Path, original_extension: &str) -> Vec<String> {
        let engine = *self;
        let path = PathBuf::from(path);
        let extension = original_extension.to_owned();
        let handle = tokio::task::spawn_blocking(move || match engine.decode_pages(&path, &extension) {
            Ok(values) => values,
            Err(err) if matches!(&*err, ErrorKind::Unsupported(_)) => {
                warn!(file = %path.display(), error = %err, "unsupported extension, treating as zero results");
                Vec::new()
            },
            Err(err) => {
                warn!(file = %path.display(), error = %err, "decode failed, treating as zero results");
                Vec::new()
            },
        });
        match handle.await {
            Ok(values) => values,
            Err(err) => {
                error!(error = %err, "decode task aborted");
                Vec::new()
            },
        }
    }
}

/// Resize to a fixed width, preserving aspect ratio. Upscales small inputs
/// too; the recognizer is tuned for module sizes this produces.
fn resize_to_width(page: &DynamicImage, width: u32) -> DynamicImage {
    let (w, h) = (page.width(), page.height());
    if w == 0 || h == 0 || w == width {
        return page.clone();
    }
    let height = ((h as u64 * width as u64) / w as u64).max(1) as u32;
    page.resize_exact(width, height, FilterType::Lanczos3)
}

/// Composite `page` at `(margin, margin)` onto a white canvas `2 * margin`
/// larger in each dimension.
fn pad(page: &GrayImage, margin: u32) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(page.width() + margin * 2, page.height() + margin * 2, Luma([255u8]));
    image::imageops::overlay(&mut canvas, page, margin as i64, margin as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

    fn write_symbol_png(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let matrix = MultiFormatWriter.encode(contents, &BarcodeFormat::QR_CODE, 256, 256).unwrap();
        let page = GrayImage::from_fn(matrix.width(), matrix.height(), |x, y| {
            if matrix.get(x, y) { Luma([0u8]) } else { Luma([255u8]) }
        });
        let path = dir.join(name);
        page.save(&path).unwrap();
        path
    }

    #[test]
    fn test_resize_preserves_aspect_ratio() {
        let page = DynamicImage::new_luma8(1000, 500);
        let resized = resize_to_width(&page, RESIZE_WIDTH);
        assert_eq!((resized.width(), resized.height()), (2500, 1250));

        let portrait = DynamicImage::new_luma8(500, 1000);
        let resized = resize_to_width(&portrait, RESIZE_WIDTH);
        assert_eq!((resized.width(), resized.height()), (2500, 5000));
    }

    #[test]
    fn test_pad_dimensions_and_fill() {
        let page = GrayImage::from_pixel(100, 60, Luma([0u8]));
        let padded = pad(&page, PAD_MARGIN);
        assert_eq!((padded.width(), padded.height()), (180, 140));
        // Border is white, composited content is untouched.
        assert_eq!(padded.get_pixel(0, 0).0[0], 255);
        assert_eq!(padded.get_pixel(PAD_MARGIN, PAD_MARGIN).0[0], 0);
        assert_eq!(padded.get_pixel(179, 139).0[0], 255);
    }

    #[test]
    fn test_unsupported_extension_kind() {
        let err = DecodeEngine::new().decode_pages(Path::new("notes.txt"), ".txt").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_zero_results_at_seam() {
        let values = DecodeEngine::new().decode(Path::new("notes.txt"), ".txt").await;
        assert!(values.is_empty());
    }

    #[test]
    fn test_corrupt_raster_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(DecodeEngine::new().decode_pages(&path, ".png").is_err());
    }

    #[test]
    fn test_decode_pages_finds_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_symbol_png(dir.path(), "invoice.png", "BC100");
        let values = DecodeEngine::new().decode_pages(&path, ".png").unwrap();
        assert!(values.contains(&"BC100".to_string()));
    }

    #[tokio::test]
    async fn test_decoder_boundary_never_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"garbage").unwrap();
        // Corrupt file decodes to nothing rather than erroring.
        let values = DecodeEngine::new().decode(&path, ".png").await;
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn test_decoder_finds_symbol_through_seam() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_symbol_png(dir.path(), "invoice.png", "BC700");
        let values = DecodeEngine::new().decode(&path, ".png").await;
        assert!(values.contains(&"BC700".to_string()));
    }
}
