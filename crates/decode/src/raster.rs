//! Page rasterization.
//!
//! Turns a claimed file into an ordered sequence of bitmaps: raster images
//! load as a single page via the `image` crate, PDF documents render one
//! page per document page through pdfium at a fixed density.

use crate::error::{ErrorKind, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;

/// Render density for paginated documents, in dots per inch. Scanned
/// documents embed barcodes at print scale; 300 dpi keeps their modules
/// several pixels wide.
pub const RASTER_DPI: f32 = 300.0;

/// PDF page geometry is expressed in points, 72 per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Load a single-page raster image.
pub fn load_raster(path: &Path) -> Result<Vec<DynamicImage>> {
    let page = image::open(path).map_err(ErrorKind::from)?;
    Ok(vec![page])
}

/// Rasterize every page of a PDF document at [`RASTER_DPI`].
pub fn rasterize_document(path: &Path) -> Result<Vec<DynamicImage>> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library().map_err(|e| ErrorKind::Pdf(format!("pdfium bind failed: {e}")))?,
    );
    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ErrorKind::Pdf(format!("pdfium open failed: {e}")))?;

    let mut pages = Vec::with_capacity(document.pages().len() as usize);
    for (index, page) in document.pages().iter().enumerate() {
        let width = (page.width().value * RASTER_DPI / POINTS_PER_INCH) as i32;
        let height = (page.height().value * RASTER_DPI / POINTS_PER_INCH) as i32;
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().set_target_width(width).set_target_height(height))
            .map_err(|e| ErrorKind::Pdf(format!("render of page {index} failed: {e}")))?;
        pages.push(bitmap.as_image());
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_raster_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        image::GrayImage::from_pixel(32, 16, image::Luma([255u8])).save(&path).unwrap();
        let pages = load_raster(&path).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!((pages[0].width(), pages[0].height()), (32, 16));
    }

    #[test]
    fn test_load_raster_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"not a png").unwrap();
        let err = load_raster(&path).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Image(_)));
    }
}
