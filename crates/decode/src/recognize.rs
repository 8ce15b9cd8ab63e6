//! Symbol recognition.
//!
//! Thin wrapper around [`rxing`] (the Rust port of ZXing) that runs the
//! recognizer in find-multiple mode with the tolerance flags the pipeline
//! always wants: aggressive search, inverted-polarity tolerance, and
//! rotation tolerance. Rotation is handled here by re-running recognition
//! on each 90° orientation and pooling whatever turns up; exact-text
//! duplicates across orientations are collapsed at routing time, not here.

use image::GrayImage;
use rxing::{DecodeHintValue, DecodeHints};

/// Extract every barcode text value found in `page`.
///
/// Recognition never fails at this boundary: "nothing found" and internal
/// recognizer errors both contribute zero results for the orientation that
/// produced them.
pub fn recognize(page: &GrayImage) -> Vec<String> {
    let mut hints = DecodeHints::default()
        .with(DecodeHintValue::TryHarder(true))
        .with(DecodeHintValue::AlsoInverted(true));

    let mut values = Vec::new();
    let mut frame = page.clone();
    for _ in 0..4 {
        if let Ok(results) = rxing::helpers::detect_multiple_in_luma_with_hints(
            frame.as_raw().clone(),
            frame.width(),
            frame.height(),
            &mut hints,
        ) {
            values.extend(results.iter().map(|result| result.getText().to_owned()));
        }
        frame = image::imageops::rotate90(&frame);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

    /// Render an rxing bit matrix as a grayscale page. Module sizing and
    /// quiet zones are the writer's problem at this target size.
    fn encode(contents: &str) -> GrayImage {
        let matrix = MultiFormatWriter.encode(contents, &BarcodeFormat::QR_CODE, 256, 256).unwrap();
        GrayImage::from_fn(matrix.width(), matrix.height(), |x, y| {
            if matrix.get(x, y) { image::Luma([0u8]) } else { image::Luma([255u8]) }
        })
    }

    #[test]
    fn test_recognize_symbol() {
        let page = encode("BC100");
        let values = recognize(&page);
        assert!(values.contains(&"BC100".to_string()));
    }

    #[test]
    fn test_recognize_inverted_symbol() {
        let mut page = encode("BC200");
        for pixel in page.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
        let values = recognize(&page);
        assert!(values.contains(&"BC200".to_string()));
    }

    #[test]
    fn test_recognize_rotated_symbol() {
        let page = image::imageops::rotate90(&encode("BC300"));
        let values = recognize(&page);
        assert!(values.contains(&"BC300".to_string()));
    }

    #[test]
    fn test_recognize_blank_page() {
        let page = GrayImage::from_pixel(256, 256, image::Luma([255u8]));
        assert!(recognize(&page).is_empty());
    }
}
