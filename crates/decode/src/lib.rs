//! Barcode decoding for the barq intake pipeline.
//!
//! This crate owns the [`Decoder`] seam and its production implementation,
//! [`DecodeEngine`]. The two external capabilities — rasterizing a file
//! into pages and recognizing symbols inside a bitmap — are supplied by
//! third-party crates (`image`/`pdfium-render` and `rxing`) and wrapped in
//! the [`raster`] and [`recognize`] modules.
//!
//! The engine is deliberately forgiving: anything that goes wrong inside
//! an attempt is a warning and zero results, never an error the pipeline
//! has to handle. Routing decides what "zero results" means.

pub mod engine;
pub mod error;
pub mod family;
mod raster;
mod recognize;
#[cfg(feature = "stub")]
pub mod stub;

pub use crate::engine::{DecodeEngine, Decoder, DecoderHandle, PAD_MARGIN, RESIZE_WIDTH};
pub use crate::family::ExtFamily;
pub use crate::raster::RASTER_DPI;
