//! Decode Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. These never escape the [`Decoder`](crate::Decoder)
//! boundary: the engine logs them and treats the attempt as zero results.

use derive_more::{Display, Error};
use image::ImageError;

/// A decode error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Extension is neither a supported raster format nor a document format.
    #[display("unsupported extension: {_0:?}")]
    Unsupported(#[error(not(source))] String),
    /// The image crate could not open or decode a raster file.
    #[display("image error: {_0}")]
    Image(ImageError),
    /// Pdfium could not bind, open the document, or render a page.
    #[display("pdf raster error: {_0}")]
    Pdf(#[error(not(source))] String),
}

impl From<ImageError> for ErrorKind {
    fn from(err: ImageError) -> Self {
        Self::Image(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
