//! Extension family detection.
//!
//! The claim's *original* extension decides which rasterization path a file
//! takes: raster images are a single page, documents are rasterized into one
//! page per document page. Matching is case-insensitive and tolerates a
//! leading dot, since claims carry extensions in `.ext` form.

/// How a file becomes one or more bitmaps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtFamily {
    /// Single-page raster image (jpg, jpeg, png).
    Raster,
    /// Paginated document rasterized page-by-page (pdf).
    Document,
}

impl ExtFamily {
    /// Classify an extension, or `None` when the format is unsupported.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.strip_prefix('.').unwrap_or(extension).to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" => Some(Self::Raster),
            "pdf" => Some(Self::Document),
            _ => None,
        }
    }
}
