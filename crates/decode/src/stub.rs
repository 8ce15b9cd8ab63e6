//! Scripted decoder for testing.

use crate::Decoder;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Scripted [`Decoder`] for testing the intake pipeline without real
/// barcode material.
///
/// Scripts are keyed by the file *stem* — everything before the first dot
/// of the file name — so `invoice1`, `invoice1.png`, and the claim-marked
/// `invoice1.png.processing` all resolve to the same script. Files without
/// a script decode to nothing.
///
/// # Examples
///
/// ```
/// use barq_decode::stub::StubDecoder;
///
/// let decoder = StubDecoder::with_scripts([
///     ("invoice1", vec!["BC100".into(), "BC200".into()]),
///     ("blank", vec![]),
/// ]);
/// ```
#[derive(Debug, Default)]
pub struct StubDecoder {
    scripts: HashMap<String, Vec<String>>,
}

impl StubDecoder {
    /// Create a stub decoder pre-loaded with per-stem scripts.
    pub fn with_scripts(scripts: impl IntoIterator<Item = (impl Into<String>, Vec<String>)>) -> Self {
        Self {
            scripts: scripts.into_iter().map(|(stem, values)| (stem.into(), values)).collect(),
        }
    }

    fn stem(path: &Path) -> Option<&str> {
        path.file_name()?.to_str()?.split('.').next()
    }
}

#[async_trait]
impl Decoder for StubDecoder {
    async fn decode(&self, path: &Path, _original_extension: &str) -> Vec<String> {
        Self::stem(path).and_then(|stem| self.scripts.get(stem)).cloned().unwrap_or_default()
    }
}
