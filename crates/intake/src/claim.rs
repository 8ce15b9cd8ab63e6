//! The claim model.
//!
//! A claim is a file that has been atomically renamed to carry
//! [`CLAIM_SUFFIX`]. The rename is the pipeline's only concurrency
//! primitive: it either fully succeeds (the file now carries the marker
//! and is invisible to future scans) or fully fails (the original is
//! untouched), so no file can ever be claimed twice.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Reserved suffix appended to a file's full original name while it is
/// queued or processing. No other process may write files using this
/// suffix pattern into the watch directory.
pub const CLAIM_SUFFIX: &str = ".processing";

/// An exclusively owned in-flight file.
///
/// Created by the claimer's rename; owned by the single worker that
/// dequeues it; destroyed on successful routing or relocated to the error
/// directory when nothing decodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileClaim {
    /// Filesystem path as first observed.
    pub original_path: PathBuf,
    /// Path after the claim marker was applied.
    pub claim_path: PathBuf,
    /// Extension of the original path, dot included (`".png"`), or empty
    /// when the original had none. Picks the decode strategy and names
    /// outputs; the claim path's own extension is always the marker.
    pub original_extension: String,
}

impl FileClaim {
    /// Build the claim for an as-yet-unmarked file. The rename itself is
    /// the claimer's job; this only computes the paths involved.
    pub fn for_original(original_path: PathBuf) -> Self {
        let mut marked = original_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        marked.push(CLAIM_SUFFIX);
        let claim_path = original_path.with_file_name(marked);
        let original_extension = original_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Self { original_path, claim_path, original_extension }
    }

    /// Original file name with the claim marker stripped, used for error
    /// routing.
    pub fn original_file_name(&self) -> OsString {
        self.original_path.file_name().map(|n| n.to_os_string()).unwrap_or_default()
    }

    /// Whether `path` carries the claim marker.
    pub fn is_claim_path(path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(CLAIM_SUFFIX))
            .unwrap_or(false)
    }

    /// The path `path` had before the claim marker was applied, or `None`
    /// when it carries no marker.
    pub fn unmarked_path(path: &Path) -> Option<PathBuf> {
        let name = path.file_name()?.to_str()?;
        let original = name.strip_suffix(CLAIM_SUFFIX)?;
        if original.is_empty() {
            return None;
        }
        Some(path.with_file_name(original))
    }
}
