//! Configuration Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, mirroring the other barq crates.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Figment could not assemble a complete configuration from the
    /// available providers (missing keys, type mismatches, bad TOML).
    #[display("failed to load configuration: {_0}")]
    Load(#[error(not(source))] String),
    /// Directories must be configured as absolute paths.
    #[display("configured path is not absolute: {}", _0.display())]
    RelativePath(#[error(not(source))] PathBuf),
    /// The watch, output, and error directories must all be distinct;
    /// routing into the watch directory would re-claim routed files forever.
    #[display("directory configured for more than one role: {}", _0.display())]
    SharedDirectory(#[error(not(source))] PathBuf),
    /// A worker count of zero would let claims queue up and never drain.
    #[display("worker count must be at least 1")]
    NoWorkers,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
