//! Intake Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Most intake failures are handled where they occur
//! (skip the entry, abandon the claim, log) — what surfaces here is the
//! residue the scheduler boundary needs to see.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// An intake error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The watch directory itself could not be enumerated.
    #[display("failed to scan watch directory: {}", _0.display())]
    Scan(#[error(not(source))] PathBuf),
    /// Copy/move/delete failed while routing a claim; the claim is left on
    /// disk bearing its marker.
    #[display("failed to route claim: {}", _0.display())]
    Route(#[error(not(source))] PathBuf),
    /// Underlying I/O error.
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Scan(_) | Self::Route(_) | Self::Io(_))
    }
}
