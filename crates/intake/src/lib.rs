//! The barq intake pipeline: claim, queue, decode, route.
//!
//! One batch flows scheduler → claimer → queue → worker pool → router.
//! The claimer's atomic rename is the only concurrency primitive the
//! pipeline needs; everything downstream of it operates on exclusively
//! owned claims.

pub mod claim;
pub mod claimer;
pub mod error;
pub mod router;
pub mod sanitize;
pub mod scheduler;
pub mod worker;

pub use crate::claim::{CLAIM_SUFFIX, FileClaim};
pub use crate::claimer::FileClaimer;
pub use crate::router::{OutputRouter, Routed};
pub use crate::scheduler::Scheduler;
pub use crate::worker::{ClaimQueue, WorkerPool};

use crate::error::{ErrorKind, Result};
use std::path::Path;

/// Create the pipeline directories if they don't exist yet.
///
/// # Errors
/// Returns [`ErrorKind::Io`] when a directory cannot be created.
pub async fn ensure_directories(dirs: impl IntoIterator<Item = impl AsRef<Path>>) -> Result<()> {
    for dir in dirs {
        tokio::fs::create_dir_all(dir.as_ref()).await.map_err(ErrorKind::Io)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_directories() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b/c");
        ensure_directories([&nested]).await.unwrap();
        assert!(nested.is_dir());
        // Idempotent.
        ensure_directories([&nested]).await.unwrap();
    }
}
