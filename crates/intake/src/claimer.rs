//! Scanning and atomic claiming.
//!
//! One scan enumerates the watch directory (single level — the intake
//! contract is "drop files here", not a tree) and claims every eligible
//! entry by renaming it to carry the claim marker. Per-entry failures are
//! logged and skipped so one bad file never aborts the rest of the scan;
//! only the enumeration of the directory itself is a batch-level error.

use crate::claim::FileClaim;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::{File, TryLockError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Scans the watch directory and converts eligible files into claims.
#[derive(Clone, Debug)]
pub struct FileClaimer {
    watch_dir: PathBuf,
}

impl FileClaimer {
    pub fn new(watch_dir: impl Into<PathBuf>) -> Self {
        Self { watch_dir: watch_dir.into() }
    }

    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    /// Enumerate the watch directory and claim every eligible entry.
    ///
    /// Skipped (retried on a later cycle): entries already bearing the
    /// claim marker, entries that appear to still be written, and entries
    /// whose claim rename fails.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Scan`] when the watch directory itself cannot
    /// be enumerated.
    pub async fn scan_and_claim(&self) -> Result<Vec<FileClaim>> {
        let mut entries = fs::read_dir(&self.watch_dir)
            .await
            .or_raise(|| ErrorKind::Scan(self.watch_dir.clone()))?;

        let mut claims = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read a watch directory entry, skipping");
                    continue;
                },
            };
            let path = entry.path();
            match entry.file_type().await {
                Ok(file_type) if file_type.is_file() => {},
                Ok(_) => continue,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "could not stat entry, skipping");
                    continue;
                },
            }
            if FileClaim::is_claim_path(&path) {
                continue;
            }
            if still_being_written(&path) {
                debug!(file = %path.display(), "file appears to still be written, will retry next cycle");
                continue;
            }

            let claim = FileClaim::for_original(path);
            // The rename is the sole concurrency-safety mechanism: it
            // either fully succeeds (file now carries the marker, invisible
            // to future scans) or fully fails (original untouched).
            match fs::rename(&claim.original_path, &claim.claim_path).await {
                Ok(()) => {
                    info!(claim = %claim.claim_path.display(), "claimed");
                    claims.push(claim);
                },
                Err(err) => {
                    warn!(file = %claim.original_path.display(), error = %err, "could not claim, skipping this cycle");
                },
            }
        }
        Ok(claims)
    }

    /// Strip the claim marker from leftovers of a previous run.
    ///
    /// Claims survive on disk when a run crashes mid-batch or a routing
    /// failure abandons them. Releasing them at startup puts the files
    /// back in front of the next scan instead of leaving them stuck under
    /// the marker forever. Returns the number of claims released.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Scan`] when the watch directory cannot be
    /// enumerated.
    pub async fn release_stale_claims(&self) -> Result<usize> {
        let mut entries = fs::read_dir(&self.watch_dir)
            .await
            .or_raise(|| ErrorKind::Scan(self.watch_dir.clone()))?;

        let mut released = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !FileClaim::is_claim_path(&path) {
                continue;
            }
            let Some(original) = FileClaim::unmarked_path(&path) else {
                warn!(claim = %path.display(), "stale claim has no recoverable original name, leaving in place");
                continue;
            };
            match fs::try_exists(&original).await {
                Ok(true) => {
                    // A fresh drop reused the name; releasing would clobber it.
                    warn!(claim = %path.display(), "original name occupied, leaving stale claim in place");
                    continue;
                },
                Ok(false) => {},
                Err(err) => {
                    warn!(claim = %path.display(), error = %err, "could not probe original name, leaving stale claim");
                    continue;
                },
            }
            match fs::rename(&path, &original).await {
                Ok(()) => {
                    info!(file = %original.display(), "released stale claim");
                    released += 1;
                },
                Err(err) => {
                    warn!(claim = %path.display(), error = %err, "could not release stale claim");
                },
            }
        }
        Ok(released)
    }
}

/// Probe whether another process still holds the file open for writing.
///
/// Open-plus-exclusive-lock, released immediately by dropping the handle.
/// The lock is advisory on Unix, so writers that never lock slip through —
/// the worst case is decoding a truncated file, which routes to the error
/// location like any other undecodable input. The probe is a quick local
/// open, not worth a `spawn_blocking` round-trip.
fn still_being_written(path: &Path) -> bool {
    match File::open(path) {
        Ok(file) => match file.try_lock() {
            Ok(()) => false,
            Err(TryLockError::WouldBlock) => true,
            Err(TryLockError::Error(_)) => true,
        },
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drop_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"content").unwrap();
        path
    }

    #[tokio::test]
    async fn test_scan_claims_eligible_files() {
        let dir = tempfile::tempdir().unwrap();
        drop_file(dir.path(), "a.png");
        drop_file(dir.path(), "b.pdf");
        let claimer = FileClaimer::new(dir.path());
        let mut claims = claimer.scan_and_claim().await.unwrap();
        claims.sort_by(|a, b| a.original_path.cmp(&b.original_path));
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].claim_path, dir.path().join("a.png.processing"));
        assert!(claims[0].claim_path.exists());
        assert!(!claims[0].original_path.exists());
    }

    #[tokio::test]
    async fn test_rescan_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        drop_file(dir.path(), "a.png");
        let claimer = FileClaimer::new(dir.path());
        assert_eq!(claimer.scan_and_claim().await.unwrap().len(), 1);
        // Already-claimed files are invisible to the next scan.
        assert_eq!(claimer.scan_and_claim().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let claimer = FileClaimer::new(dir.path());
        assert_eq!(claimer.scan_and_claim().await.unwrap().len(), 0);
        assert!(dir.path().join("subdir").exists());
    }

    #[tokio::test]
    async fn test_locked_file_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = drop_file(dir.path(), "uploading.png");
        let writer = File::open(&path).unwrap();
        writer.try_lock().unwrap();

        let claimer = FileClaimer::new(dir.path());
        assert_eq!(claimer.scan_and_claim().await.unwrap().len(), 0);
        assert!(path.exists());

        // Once the writer releases the lock the next cycle picks it up.
        drop(writer);
        assert_eq!(claimer.scan_and_claim().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_watch_dir_is_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let claimer = FileClaimer::new(dir.path().join("nope"));
        let err = claimer.scan_and_claim().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Scan(_)));
    }

    #[tokio::test]
    async fn test_release_stale_claims() {
        let dir = tempfile::tempdir().unwrap();
        drop_file(dir.path(), "stuck.png.processing");
        drop_file(dir.path(), "fresh.png");
        let claimer = FileClaimer::new(dir.path());
        assert_eq!(claimer.release_stale_claims().await.unwrap(), 1);
        assert!(dir.path().join("stuck.png").exists());
        assert!(!dir.path().join("stuck.png.processing").exists());
        // Unmarked files are untouched by recovery.
        assert!(dir.path().join("fresh.png").exists());
    }

    #[tokio::test]
    async fn test_release_leaves_occupied_names() {
        let dir = tempfile::tempdir().unwrap();
        drop_file(dir.path(), "dup.png.processing");
        drop_file(dir.path(), "dup.png");
        let claimer = FileClaimer::new(dir.path());
        assert_eq!(claimer.release_stale_claims().await.unwrap(), 0);
        assert!(dir.path().join("dup.png.processing").exists());
        assert!(dir.path().join("dup.png").exists());
    }
}
