//! Output routing and claim cleanup.
//!
//! A claim's decoded values decide where its content ends up: one copy in
//! the output directory per distinct value, named after the value, or a
//! move to the error directory under the original name when nothing
//! decoded. Either way the claim artifact ceases to exist at its claim
//! path — unless routing itself fails, in which case the claim is left on
//! disk bearing its marker for the next process start to release.

use crate::claim::FileClaim;
use crate::error::{ErrorKind, Result};
use crate::sanitize::safe_file_name;
use exn::ResultExt;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

/// The outcome of (successfully) routing a single claim.
#[derive(Debug, Eq, PartialEq)]
pub enum Routed {
    /// One output copy written per distinct decoded value; the claim
    /// artifact was deleted.
    Delivered { outputs: Vec<PathBuf> },
    /// Nothing decoded; the claim was moved to the error location under
    /// its original name.
    NoDecode(PathBuf),
}

/// Routes claims to the output or error directory.
#[derive(Clone, Debug)]
pub struct OutputRouter {
    output_dir: PathBuf,
    error_dir: PathBuf,
}

impl OutputRouter {
    pub fn new(output_dir: impl Into<PathBuf>, error_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), error_dir: error_dir.into() }
    }

    /// Route one claim according to its decoded values.
    ///
    /// Values are deduplicated by exact text equality, first-seen order
    /// preserved. Output names compose the sanitized value, a 1-based
    /// per-claim index, and the original extension. Name collisions across
    /// claims overwrite the earlier delivery (last write wins) with a
    /// warning.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Route`] when a copy, move, or delete fails;
    /// the claim is then still on disk at its claim path.
    pub async fn route(&self, claim: &FileClaim, values: Vec<String>) -> Result<Routed> {
        let distinct = dedupe(values);
        if distinct.is_empty() {
            let target = self.error_dir.join(claim.original_file_name());
            fs::rename(&claim.claim_path, &target)
                .await
                .or_raise(|| ErrorKind::Route(claim.claim_path.clone()))?;
            warn!(file = %claim.original_path.display(), "no barcode found, routed to error location");
            return Ok(Routed::NoDecode(target));
        }

        let mut outputs = Vec::with_capacity(distinct.len());
        for (index, value) in distinct.iter().enumerate() {
            let name = format!("{}_{}{}", safe_file_name(value), index + 1, claim.original_extension);
            let target = self.output_dir.join(name);
            if matches!(fs::try_exists(&target).await, Ok(true)) {
                warn!(value, target = %target.display(), "output name collision, overwriting earlier delivery");
            }
            fs::copy(&claim.claim_path, &target)
                .await
                .or_raise(|| ErrorKind::Route(claim.claim_path.clone()))?;
            info!(value, output = %target.display(), "delivered");
            outputs.push(target);
        }
        // Only delete the claim once every copy has landed.
        fs::remove_file(&claim.claim_path)
            .await
            .or_raise(|| ErrorKind::Route(claim.claim_path.clone()))?;
        Ok(Routed::Delivered { outputs })
    }
}

/// Collapse exact-text duplicates, preserving first-seen order.
fn dedupe(values: Vec<String>) -> Vec<String> {
    let mut distinct = Vec::with_capacity(values.len());
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    distinct
}
