//! The non-reentrant periodic trigger.
//!
//! One batch is scan-claim, then drain. The loop runs a batch to
//! completion before it even starts waiting for the next tick, so
//! overlapping batches — and the double-claiming races they would invite —
//! are impossible by construction rather than guarded by a flag. Decode
//! latency naturally throttles scan frequency: a slow batch just delays
//! its own rearm.

use crate::claimer::FileClaimer;
use crate::error::Result;
use crate::worker::{ClaimQueue, WorkerPool};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Drives the pipeline: scan, drain, sleep, repeat.
pub struct Scheduler {
    claimer: FileClaimer,
    pool: WorkerPool,
    interval: Duration,
}

impl Scheduler {
    pub fn new(claimer: FileClaimer, pool: WorkerPool, interval: Duration) -> Self {
        Self { claimer, pool, interval }
    }

    /// Run batches until `shutdown` flips to `true` (or its sender goes
    /// away). An in-flight batch always finishes; the signal is only
    /// checked between batches.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(watch = %self.claimer.watch_dir().display(), "scheduler started");
        while !*shutdown.borrow() {
            // A bad cycle must never stop the pipeline: log and rearm.
            match self.run_batch().await {
                Ok(0) => debug!("batch complete, nothing to claim"),
                Ok(claimed) => info!(claimed, "batch complete"),
                Err(err) => error!(error = %err, "batch failed, rearming anyway"),
            }
            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.changed() => break,
            }
        }
        info!("scheduler stopped");
    }

    /// One full cycle: claim everything eligible, then drain the queue
    /// through the worker pool. Returns the number of files claimed.
    ///
    /// # Errors
    /// Only the scan itself can fail here; claim processing failures are
    /// contained at the per-claim boundary inside the pool.
    pub async fn run_batch(&self) -> Result<usize> {
        let claims = self.claimer.scan_and_claim().await?;
        let claimed = claims.len();
        if claimed > 0 {
            self.pool.drain(ClaimQueue::from_claims(claims)).await;
        }
        Ok(claimed)
    }
}
