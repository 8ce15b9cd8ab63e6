//! The bounded worker pool.
//!
//! A fixed number of workers drain a shared queue: pop one claim, process
//! it end-to-end (decode then route), repeat until the queue is empty.
//! [`WorkerPool::drain`] returns only after every worker has observed an
//! empty queue and exited — the join barrier the scheduler relies on to
//! rearm without overlap.

use crate::claim::FileClaim;
use crate::router::{OutputRouter, Routed};
use barq_decode::{Decoder, DecoderHandle};
use futures::future;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info};

/// Internally synchronised multi-producer/multi-consumer FIFO of claims.
///
/// The lock is held only for a push or pop, never across an await point,
/// so a plain [`std::sync::Mutex`] is the right tool. No claim is ever
/// delivered to two workers: a pop removes it before the lock is released.
#[derive(Clone, Debug, Default)]
pub struct ClaimQueue {
    inner: Arc<Mutex<VecDeque<FileClaim>>>,
}

impl ClaimQueue {
    pub fn from_claims(claims: impl IntoIterator<Item = FileClaim>) -> Self {
        Self { inner: Arc::new(Mutex::new(claims.into_iter().collect())) }
    }

    pub fn push(&self, claim: FileClaim) {
        self.lock().push_back(claim);
    }

    pub fn pop(&self) -> Option<FileClaim> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<FileClaim>> {
        // A worker can't panic while holding the lock (push/pop only), but
        // recover rather than propagate poisoning anyway.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed-size pool of concurrent claim processors.
pub struct WorkerPool {
    count: usize,
    decoder: DecoderHandle,
    router: OutputRouter,
}

impl WorkerPool {
    pub fn new(count: usize, decoder: DecoderHandle, router: OutputRouter) -> Self {
        Self { count: count.max(1), decoder, router }
    }

    /// Spawn the workers and wait for all of them to drain the queue.
    pub async fn drain(&self, queue: ClaimQueue) {
        let mut workers = Vec::with_capacity(self.count);
        for worker in 0..self.count {
            let queue = queue.clone();
            let decoder = Arc::clone(&self.decoder);
            let router = self.router.clone();
            workers.push(tokio::spawn(async move {
                while let Some(claim) = queue.pop() {
                    process_claim(worker, decoder.as_ref(), &router, claim).await;
                }
            }));
        }
        for joined in future::join_all(workers).await {
            if let Err(err) = joined {
                error!(error = %err, "worker task aborted");
            }
        }
    }
}

/// Process one claim end-to-end. Every failure is contained here: a bad
/// file is logged and the worker moves on to its next queue item.
async fn process_claim(worker: usize, decoder: &dyn Decoder, router: &OutputRouter, claim: FileClaim) {
    info!(worker, claim = %claim.claim_path.display(), "processing");
    let values = decoder.decode(&claim.claim_path, &claim.original_extension).await;
    match router.route(&claim, values).await {
        Ok(Routed::Delivered { outputs }) => {
            info!(worker, claim = %claim.claim_path.display(), outputs = outputs.len(), "claim completed");
        },
        Ok(Routed::NoDecode(_)) => {
            // The router already logged the outcome.
        },
        Err(err) => {
            error!(
                worker,
                claim = %claim.claim_path.display(),
                error = %err,
                "routing failed, claim abandoned at its claim path"
            );
        },
    }
}
