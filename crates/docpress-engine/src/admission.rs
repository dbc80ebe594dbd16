//! Admission controller — the bounded-concurrency gate in front of job
//! execution.
//!
//! At most `max_concurrent` jobs hold a slot at any instant. Requests
//! beyond the limit wait in FIFO order with a per-entry deadline; a
//! deadline expiry is a definitive "server busy" rejection that never
//! acquired a slot. All slot and wait-list state lives in this module and
//! is mutated only through [`AdmissionController::admit`] and permit drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Semaphore, TryAcquireError};

use docpress_core::config::jobs::JobsConfig;
use docpress_core::error::AppError;

use crate::job::Job;

/// Snapshot of slot occupancy and queue length, for health reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlotOccupancy {
    /// Configured concurrency limit (N).
    pub limit: usize,
    /// Jobs currently holding a slot.
    pub running: usize,
    /// Jobs currently waiting for a slot.
    pub queued: usize,
}

/// A held execution slot. Dropping it frees the slot and, because the
/// underlying semaphore is fair, admits the head of the wait list next.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

/// The concurrency gate protecting a memory-constrained host from
/// overlapping heavy conversions.
///
/// Built on a fair [`tokio::sync::Semaphore`]: waiters are served in
/// strict arrival order, and concurrent releases each wake at most one
/// waiter, so the running count can never exceed the limit even under
/// admit/release races. A caller that drops its `admit` future while
/// waiting (client disconnect) is removed from the wait list without ever
/// acquiring a slot.
#[derive(Debug)]
pub struct AdmissionController {
    semaphore: Arc<Semaphore>,
    limit: usize,
    queued: Arc<AtomicUsize>,
    queue_wait: Duration,
}

impl AdmissionController {
    /// Create a controller with `max_concurrent` slots from config.
    pub fn new(config: &JobsConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            limit: config.max_concurrent,
            queued: Arc::new(AtomicUsize::new(0)),
            queue_wait: Duration::from_secs(config.queue_wait_seconds),
        }
    }

    /// Admit a job, waiting in FIFO order if all slots are taken.
    ///
    /// Returns `Err(Busy)` if no slot frees up before the queue-wait
    /// deadline. The returned permit must be held for the job's entire
    /// running phase; dropping it releases the slot.
    pub async fn admit(&self, job: &Job) -> Result<AdmissionPermit, AppError> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => {
                tracing::debug!(job_id = %job.id, kind = %job.kind, "Job admitted immediately");
                return Ok(AdmissionPermit { _permit: permit });
            }
            Err(TryAcquireError::NoPermits) => {}
            Err(TryAcquireError::Closed) => {
                return Err(AppError::internal("Admission gate closed"));
            }
        }

        tracing::debug!(
            job_id = %job.id,
            kind = %job.kind,
            queued = self.queued.load(Ordering::SeqCst) + 1,
            "All slots occupied, job queued"
        );

        // The guard keeps the queue-length counter honest even when the
        // caller drops this future mid-wait.
        let _queued = QueuedGuard::new(Arc::clone(&self.queued));

        match tokio::time::timeout(
            self.queue_wait,
            Arc::clone(&self.semaphore).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => {
                tracing::debug!(job_id = %job.id, kind = %job.kind, "Queued job admitted");
                Ok(AdmissionPermit { _permit: permit })
            }
            Ok(Err(_)) => Err(AppError::internal("Admission gate closed")),
            Err(_) => {
                tracing::warn!(
                    job_id = %job.id,
                    kind = %job.kind,
                    wait_seconds = self.queue_wait.as_secs(),
                    "Job rejected: no slot freed before the queue-wait deadline"
                );
                Err(AppError::busy(
                    "Server is busy processing other conversions, please retry later",
                ))
            }
        }
    }

    /// Current slot occupancy and queue length.
    pub fn occupancy(&self) -> SlotOccupancy {
        SlotOccupancy {
            limit: self.limit,
            running: self.limit - self.semaphore.available_permits(),
            queued: self.queued.load(Ordering::SeqCst),
        }
    }
}

struct QueuedGuard {
    queued: Arc<AtomicUsize>,
}

impl QueuedGuard {
    fn new(queued: Arc<AtomicUsize>) -> Self {
        queued.fetch_add(1, Ordering::SeqCst);
        Self { queued }
    }
}

impl Drop for QueuedGuard {
    fn drop(&mut self) {
        self.queued.fetch_sub(1, Ordering::SeqCst);
    }
}
