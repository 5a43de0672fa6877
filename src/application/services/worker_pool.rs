use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Capacity of the import pool: running tasks plus waiting tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    pub max_concurrent: usize,
    pub queue_capacity: usize,
}

impl WorkerPoolConfig {
    pub fn total_capacity(&self) -> usize {
        self.max_concurrent + self.queue_capacity
    }
}

/// Bounded executor for import jobs.
///
/// Admission never waits: a submission either takes one of the
/// `max_concurrent + queue_capacity` slots or is rejected on the spot.
/// Admitted tasks then wait for one of `max_concurrent` worker permits.
/// The semaphore is fair in the order tasks first poll `acquire`, which on a
/// multi-thread runtime need not match submission order. Tasks run as tokio
/// tasks spawned on demand, so there is no idle worker to reclaim.
#[derive(Clone)]
pub struct ImportWorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    config: WorkerPoolConfig,
    admission: Arc<Semaphore>,
    workers: Arc<Semaphore>,
    accepting: AtomicBool,
}

/// A reserved place in the pool. Dropping it without spawning frees the place.
pub struct PoolSlot {
    admission: OwnedSemaphorePermit,
    workers: Arc<Semaphore>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolRejected {
    #[error("import pool saturated: {max_concurrent} running, {queue_capacity} queued")]
    Saturated {
        max_concurrent: usize,
        queue_capacity: usize,
    },
    #[error("import pool is shutting down")]
    ShuttingDown,
}

impl ImportWorkerPool {
    pub fn start(config: WorkerPoolConfig) -> Self {
        tracing::info!(
            max_concurrent = config.max_concurrent,
            queue_capacity = config.queue_capacity,
            "Import worker pool started"
        );
        Self {
            inner: Arc::new(PoolInner {
                config,
                admission: Arc::new(Semaphore::new(config.total_capacity())),
                workers: Arc::new(Semaphore::new(config.max_concurrent)),
                accepting: AtomicBool::new(true),
            }),
        }
    }

    /// Claims capacity for one task without blocking.
    pub fn try_reserve(&self) -> Result<PoolSlot, PoolRejected> {
        if !self.inner.accepting.load(Ordering::Acquire) {
            return Err(PoolRejected::ShuttingDown);
        }

        match Arc::clone(&self.inner.admission).try_acquire_owned() {
            Ok(admission) => Ok(PoolSlot {
                admission,
                workers: Arc::clone(&self.inner.workers),
            }),
            Err(TryAcquireError::NoPermits) => {
                tracing::warn!(
                    in_flight = self.in_flight(),
                    "Import pool saturated, rejecting submission"
                );
                Err(PoolRejected::Saturated {
                    max_concurrent: self.inner.config.max_concurrent,
                    queue_capacity: self.inner.config.queue_capacity,
                })
            }
            Err(TryAcquireError::Closed) => Err(PoolRejected::ShuttingDown),
        }
    }

    pub fn submit<F>(&self, task: F) -> Result<(), PoolRejected>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.try_reserve()?.spawn(task);
        Ok(())
    }

    /// Tasks admitted and not yet finished, running or queued.
    pub fn in_flight(&self) -> usize {
        self.inner.config.total_capacity() - self.inner.admission.available_permits()
    }

    /// Tasks currently holding a worker permit.
    pub fn running(&self) -> usize {
        self.inner.config.max_concurrent - self.inner.workers.available_permits()
    }

    /// Stops admission and waits until every accepted task has run to completion.
    pub async fn shutdown(&self) {
        self.inner.accepting.store(false, Ordering::Release);
        let pending = self.in_flight();
        tracing::info!(pending, "Import worker pool draining");

        let total = u32::try_from(self.inner.config.total_capacity()).unwrap_or(u32::MAX);
        match self.inner.admission.acquire_many(total).await {
            Ok(all) => all.forget(),
            Err(_) => tracing::debug!("Import worker pool already closed"),
        }
        self.inner.admission.close();
        tracing::info!("Import worker pool stopped");
    }
}

impl PoolSlot {
    /// Queues `task`; it starts once a worker permit is free.
    pub fn spawn<F>(self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let PoolSlot { admission, workers } = self;
        tokio::spawn(async move {
            let _admission = admission;
            let _worker = match workers.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Worker semaphore closed before queued import could start");
                    return;
                }
            };
            task.await;
        });
    }
}
