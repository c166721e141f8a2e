//! Bounded Blocking Pool
//!
//! Synchronous producer bodies must not block the async executor. They run
//! on tokio's blocking threads, with a semaphore bounding how many run at
//! once for a given pool.

use solvent_domain::constants::DEFAULT_MAX_BLOCKING_WORKERS;
use solvent_domain::{Error, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs synchronous work off the async executor
#[derive(Debug, Clone)]
pub struct BlockingPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl BlockingPool {
    /// Pool running at most `max_workers` jobs at once (at least one)
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    /// Configured worker bound
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Jobs that could start right now
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `job` on a blocking thread once a permit is free
    pub async fn run<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| Error::internal(format!("Blocking pool closed: {e}")))?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| Error::internal(format!("Blocking task failed: {e}")))?
    }
}

impl Default for BlockingPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCKING_WORKERS)
    }
}
