use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::Semaphore;

/// Worker width used for every phase unless configured otherwise.
pub const DEFAULT_WIDTH: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("worker pool closed")]
    Closed,

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Bounded fan-out over the tokio runtime.
///
/// Every submitted future is spawned immediately but only starts running once
/// it holds one of `width` permits. Results travel back through the returned
/// handle, so callers collect them in one place (usually a
/// `FuturesUnordered`) instead of sharing mutable state between tasks.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    width: usize,
}

impl WorkerPool {
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            permits: Arc::new(Semaphore::new(width)),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn submit<F>(&self, task: F) -> BoxFuture<'static, Result<F::Output, TaskError>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            Some(task.await)
        });
        async move { handle.await?.ok_or(TaskError::Closed) }.boxed()
    }

    /// Like [`submit`](Self::submit), tagging the result with `key` so the
    /// collector knows which item it belongs to.
    pub fn submit_keyed<K, F>(
        &self,
        key: K,
        task: F,
    ) -> BoxFuture<'static, (K, Result<F::Output, TaskError>)>
    where
        K: Send + 'static,
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let result = self.submit(task);
        async move { (key, result.await) }.boxed()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}
