//! Writes that complete after the response has been sent.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::storage::StorageError;

/// Registry of store writes the response path does not wait for.
///
/// Each write is spawned onto the runtime immediately, so it makes progress
/// while the handler returns. [`DeferredTasks::drain`] awaits everything still
/// outstanding; the server calls it before shutting down so no write is lost.
#[derive(Clone, Default)]
pub struct DeferredTasks {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl DeferredTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `write` to run to completion in the background.
    pub async fn wait_until<F>(&self, label: &'static str, write: F)
    where
        F: Future<Output = Result<(), StorageError>> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        // Reap finished writes so the set does not grow without bound
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }
        tasks.spawn(async move {
            match write.await {
                Ok(()) => tracing::debug!("Deferred write '{}' completed", label),
                Err(e) => tracing::error!("Deferred write '{}' failed: {}", label, e),
            }
        });
    }

    /// Await every write registered so far, including ones added while draining.
    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.tasks.lock().await);
            if pending.is_empty() {
                return;
            }
            while let Some(result) = pending.join_next().await {
                log_join_result(result);
            }
        }
    }

    pub async fn pending(&self) -> usize {
        self.tasks.lock().await.len()
    }
}

fn log_join_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!("Deferred write task aborted: {}", e);
    }
}
