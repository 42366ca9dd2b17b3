//! The single consumer loop.
//!
//! Items run one at a time, in queue order, each to completion. A failing or
//! panicking item is logged and the loop moves on. Shutdown is only observed
//! between items, so an in-flight item always finishes.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::reconcile::ReconcileError;
use crate::release::ReleaseError;

use super::message::WorkItem;
use super::queue::TaskReceiver;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("release tracking error: {0}")]
    Release(#[from] ReleaseError),
}

/// Executes one work item.
pub trait WorkHandler: Send + Sync + 'static {
    fn handle(&self, item: WorkItem) -> impl Future<Output = Result<(), WorkError>> + Send;
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub succeeded: u64,
    pub failed: u64,
    pub panicked: u64,
}

/// Drains a [`TaskReceiver`] through a [`WorkHandler`].
pub struct Worker<H> {
    handler: Arc<H>,
}

impl<H: WorkHandler> Worker<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Runs until `shutdown` fires or every producer is gone.
    #[instrument(skip_all)]
    pub async fn run(self, mut rx: TaskReceiver, shutdown: CancellationToken) -> WorkerStats {
        info!("Worker loop started");
        let mut stats = WorkerStats::default();

        while let Some(item) = rx.dequeue(&shutdown).await {
            let label = item.to_string();
            debug!(item = %label, "Dequeued work item");

            // Spawned so that a panic stays inside the task.
            let handler = Arc::clone(&self.handler);
            let outcome = tokio::spawn(async move { handler.handle(item).await }).await;

            match outcome {
                Ok(Ok(())) => {
                    stats.succeeded += 1;
                    debug!(item = %label, "Work item done");
                }
                Ok(Err(e)) => {
                    stats.failed += 1;
                    error!(item = %label, error = %e, "Work item failed");
                }
                Err(e) => {
                    stats.panicked += 1;
                    error!(item = %label, error = %e, "Work item panicked");
                }
            }
        }

        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            panicked = stats.panicked,
            "Worker loop stopped"
        );
        stats
    }
}
