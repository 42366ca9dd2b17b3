//! Bounded FIFO task queue.
//!
//! Producers suspend while the queue is full; nothing is ever dropped or
//! rejected. There is exactly one receiver.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::message::WorkItem;

/// Default number of queued items before producers wait.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// The consumer has gone away.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("task queue is closed")]
pub struct QueueClosed;

/// Producer half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TaskQueue {
    tx: mpsc::Sender<WorkItem>,
}

/// Consumer half.
#[derive(Debug)]
pub struct TaskReceiver {
    rx: mpsc::Receiver<WorkItem>,
}

/// Creates a queue holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero. Configuration validation rejects that value
/// before the queue is built.
pub fn task_queue(capacity: usize) -> (TaskQueue, TaskReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (TaskQueue { tx }, TaskReceiver { rx })
}

impl TaskQueue {
    /// Appends an item, waiting for space if the queue is full.
    pub async fn enqueue(&self, item: WorkItem) -> Result<(), QueueClosed> {
        self.tx.send(item).await.map_err(|_| QueueClosed)
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }
}

impl TaskReceiver {
    /// Waits for the next item.
    ///
    /// Returns `None` once `cancel` fires or every producer has been dropped.
    /// Cancellation wins when both are ready.
    pub async fn dequeue(&mut self, cancel: &CancellationToken) -> Option<WorkItem> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = self.rx.recv() => item,
        }
    }
}
