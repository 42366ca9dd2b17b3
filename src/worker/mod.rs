//! Single-consumer work pipeline.
//!
//! Webhook handlers classify events into [`WorkItem`]s and push them onto a
//! bounded queue. Exactly one [`Worker`] drains it, running each item to
//! completion before taking the next. A full queue makes producers wait.
//!
//! # Module Structure
//!
//! - `message`: the typed work items
//! - `queue`: bounded FIFO with cancellation-aware dequeue
//! - `classify`: event → work item mapping
//! - `dispatch`: routes items to the engine, commands and release tracker
//! - `worker`: the consumer loop
//! - `poll`: periodic sync sweeps

mod classify;
mod dispatch;
mod message;
mod poll;
mod queue;
mod worker;

pub use classify::classify;
pub use dispatch::Dispatcher;
pub use message::WorkItem;
pub use poll::{DEFAULT_SYNC_INTERVAL_MINS, SyncSchedule, run_sync_schedule};
pub use queue::{DEFAULT_QUEUE_CAPACITY, QueueClosed, TaskQueue, TaskReceiver, task_queue};
pub use worker::{WorkError, WorkHandler, Worker, WorkerStats};
