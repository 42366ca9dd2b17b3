//! Periodic sync sweeps.
//!
//! Webhooks drive the voting lifecycle, but deliveries get lost during
//! downtime and partially failed transitions leave drift behind. A sweep is
//! therefore queued once at startup and then on a fixed interval. Sweeps go
//! through the task queue like any other item.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::message::WorkItem;
use super::queue::TaskQueue;

/// Default time between sweeps (6 hours).
pub const DEFAULT_SYNC_INTERVAL_MINS: u64 = 360;

/// When to queue sync sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSchedule {
    /// `None` disables periodic sweeps; the startup sweep still runs.
    pub interval: Option<Duration>,
}

impl Default for SyncSchedule {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_SYNC_INTERVAL_MINS)
    }
}

impl SyncSchedule {
    /// Zero minutes disables periodic sweeps.
    pub fn from_minutes(mins: u64) -> Self {
        Self {
            interval: (mins > 0).then(|| Duration::from_secs(mins * 60)),
        }
    }
}

/// Queues a sweep now and then every `schedule.interval` until shutdown.
pub async fn run_sync_schedule(
    queue: TaskQueue,
    schedule: SyncSchedule,
    shutdown: CancellationToken,
) {
    if !enqueue_sweep(&queue, &shutdown).await {
        return;
    }

    let Some(period) = schedule.interval else {
        info!("Periodic sync disabled");
        return;
    };

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if !enqueue_sweep(&queue, &shutdown).await {
                    break;
                }
            }
        }
    }
    debug!("Sync schedule stopped");
}

/// Returns false when the schedule should stop.
async fn enqueue_sweep(queue: &TaskQueue, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        result = queue.enqueue(WorkItem::SyncSweep) => match result {
            Ok(()) => {
                debug!("Queued sync sweep");
                true
            }
            Err(e) => {
                warn!(error = %e, "Cannot queue sync sweep");
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::queue::task_queue;

    #[test]
    fn zero_minutes_disables() {
        assert_eq!(SyncSchedule::from_minutes(0).interval, None);
        assert_eq!(
            SyncSchedule::default().interval,
            Some(Duration::from_secs(6 * 3600))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_at_startup_and_every_interval() {
        let (queue, mut rx) = task_queue(10);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_sync_schedule(
            queue,
            SyncSchedule::from_minutes(60),
            shutdown.clone(),
        ));

        let token = CancellationToken::new();
        assert_eq!(rx.dequeue(&token).await, Some(WorkItem::SyncSweep));

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(rx.dequeue(&token).await, Some(WorkItem::SyncSweep));

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn disabled_schedule_sweeps_once() {
        let (queue, mut rx) = task_queue(10);
        run_sync_schedule(
            queue,
            SyncSchedule::from_minutes(0),
            CancellationToken::new(),
        )
        .await;

        let token = CancellationToken::new();
        assert_eq!(rx.dequeue(&token).await, Some(WorkItem::SyncSweep));
        // The schedule dropped its producer, so the queue is now closed.
        assert_eq!(rx.dequeue(&token).await, None);
    }
}
