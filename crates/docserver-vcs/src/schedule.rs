//! Periodic background synchronization.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Something that can be brought up to date on a schedule.
///
/// Implementations handle and log their own failures; a sync tick has no
/// result to propagate.
pub trait Synchronize: Send + Sync + 'static {
    /// Perform one blocking synchronization attempt.
    fn synchronize(&self);
}

/// Handle to a running sync loop.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop the loop. An attempt already running on the blocking pool
    /// finishes on its own.
    pub fn shutdown(self) {
        self.task.abort();
    }

    /// Whether the loop has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run `target.synchronize()` every `interval`, starting one interval from now.
///
/// Each attempt runs on the blocking thread pool so request handling on the
/// async workers is never delayed by network or checkout work. A slow
/// attempt delays the next tick rather than overlapping with it.
pub fn spawn_sync_loop<S: Synchronize>(target: Arc<S>, interval: Duration) -> SyncHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let target = Arc::clone(&target);
            if let Err(err) = tokio::task::spawn_blocking(move || target.synchronize()).await {
                tracing::error!(error = %err, "Sync attempt panicked");
            }
        }
    });

    SyncHandle { task }
}
