//! Fire-and-forget task dispatch.
//!
//! Webhook handlers hand their slow work (tracker lookups, Slack posts) to
//! the [`Dispatcher`] and answer Slack immediately. Tasks are never queued,
//! retried, or cancelled; each one logs its own outcome. The only
//! coordination is at shutdown, where in-flight tasks get a grace period.

use std::future::Future;
use std::time::Duration;

use tokio_util::task::TaskTracker;
use tracing::{Instrument, Span, info, warn};

/// Spawns and tracks background tasks.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    tracker: TaskTracker,
}

impl Dispatcher {
    /// Create a new dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` in the current tracing span without waiting for it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task.instrument(Span::current()));
    }

    /// Number of tasks still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every task spawned so far has finished.
    ///
    /// New tasks may still be spawned afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for in-flight tasks, giving up after `timeout`.
    ///
    /// Returns `true` if every task finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();

        let in_flight = self.tracker.len();
        if in_flight > 0 {
            info!(in_flight, "Waiting for in-flight tasks");
        }

        if tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok() {
            true
        } else {
            warn!(
                remaining = self.tracker.len(),
                "Shutdown timeout reached with tasks still running"
            );
            false
        }
    }
}
