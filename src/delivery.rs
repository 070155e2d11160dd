//! Fire-and-forget delivery of sink requests

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Spawns sink requests in the background and keeps count of the ones in flight.
///
/// Callers never wait on a delivery. [`DeliveryTracker::flush`] exists so a
/// process can drain outstanding requests before it exits.
#[derive(Debug, Clone, Default)]
pub struct DeliveryTracker {
    tracker: TaskTracker,
    /// `flush` closes and reopens the tracker, so flushes must not interleave
    flushing: Arc<Mutex<()>>,
}

impl DeliveryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `delivery` on the current tokio runtime.
    ///
    /// Returns `false` and drops the delivery when called outside a runtime.
    pub fn spawn<F>(&self, sink: &'static str, delivery: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                self.tracker.spawn_on(delivery, &handle);
                true
            }
            Err(_) => {
                warn!("No tokio runtime available, dropping {} delivery", sink);
                false
            }
        }
    }

    /// Number of deliveries still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait up to `timeout` for in-flight deliveries.
    ///
    /// Returns `true` when everything finished in time. Concurrent flushes
    /// run one after another; each gets its own `timeout` once it starts.
    pub async fn flush(&self, timeout: Duration) -> bool {
        let _guard = self.flushing.lock().await;
        debug!("Flushing {} in-flight deliveries", self.tracker.len());

        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();

        if !drained {
            warn!(
                "{} deliveries still in flight after {:?}",
                self.tracker.len(),
                timeout
            );
        }

        drained
    }
}
