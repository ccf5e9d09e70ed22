//! Subscription capability object
//!
//! Cancellation handle for one live subscription. Cancel is idempotent, safe
//! after the stream has already errored, and makes any still-pending deltas
//! inert: the pump checks the cancellation flag before every store
//! application, so a network response that resolves after cancel() cannot
//! mutate the cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a live change-feed subscription
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
    pump: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(
        cancelled: Arc<AtomicBool>,
        active: Arc<AtomicBool>,
        pump: JoinHandle<()>,
    ) -> Self {
        Subscription {
            cancelled,
            active,
            pump,
        }
    }

    /// Tear down the subscription and release the pump task. Safe to call
    /// multiple times and after the underlying stream has errored.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.active.store(false, Ordering::SeqCst);
        self.pump.abort();
        debug!("subscription cancelled");
    }

    /// Whether deltas are still being delivered. False after cancel() or
    /// after a terminal stream error.
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && self.active.load(Ordering::SeqCst)
    }

    /// Whether cancel() has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
