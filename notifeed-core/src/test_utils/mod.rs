//! Test helpers
//!
//! Utilities for exercising the asynchronous parts of the subsystem:
//! condition polling, channel receives with timeouts, and an alert sink that
//! records everything it is handed.

use crate::core_model::NotificationRecord;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};

/// Default timeout for test waits
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll `condition` until it returns true or `duration` elapses.
/// Returns whether the condition was met.
pub async fn wait_until<F, Fut>(duration: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + duration;
    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(5)).await;
    }
}

/// Receive from an unbounded channel with a timeout
pub async fn recv_timeout<T>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    duration: Duration,
) -> Option<T> {
    timeout(duration, rx.recv()).await.ok().flatten()
}

/// Alert sink that records every record it receives
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closure suitable for passing as an alert sink
    pub fn sink(&self) -> Arc<dyn Fn(&NotificationRecord) + Send + Sync> {
        let records = self.records.clone();
        Arc::new(move |record: &NotificationRecord| {
            records.lock().unwrap().push(record.clone());
        })
    }

    /// Snapshot of everything received so far
    pub fn received(&self) -> Vec<NotificationRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}
