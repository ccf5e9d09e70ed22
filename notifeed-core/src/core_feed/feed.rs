//! Remote change-feed protocol
//!
//! Abstract interface over the remote per-user notification collection:
//! bounded query, live subscription, and point-write. Production backends
//! adapt their provider SDK to this trait; tests and the harness use the
//! in-memory backend.

use super::errors::FeedResult;
use crate::core_model::{Delta, NotificationId, NotificationRecord, RecordPatch, UserId};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::errors::FeedError;

/// One event pushed down a live stream
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A change to the user's notification set
    Delta(Delta),
    /// Terminal stream failure; no further deltas will arrive
    Error(FeedError),
}

/// Receiving half of a live subscription. Deltas arrive in the order the
/// transport delivered them; no reordering or coalescing happens here.
pub type DeltaStream = mpsc::UnboundedReceiver<FeedEvent>;

/// The remote change-feed store
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Fetch the user's most recent notifications, created_at descending,
    /// at most `limit` records
    async fn fetch_recent(
        &self,
        user: &UserId,
        limit: usize,
    ) -> FeedResult<Vec<NotificationRecord>>;

    /// Open a live stream of deltas over the user's notification set.
    ///
    /// Transports typically replay the current result set as a burst of
    /// `added` events when the stream attaches; consumers must tolerate that.
    async fn stream(&self, user: &UserId) -> FeedResult<DeltaStream>;

    /// Apply a partial update to one record
    async fn update_record(
        &self,
        user: &UserId,
        id: &NotificationId,
        patch: RecordPatch,
    ) -> FeedResult<()>;
}
