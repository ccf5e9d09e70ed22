/*
    core_session - Per-session assembly

    One NotificationSession per authenticated session: it owns the store and
    wires the subscriber and the read-state coordinator to it. Constructed at
    sign-in, dropped at sign-out; there is no process-wide singleton. Multiple
    sessions for the same user share nothing in-process and reconcile only
    through the remote store.
*/

use crate::config::Config;
use crate::core_cursor::CursorStore;
use crate::core_feed::{
    AlertSink, ChangeFeed, ChangeFeedSubscriber, ErrorSink, FeedResult, Subscription,
};
use crate::core_model::{NotificationId, NotificationRecord, Timestamp, UserId};
use crate::core_readstate::ReadStateCoordinator;
use crate::core_store::NotificationStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Notification surface for one authenticated session
pub struct NotificationSession {
    user_id: UserId,
    store: Arc<RwLock<NotificationStore>>,
    subscriber: ChangeFeedSubscriber,
    readstate: ReadStateCoordinator,
}

impl NotificationSession {
    pub fn new(
        user_id: UserId,
        feed: Arc<dyn ChangeFeed>,
        cursors: Arc<dyn CursorStore>,
        config: Config,
    ) -> Self {
        let store = Arc::new(RwLock::new(NotificationStore::new()));
        let subscriber =
            ChangeFeedSubscriber::new(feed.clone(), store.clone(), cursors, config);
        let readstate = ReadStateCoordinator::new(feed, store.clone(), user_id.clone());
        info!(user = %user_id, "notification session created");
        NotificationSession {
            user_id,
            store,
            subscriber,
            readstate,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Open the live subscription for this session's user. `on_alert` fires
    /// once per record that passes the delivery filter; `on_error` fires once
    /// if the stream fails terminally.
    pub async fn subscribe(
        &self,
        on_alert: AlertSink,
        on_error: ErrorSink,
    ) -> FeedResult<Subscription> {
        self.subscriber
            .subscribe(&self.user_id, on_alert, on_error)
            .await
    }

    /// Current notification set, created_at descending
    pub async fn get_all(&self) -> Vec<NotificationRecord> {
        self.store.read().await.get_all()
    }

    /// Derived unread count for badge rendering
    pub async fn unread_count(&self) -> usize {
        self.store.read().await.unread_count()
    }

    /// Mark one notification read (optimistic, never errors)
    pub async fn mark_as_read(&self, id: &NotificationId) {
        self.readstate.mark_as_read(id).await;
    }

    /// Mark every unread notification read (optimistic, never errors)
    pub async fn mark_all_as_read(&self) {
        self.readstate.mark_all_as_read().await;
    }

    /// Drop locally-expired records, returning how many were purged
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.purge_expired(Timestamp::now())
    }
}
