/*
    core_readstate - Optimistic read-state coordination

    Applies read/unread transitions to the local cache first, then issues
    idempotent acknowledgements to the remote store. Local intent is
    authoritative for the session: a remote write failure is logged and
    swallowed, and any true divergence self-heals on the next live modified
    delta from the remote store.
*/

use crate::core_feed::{ChangeFeed, FeedError};
use crate::core_model::{NotificationId, RecordPatch, UserId};
use crate::core_store::NotificationStore;
use metrics::{counter, gauge};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Coordinates optimistic local read transitions with remote acknowledgements
pub struct ReadStateCoordinator {
    feed: Arc<dyn ChangeFeed>,
    store: Arc<RwLock<NotificationStore>>,
    user_id: UserId,
}

impl ReadStateCoordinator {
    pub fn new(
        feed: Arc<dyn ChangeFeed>,
        store: Arc<RwLock<NotificationStore>>,
        user_id: UserId,
    ) -> Self {
        ReadStateCoordinator {
            feed,
            store,
            user_id,
        }
    }

    /// Mark one notification read: optimistic local flip, then a remote
    /// acknowledgement. Idempotent; marking an already-read or unknown
    /// record does nothing and never errors.
    pub async fn mark_as_read(&self, id: &NotificationId) {
        let flipped = {
            let mut store = self.store.write().await;
            let flipped = store.mark_read(id);
            gauge!("notify.unread").set(store.unread_count() as f64);
            flipped
        };
        if !flipped {
            debug!(id = %id, "mark_as_read: nothing to do");
            return;
        }

        if let Err(error) = self
            .feed
            .update_record(&self.user_id, id, RecordPatch::mark_read())
            .await
        {
            log_write_failure(id, &error);
        }
    }

    /// Mark every unread notification read. The local flip is one atomic
    /// update; remote acknowledgements go out in parallel, one per record,
    /// with no cross-record ordering. Partial remote failure is tolerated.
    pub async fn mark_all_as_read(&self) {
        let flipped = {
            let mut store = self.store.write().await;
            let flipped = store.mark_all_read();
            gauge!("notify.unread").set(store.unread_count() as f64);
            flipped
        };
        if flipped.is_empty() {
            return;
        }
        debug!(count = flipped.len(), "marking all notifications read");

        let mut writes = Vec::with_capacity(flipped.len());
        for id in flipped {
            let feed = self.feed.clone();
            let user = self.user_id.clone();
            writes.push(tokio::spawn(async move {
                if let Err(error) = feed
                    .update_record(&user, &id, RecordPatch::mark_read())
                    .await
                {
                    log_write_failure(&id, &error);
                }
            }));
        }
        for write in writes {
            // A panicked write task is as tolerable as a failed write
            let _ = write.await;
        }
    }
}

fn log_write_failure(id: &NotificationId, error: &FeedError) {
    counter!("notify.remote_writes.failed").increment(1);
    warn!(id = %id, error = %error, "remote read acknowledgement failed, keeping local state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_feed::InMemoryChangeFeed;
    use crate::core_model::{Delta, NotificationRecord, NotificationType, Timestamp};

    fn record(id: &str) -> NotificationRecord {
        NotificationRecord::new(
            NotificationId::new(id),
            UserId::new("u-1"),
            "title",
            "message",
            NotificationType::Achievement,
            Timestamp::from_millis(1_000),
        )
    }

    async fn setup(
        ids: &[&str],
    ) -> (
        InMemoryChangeFeed,
        Arc<RwLock<NotificationStore>>,
        ReadStateCoordinator,
    ) {
        let feed = InMemoryChangeFeed::new();
        let store = Arc::new(RwLock::new(NotificationStore::new()));
        for id in ids {
            feed.push(record(id)).await;
            store.write().await.apply_delta(&Delta::added(record(id)));
        }
        let coordinator = ReadStateCoordinator::new(
            Arc::new(feed.clone()),
            store.clone(),
            UserId::new("u-1"),
        );
        (feed, store, coordinator)
    }

    #[tokio::test]
    async fn test_mark_as_read_flips_locally_and_remotely() {
        let (feed, store, coordinator) = setup(&["a"]).await;
        let id = NotificationId::new("a");

        coordinator.mark_as_read(&id).await;

        let store = store.read().await;
        assert!(store.get(&id).unwrap().read);
        assert_eq!(store.unread_count(), 0);
        let remote = feed.record(&UserId::new("u-1"), &id).await.unwrap();
        assert!(remote.read);
    }

    #[tokio::test]
    async fn test_mark_as_read_is_idempotent() {
        let (_feed, store, coordinator) = setup(&["a"]).await;
        let id = NotificationId::new("a");

        coordinator.mark_as_read(&id).await;
        coordinator.mark_as_read(&id).await;
        coordinator.mark_as_read(&NotificationId::new("ghost")).await;

        assert_eq!(store.read().await.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_mark_as_read_survives_remote_failure() {
        let (feed, store, coordinator) = setup(&["a"]).await;
        let id = NotificationId::new("a");
        feed.fail_updates_for(id.clone()).await;

        coordinator.mark_as_read(&id).await;

        // Local state is authoritative for the session
        let store = store.read().await;
        assert!(store.get(&id).unwrap().read);
        assert_eq!(store.unread_count(), 0);
        // Remote never applied the write
        assert!(!feed.record(&UserId::new("u-1"), &id).await.unwrap().read);
    }

    #[tokio::test]
    async fn test_mark_all_as_read_partial_failure() {
        let (feed, store, coordinator) = setup(&["a", "b", "c"]).await;
        feed.fail_updates_for(NotificationId::new("b")).await;

        coordinator.mark_all_as_read().await;

        let store = store.read().await;
        assert_eq!(store.unread_count(), 0);
        for id in ["a", "b", "c"] {
            assert!(store.get(&NotificationId::new(id)).unwrap().read);
        }

        let user = UserId::new("u-1");
        assert!(feed.record(&user, &NotificationId::new("a")).await.unwrap().read);
        assert!(!feed.record(&user, &NotificationId::new("b")).await.unwrap().read);
        assert!(feed.record(&user, &NotificationId::new("c")).await.unwrap().read);
    }

    #[tokio::test]
    async fn test_mark_all_as_read_with_nothing_unread() {
        let (_feed, store, coordinator) = setup(&[]).await;
        coordinator.mark_all_as_read().await;
        assert_eq!(store.read().await.unread_count(), 0);
    }
}
