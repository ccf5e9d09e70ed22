//! In-memory change-feed backend
//!
//! Full implementation of the remote protocol against process memory: per-user
//! record maps with live fan-out to every attached stream. Used by the test
//! harness and by the integration tests; mirrors the replay-on-attach
//! behaviour of real change-feed transports so reconnect suppression can be
//! exercised without a network.

use super::errors::{FeedError, FeedResult};
use super::feed::{ChangeFeed, DeltaStream, FeedEvent};
use crate::core_model::{Delta, NotificationId, NotificationRecord, RecordPatch, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

#[derive(Default)]
struct Inner {
    /// Per-user notification sets, keyed by record id
    records: HashMap<UserId, HashMap<NotificationId, NotificationRecord>>,

    /// Live subscribers per user
    subscribers: HashMap<UserId, Vec<mpsc::UnboundedSender<FeedEvent>>>,

    /// Ids whose update_record calls should be rejected (failure injection)
    failing_updates: HashSet<NotificationId>,

    /// When set, fetch_recent fails (failure injection)
    failing_fetches: bool,

    /// When set, stream fails to attach (failure injection)
    failing_streams: bool,

    /// Whether stream() replays the current set as an added burst
    replay_on_attach: bool,
}

impl Inner {
    fn fan_out(&mut self, user: &UserId, event: FeedEvent) {
        if let Some(senders) = self.subscribers.get_mut(user) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// In-memory change feed
#[derive(Clone)]
pub struct InMemoryChangeFeed {
    inner: Arc<RwLock<Inner>>,
}

impl Default for InMemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChangeFeed {
    pub fn new() -> Self {
        InMemoryChangeFeed {
            inner: Arc::new(RwLock::new(Inner {
                replay_on_attach: true,
                ..Default::default()
            })),
        }
    }

    /// Disable the added-burst replay when a stream attaches
    pub async fn set_replay_on_attach(&self, replay: bool) {
        self.inner.write().await.replay_on_attach = replay;
    }

    /// Make update_record fail for the given id
    pub async fn fail_updates_for(&self, id: NotificationId) {
        self.inner.write().await.failing_updates.insert(id);
    }

    /// Make fetch_recent fail
    pub async fn set_fail_fetches(&self, fail: bool) {
        self.inner.write().await.failing_fetches = fail;
    }

    /// Make stream fail to attach
    pub async fn set_fail_streams(&self, fail: bool) {
        self.inner.write().await.failing_streams = fail;
    }

    /// Drop every live stream for the user without an error event, the way a
    /// transport that silently loses its connection would
    pub async fn disconnect(&self, user: &UserId) {
        self.inner.write().await.subscribers.remove(user);
    }

    /// Insert a record and fan it out as an `added` delta
    pub async fn push(&self, record: NotificationRecord) {
        let mut inner = self.inner.write().await;
        let user = record.user_id.clone();
        inner
            .records
            .entry(user.clone())
            .or_default()
            .insert(record.id.clone(), record.clone());
        inner.fan_out(&user, FeedEvent::Delta(Delta::added(record)));
    }

    /// Replace a record and fan it out as a `modified` delta
    pub async fn modify(&self, record: NotificationRecord) {
        let mut inner = self.inner.write().await;
        let user = record.user_id.clone();
        inner
            .records
            .entry(user.clone())
            .or_default()
            .insert(record.id.clone(), record.clone());
        inner.fan_out(&user, FeedEvent::Delta(Delta::modified(record)));
    }

    /// Delete a record and fan it out as a `removed` delta
    pub async fn remove(&self, user: &UserId, id: &NotificationId) {
        let mut inner = self.inner.write().await;
        let removed = inner
            .records
            .get_mut(user)
            .and_then(|records| records.remove(id));
        if let Some(record) = removed {
            inner.fan_out(user, FeedEvent::Delta(Delta::removed(record)));
        }
    }

    /// Push a terminal error to every live stream for the user
    pub async fn emit_error(&self, user: &UserId, error: FeedError) {
        let mut inner = self.inner.write().await;
        inner.fan_out(user, FeedEvent::Error(error));
        // The streams are dead after an error; drop the senders
        inner.subscribers.remove(user);
    }

    /// Current remote state of one record
    pub async fn record(&self, user: &UserId, id: &NotificationId) -> Option<NotificationRecord> {
        self.inner
            .read()
            .await
            .records
            .get(user)
            .and_then(|records| records.get(id))
            .cloned()
    }

    fn sorted_desc(records: &HashMap<NotificationId, NotificationRecord>) -> Vec<NotificationRecord> {
        let mut all: Vec<NotificationRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }
}

#[async_trait]
impl ChangeFeed for InMemoryChangeFeed {
    async fn fetch_recent(
        &self,
        user: &UserId,
        limit: usize,
    ) -> FeedResult<Vec<NotificationRecord>> {
        let inner = self.inner.read().await;
        if inner.failing_fetches {
            return Err(FeedError::Network("fetch rejected".to_string()));
        }
        let mut all = inner
            .records
            .get(user)
            .map(Self::sorted_desc)
            .unwrap_or_default();
        all.truncate(limit);
        Ok(all)
    }

    async fn stream(&self, user: &UserId) -> FeedResult<DeltaStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.write().await;
        if inner.failing_streams {
            return Err(FeedError::Network("stream rejected".to_string()));
        }

        if inner.replay_on_attach {
            // Real transports redeliver the current result set on attach
            let burst = inner
                .records
                .get(user)
                .map(Self::sorted_desc)
                .unwrap_or_default();
            debug!(user = %user, count = burst.len(), "replaying current set on attach");
            for record in burst {
                let _ = tx.send(FeedEvent::Delta(Delta::added(record)));
            }
        }

        inner
            .subscribers
            .entry(user.clone())
            .or_default()
            .push(tx);
        Ok(rx)
    }

    async fn update_record(
        &self,
        user: &UserId,
        id: &NotificationId,
        patch: RecordPatch,
    ) -> FeedResult<()> {
        let mut inner = self.inner.write().await;
        if inner.failing_updates.contains(id) {
            return Err(FeedError::Backend(format!("update rejected for {}", id)));
        }

        let record = inner
            .records
            .get_mut(user)
            .and_then(|records| records.get_mut(id));
        let record = match record {
            Some(record) => record,
            // Point-writes to unknown ids are accepted and dropped, matching
            // the idempotent semantics of the real store
            None => return Ok(()),
        };

        let mut changed = false;
        if let Some(read) = patch.read {
            if record.read != read {
                record.read = read;
                changed = true;
            }
        }

        if changed {
            let updated = record.clone();
            inner.fan_out(user, FeedEvent::Delta(Delta::modified(updated)));
        }
        Ok(())
    }
}
