//! Change-feed subscriber
//!
//! Establishes a live subscription for one user: seeds the cache with a
//! bounded initial fetch, captures and advances the freshness cursor, then
//! pumps live deltas into the store. Fresh `added` records are handed to the
//! alert sink; the delivery filter decides freshness, so replayed bursts on
//! (re)connect never re-alert old notifications.
//!
//! Failure semantics: a stream error is reported once to the error sink and
//! the subscription goes inactive. No automatic retry happens here; the
//! transport layer owns retry policy and a fresh subscribe call resumes.

use super::errors::{FeedError, FeedResult};
use super::feed::{ChangeFeed, DeltaStream, FeedEvent};
use super::subscription::Subscription;
use crate::config::Config;
use crate::core_cursor::CursorStore;
use crate::core_filter::{should_alert, AlertPolicy, FreshnessCursor};
use crate::core_model::{Delta, DeltaKind, NotificationRecord, Timestamp, UserId};
use crate::core_store::NotificationStore;
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Callback invoked once per record that passes the delivery filter
pub type AlertSink = Arc<dyn Fn(&NotificationRecord) + Send + Sync>;

/// Callback invoked once when the live stream fails terminally
pub type ErrorSink = Arc<dyn Fn(&FeedError) + Send + Sync>;

/// Opens and tears down live subscriptions over the remote change feed
pub struct ChangeFeedSubscriber {
    feed: Arc<dyn ChangeFeed>,
    store: Arc<RwLock<NotificationStore>>,
    cursors: Arc<dyn CursorStore>,
    config: Config,
}

impl ChangeFeedSubscriber {
    pub fn new(
        feed: Arc<dyn ChangeFeed>,
        store: Arc<RwLock<NotificationStore>>,
        cursors: Arc<dyn CursorStore>,
        config: Config,
    ) -> Self {
        ChangeFeedSubscriber {
            feed,
            store,
            cursors,
            config,
        }
    }

    /// Subscribe to a user's notification stream.
    ///
    /// The initial fetch is awaited before this returns; an initial-fetch
    /// error propagates to the caller and no subscription is established.
    pub async fn subscribe(
        &self,
        user: &UserId,
        on_alert: AlertSink,
        on_error: ErrorSink,
    ) -> FeedResult<Subscription> {
        // Bounded initial fetch seeds the cache synchronously; cache
        // population only, never alerts.
        let initial = self
            .feed
            .fetch_recent(user, self.config.feed.initial_fetch_limit)
            .await?;
        let seeded = initial.len();
        {
            let mut store = self.store.write().await;
            for record in initial {
                store.apply_delta(&Delta::added(record));
            }
            gauge!("notify.unread").set(store.unread_count() as f64);
        }
        debug!(user = %user, seeded, "initial fetch complete");

        let cursor = match self.cursors.load(user).await {
            Ok(Some(cursor)) => cursor,
            Ok(None) => FreshnessCursor::epoch(),
            Err(error) => {
                warn!(user = %user, error = %error, "cursor load failed, treating as first subscribe");
                FreshnessCursor::epoch()
            }
        };

        let stream = self.feed.stream(user).await?;

        // Advance the cursor only once the stream is attached: a subscribe
        // attempt that fails here must leave the previous session's cursor in
        // place, or records created in between would never alert. A session
        // that stays open observes only genuinely new records from here on.
        if let Err(error) = self
            .cursors
            .store(user, FreshnessCursor::new(Timestamp::now()))
            .await
        {
            warn!(user = %user, error = %error, "cursor advance failed");
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let active = Arc::new(AtomicBool::new(true));
        let pump = tokio::spawn(pump_deltas(
            stream,
            self.store.clone(),
            cursor,
            self.config.alerts.policy.clone(),
            on_alert,
            on_error,
            cancelled.clone(),
            active.clone(),
        ));

        info!(user = %user, "subscription established");
        Ok(Subscription::new(cancelled, active, pump))
    }
}

/// Apply live deltas in transport order until the stream ends, errors, or
/// the subscription is cancelled.
#[allow(clippy::too_many_arguments)]
async fn pump_deltas(
    mut stream: DeltaStream,
    store: Arc<RwLock<NotificationStore>>,
    cursor: FreshnessCursor,
    policy: AlertPolicy,
    on_alert: AlertSink,
    on_error: ErrorSink,
    cancelled: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
) {
    loop {
        let event = match stream.recv().await {
            Some(event) => event,
            None => {
                // Transport dropped the stream without an explicit error
                // event; the subscription is just as dead and the consumer
                // must hear about it exactly once.
                if !cancelled.load(Ordering::SeqCst) {
                    warn!("change-feed stream closed, subscription inactive");
                    counter!("notify.stream.errors").increment(1);
                    active.store(false, Ordering::SeqCst);
                    on_error(&FeedError::Closed);
                }
                break;
            }
        };
        // A cancelled subscription's pending events must be inert, even for
        // responses already in flight.
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        match event {
            FeedEvent::Delta(delta) => {
                let unread = {
                    let mut store = store.write().await;
                    if store.apply_delta(&delta) {
                        counter!("notify.deltas.applied").increment(1);
                    }
                    store.unread_count()
                };
                gauge!("notify.unread").set(unread as f64);

                if delta.kind == DeltaKind::Added {
                    if should_alert(&delta, &cursor, Timestamp::now(), &policy) {
                        counter!("notify.alerts.emitted").increment(1);
                        on_alert(&delta.record);
                    } else {
                        counter!("notify.alerts.suppressed").increment(1);
                    }
                }
            }
            FeedEvent::Error(error) => {
                warn!(error = %error, "change-feed stream failed, subscription inactive");
                counter!("notify.stream.errors").increment(1);
                active.store(false, Ordering::SeqCst);
                on_error(&error);
                break;
            }
        }
    }
    active.store(false, Ordering::SeqCst);
}
