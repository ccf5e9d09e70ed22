/*
    notifeed-core - Real-time notification delivery subsystem

    Receives a per-user stream of notification events from a remote change
    feed, decides which events surface as interactive alerts, maintains a
    read/unread-tracked local cache, and reconciles read-state mutations back
    to the remote store.

    Layers, leaf-first:
    - core_model: records, ids, deltas
    - core_filter: alert suppression policies
    - core_cursor: persisted per-user freshness cursors
    - core_store: the cached notification set and derived unread count
    - core_feed: remote protocol, live subscriptions
    - core_readstate: optimistic read transitions
    - core_session: per-session assembly
*/

pub mod config;
pub mod core_cursor;
pub mod core_feed;
pub mod core_filter;
pub mod core_model;
pub mod core_readstate;
pub mod core_session;
pub mod core_store;
pub mod logging;
pub mod metrics;
pub mod test_utils;

#[cfg(test)]
mod tests;

// Re-export the surface most embedders need
pub use config::Config;
pub use core_cursor::{CursorStore, FileCursorStore, MemoryCursorStore};
pub use core_feed::{
    AlertSink, ChangeFeed, ChangeFeedSubscriber, ErrorSink, FeedError, FeedResult,
    InMemoryChangeFeed, Subscription,
};
pub use core_filter::{should_alert, AlertPolicy, FreshnessCursor};
pub use core_model::{
    Delta, DeltaKind, NotificationId, NotificationRecord, NotificationType, Priority,
    RecordPatch, Timestamp, UserId,
};
pub use core_readstate::ReadStateCoordinator;
pub use core_session::NotificationSession;
pub use core_store::NotificationStore;
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogLevel};
