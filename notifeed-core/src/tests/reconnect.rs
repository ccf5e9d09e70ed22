//! Reconnect and suppression scenarios

use crate::config::Config;
use crate::core_cursor::{CursorStore, MemoryCursorStore};
use crate::core_feed::InMemoryChangeFeed;
use crate::core_filter::{AlertPolicy, FreshnessCursor};
use crate::core_model::{
    NotificationId, NotificationRecord, NotificationType, Timestamp, UserId,
};
use crate::core_session::NotificationSession;
use crate::test_utils::{wait_until, RecordingSink, DEFAULT_TEST_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

fn record(id: &str, created_at: Timestamp) -> NotificationRecord {
    NotificationRecord::new(
        NotificationId::new(id),
        UserId::new("u-1"),
        "title",
        "message",
        NotificationType::Announcement,
        created_at,
    )
}

/// Initial fetch returns A (an hour old) and B (a minute old); the live
/// stream redelivers both as added on attach. Under the age-window policy
/// only B alerts.
#[tokio::test]
async fn test_reconnect_replays_alert_only_fresh_records() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let user = UserId::new("u-1");
    let now = Timestamp::now();
    feed.push(record("a", now.minus(Duration::from_secs(3600)))).await;
    feed.push(record("b", now.minus(Duration::from_secs(60)))).await;

    let session = NotificationSession::new(
        user,
        feed.clone(),
        Arc::new(MemoryCursorStore::new()),
        Config::default(),
    );
    let alerts = RecordingSink::new();
    let sub = session
        .subscribe(alerts.sink(), Arc::new(|_| {}))
        .await
        .unwrap();

    let alerted = wait_until(DEFAULT_TEST_TIMEOUT, || {
        let alerts = alerts.clone();
        async move { alerts.count() >= 1 }
    })
    .await;
    assert!(alerted);

    // Give the replay time to finish, then check nothing else surfaced
    tokio::time::sleep(Duration::from_millis(50)).await;
    let received = alerts.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].id, NotificationId::new("b"));

    // Both records made it into the cache exactly once
    assert_eq!(session.get_all().await.len(), 2);
    sub.cancel();
}

/// Cursor-policy variant of the same scenario: a cursor from five minutes
/// ago lets a two-minute-old record alert, then marking it read drops the
/// unread count by exactly one while keeping the record cached.
#[tokio::test]
async fn test_cursor_policy_alert_then_mark_read() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let cursors = MemoryCursorStore::new();
    let user = UserId::new("u-1");
    let now = Timestamp::now();

    // Persisted cursor from an earlier session, five minutes back
    cursors
        .store(
            &user,
            FreshnessCursor::new(now.minus(Duration::from_secs(300))),
        )
        .await
        .unwrap();

    let mut config = Config::default();
    config.alerts.policy = AlertPolicy::SinceCursor;

    // C predates this subscription by two minutes and sits in the initial
    // fetch; it is past the cursor, so it alerts on the attach replay.
    feed.push(record("c", now.minus(Duration::from_secs(120)))).await;

    let session = NotificationSession::new(user, feed.clone(), Arc::new(cursors), config);
    let alerts = RecordingSink::new();
    let sub = session
        .subscribe(alerts.sink(), Arc::new(|_| {}))
        .await
        .unwrap();

    let alerted = wait_until(DEFAULT_TEST_TIMEOUT, || {
        let alerts = alerts.clone();
        async move { alerts.count() == 1 }
    })
    .await;
    assert!(alerted);
    assert_eq!(alerts.received()[0].id, NotificationId::new("c"));

    let before = session.unread_count().await;
    session.mark_as_read(&NotificationId::new("c")).await;
    assert_eq!(session.unread_count().await, before - 1);

    let all = session.get_all().await;
    let c = all
        .iter()
        .find(|r| r.id == NotificationId::new("c"))
        .expect("c stays cached after being read");
    assert!(c.read);
    sub.cancel();
}

/// A second subscribe call after teardown re-seeds from the remote set and
/// does not duplicate cached records.
#[tokio::test]
async fn test_resubscribe_after_cancel() {
    let feed = Arc::new(InMemoryChangeFeed::new());
    let user = UserId::new("u-1");
    feed.push(record("a", Timestamp::now().minus(Duration::from_secs(3600)))).await;

    let session = NotificationSession::new(
        user,
        feed.clone(),
        Arc::new(MemoryCursorStore::new()),
        Config::default(),
    );
    let alerts = RecordingSink::new();

    let first = session
        .subscribe(alerts.sink(), Arc::new(|_| {}))
        .await
        .unwrap();
    first.cancel();

    let second = session
        .subscribe(alerts.sink(), Arc::new(|_| {}))
        .await
        .unwrap();

    // Seeded twice, cached once
    assert_eq!(session.get_all().await.len(), 1);
    assert_eq!(session.unread_count().await, 1);
    second.cancel();
}
