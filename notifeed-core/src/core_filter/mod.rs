/*
    core_filter - Alert delivery filter

    Decides whether a change-feed delta should surface as an interactive
    alert. Pure functions of their inputs so they are independently testable;
    the subscriber never bakes suppression rules in directly.

    Two policies exist behind the same interface:
    - AgeWindow (default): suppress records older than a fixed window, which
      bounds alert storms when a transport replays the backlog on (re)connect.
    - SinceCursor: suppress records at or before the per-user freshness
      cursor captured when the subscription was established.
*/

use crate::core_model::{Delta, DeltaKind, Timestamp};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default age window: records older than this never alert
pub const DEFAULT_ALERT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Per-user boundary before which notifications are stale for alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessCursor {
    /// Captured at subscription start, persisted across sessions
    pub last_checked: Timestamp,
}

impl FreshnessCursor {
    pub fn new(last_checked: Timestamp) -> Self {
        FreshnessCursor { last_checked }
    }

    /// Cursor at the epoch: everything with a timestamp is past it
    pub fn epoch() -> Self {
        FreshnessCursor {
            last_checked: Timestamp::from_millis(0),
        }
    }
}

impl Default for FreshnessCursor {
    fn default() -> Self {
        FreshnessCursor::epoch()
    }
}

/// Suppression policy evaluated for `added` deltas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AlertPolicy {
    /// Suppress when the record is older than the window at delivery time
    AgeWindow {
        #[serde(with = "humantime_serde")]
        window: Duration,
    },
    /// Suppress when created_at is at or before the freshness cursor
    SinceCursor,
}

impl AlertPolicy {
    pub fn age_window(window: Duration) -> Self {
        AlertPolicy::AgeWindow { window }
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        AlertPolicy::AgeWindow {
            window: DEFAULT_ALERT_WINDOW,
        }
    }
}

/// Decide whether a delta should surface as an interactive alert.
///
/// Only `added` deltas can alert. Records without a server-assigned
/// created_at are suppressed unconditionally: a write that has not
/// round-tripped yet is not actionable.
pub fn should_alert(
    delta: &Delta,
    cursor: &FreshnessCursor,
    now: Timestamp,
    policy: &AlertPolicy,
) -> bool {
    if delta.kind != DeltaKind::Added {
        return false;
    }
    let created_at = match delta.record.created_at {
        Some(ts) => ts,
        None => return false,
    };
    match policy {
        AlertPolicy::AgeWindow { window } => now.elapsed_since(created_at) <= *window,
        AlertPolicy::SinceCursor => created_at > cursor.last_checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_model::{
        NotificationId, NotificationRecord, NotificationType, UserId,
    };

    fn record_at(created_at: Option<Timestamp>) -> NotificationRecord {
        let mut record = NotificationRecord::new(
            NotificationId::generate(),
            UserId::new("u-1"),
            "Announcement",
            "Maintenance window tonight",
            NotificationType::Announcement,
            Timestamp::from_millis(0),
        );
        record.created_at = created_at;
        record
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(3_600_000) // one hour past the epoch
    }

    #[test]
    fn test_modified_and_removed_never_alert() {
        let policy = AlertPolicy::default();
        let cursor = FreshnessCursor::epoch();
        let fresh = record_at(Some(now()));
        assert!(!should_alert(
            &Delta::modified(fresh.clone()),
            &cursor,
            now(),
            &policy
        ));
        assert!(!should_alert(&Delta::removed(fresh), &cursor, now(), &policy));
    }

    #[test]
    fn test_missing_created_at_suppresses() {
        let policy = AlertPolicy::default();
        let cursor = FreshnessCursor::epoch();
        let pending = record_at(None);
        assert!(!should_alert(&Delta::added(pending), &cursor, now(), &policy));
    }

    #[test]
    fn test_age_window_boundary() {
        let policy = AlertPolicy::age_window(Duration::from_secs(600));
        let cursor = FreshnessCursor::epoch();

        // One hour old: suppressed
        let old = record_at(Some(now().minus(Duration::from_secs(3600))));
        assert!(!should_alert(&Delta::added(old), &cursor, now(), &policy));

        // One minute old: alerts
        let fresh = record_at(Some(now().minus(Duration::from_secs(60))));
        assert!(should_alert(&Delta::added(fresh), &cursor, now(), &policy));

        // Exactly at the window still alerts; one millisecond past does not
        let edge = record_at(Some(now().minus(Duration::from_secs(600))));
        assert!(should_alert(&Delta::added(edge), &cursor, now(), &policy));
        let past = record_at(Some(
            now().minus(Duration::from_secs(600) + Duration::from_millis(1)),
        ));
        assert!(!should_alert(&Delta::added(past), &cursor, now(), &policy));
    }

    #[test]
    fn test_future_created_at_alerts_under_age_window() {
        // Clock skew can put created_at slightly ahead of local now
        let policy = AlertPolicy::default();
        let cursor = FreshnessCursor::epoch();
        let skewed = record_at(Some(Timestamp::from_millis(
            now().as_millis() + 5_000,
        )));
        assert!(should_alert(&Delta::added(skewed), &cursor, now(), &policy));
    }

    #[test]
    fn test_cursor_policy() {
        let policy = AlertPolicy::SinceCursor;
        let cursor = FreshnessCursor::new(now().minus(Duration::from_secs(300)));

        // Two minutes old: past the cursor, alerts
        let fresh = record_at(Some(now().minus(Duration::from_secs(120))));
        assert!(should_alert(&Delta::added(fresh), &cursor, now(), &policy));

        // Ten minutes old: before the cursor, suppressed
        let old = record_at(Some(now().minus(Duration::from_secs(600))));
        assert!(!should_alert(&Delta::added(old), &cursor, now(), &policy));

        // Exactly at the cursor: suppressed
        let at = record_at(Some(cursor.last_checked));
        assert!(!should_alert(&Delta::added(at), &cursor, now(), &policy));
    }

    #[test]
    fn test_epoch_cursor_lets_everything_through() {
        let policy = AlertPolicy::SinceCursor;
        let cursor = FreshnessCursor::epoch();
        let old = record_at(Some(Timestamp::from_millis(1)));
        assert!(should_alert(&Delta::added(old), &cursor, now(), &policy));
    }
}
