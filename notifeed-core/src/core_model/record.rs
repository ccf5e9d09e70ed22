/*
    record.rs - Notification record model

    The unit of state for the subsystem. Records are created by the remote
    store and observed here via change-feed deltas; the only locally-originated
    mutation is the read flag, which transitions false -> true and never back.

    created_at is optional because a record written in the current session may
    not have had its server timestamp assigned yet; such records are cached but
    never alerted on until the timestamp round-trips.
*/

use super::types::{NotificationId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Category of a notification, fixed by the remote store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Announcement,
    Ctf,
    Wargame,
    Community,
    Verification,
    System,
    Achievement,
    LevelUp,
    TierUp,
    AdminAction,
    Info,
    Success,
    Warning,
    Error,
}

impl Default for NotificationType {
    fn default() -> Self {
        NotificationType::Info
    }
}

/// Relative urgency, assigned by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A single notification as observed from the remote change feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Opaque unique id, assigned by the remote store
    pub id: NotificationId,

    /// User this notification belongs to
    pub user_id: UserId,

    /// Short headline shown in the alert surface
    pub title: String,

    /// Body text
    pub message: String,

    /// Category
    pub kind: NotificationType,

    /// Whether the user has read this notification
    pub read: bool,

    /// Server-assigned creation time; None while the write has not round-tripped
    pub created_at: Option<Timestamp>,

    /// Optional navigable target for the alert
    pub link: Option<String>,

    /// Optional expiry after which the record is purged locally
    pub expires_at: Option<Timestamp>,

    /// Optional urgency hint
    pub priority: Option<Priority>,
}

impl NotificationRecord {
    /// Create an unread record with a server timestamp
    pub fn new(
        id: NotificationId,
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationType,
        created_at: Timestamp,
    ) -> Self {
        NotificationRecord {
            id,
            user_id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: Some(created_at),
            link: None,
            expires_at: None,
            priority: None,
        }
    }

    /// Attach a navigable link
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attach an expiry
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Attach a priority hint
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether this record's expiry has passed at `now`
    pub fn is_expired(&self, now: Timestamp) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}
