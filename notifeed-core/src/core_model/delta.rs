/*
    delta.rs - Change-feed deltas and point-write patches

    A delta is one change-feed event carrying a full record. The remote
    protocol also accepts partial point-writes (RecordPatch); this core only
    ever writes the read flag, but the patch shape leaves room for more.
*/

use super::record::NotificationRecord;
use serde::{Deserialize, Serialize};

/// Kind of change observed on the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    Added,
    Modified,
    Removed,
}

/// One change-feed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub kind: DeltaKind,
    pub record: NotificationRecord,
}

impl Delta {
    pub fn added(record: NotificationRecord) -> Self {
        Delta {
            kind: DeltaKind::Added,
            record,
        }
    }

    pub fn modified(record: NotificationRecord) -> Self {
        Delta {
            kind: DeltaKind::Modified,
            record,
        }
    }

    pub fn removed(record: NotificationRecord) -> Self {
        Delta {
            kind: DeltaKind::Removed,
            record,
        }
    }
}

/// Partial field update for the remote point-write primitive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    /// New value for the read flag, if it should change
    pub read: Option<bool>,
}

impl RecordPatch {
    /// Patch that acknowledges a notification as read
    pub fn mark_read() -> Self {
        RecordPatch { read: Some(true) }
    }
}
