/*
    core_model - Data model for the notification subsystem

    The inert types every other module operates on:
    - Ids and timestamps
    - NotificationRecord (the unit of state)
    - Change-feed deltas and point-write patches
*/

pub mod delta;
pub mod record;
pub mod types;

pub use delta::{Delta, DeltaKind, RecordPatch};
pub use record::{NotificationRecord, NotificationType, Priority};
pub use types::{NotificationId, Timestamp, UserId};
