//! Cursor store module
//!
//! Persistence for the per-user freshness cursor. The cursor is read at
//! subscription start and advanced to "now" immediately afterwards, so a
//! session that stays open observes only genuinely new records.

use crate::core_filter::FreshnessCursor;
use crate::core_model::UserId;
use async_trait::async_trait;
use thiserror::Error;

pub mod file_cursors;
pub mod memory_cursors;

pub use file_cursors::FileCursorStore;
pub use memory_cursors::MemoryCursorStore;

/// Cursor store errors
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for cursor store operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Abstract key-value store of freshness cursors, keyed by user id
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Load the cursor for a user; None when the user has never subscribed
    async fn load(&self, user: &UserId) -> CursorResult<Option<FreshnessCursor>>;

    /// Persist the cursor for a user
    async fn store(&self, user: &UserId, cursor: FreshnessCursor) -> CursorResult<()>;
}
