//! In-memory cursor store
//!
//! Process-wide map of freshness cursors. Used for sessions that do not need
//! cursor state to survive a restart, and throughout the tests.

use super::{CursorResult, CursorStore};
use crate::core_filter::FreshnessCursor;
use crate::core_model::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory cursor store
#[derive(Debug, Clone, Default)]
pub struct MemoryCursorStore {
    cursors: Arc<RwLock<HashMap<UserId, FreshnessCursor>>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self, user: &UserId) -> CursorResult<Option<FreshnessCursor>> {
        Ok(self.cursors.read().await.get(user).copied())
    }

    async fn store(&self, user: &UserId, cursor: FreshnessCursor) -> CursorResult<()> {
        self.cursors.write().await.insert(user.clone(), cursor);
        Ok(())
    }
}
