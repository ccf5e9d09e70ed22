//! File-backed cursor store
//!
//! Persists cursors across sessions as a single JSON file mapping user id to
//! cursor. The whole map is rewritten on every store; cursor writes happen
//! once per subscription, so the simple scheme is fine.

use super::{CursorError, CursorResult, CursorStore};
use crate::core_filter::FreshnessCursor;
use crate::core_model::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

const CURSOR_FILE: &str = "cursors.json";

/// File-backed cursor store
pub struct FileCursorStore {
    path: PathBuf,
    cursors: Arc<RwLock<HashMap<String, FreshnessCursor>>>,
}

impl FileCursorStore {
    /// Open (or create) a cursor store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> CursorResult<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(CURSOR_FILE);

        let cursors = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)
                .map_err(|e| CursorError::Serialization(e.to_string()))?
        } else {
            HashMap::new()
        };

        Ok(FileCursorStore {
            path,
            cursors: Arc::new(RwLock::new(cursors)),
        })
    }

    async fn flush(&self, cursors: &HashMap<String, FreshnessCursor>) -> CursorResult<()> {
        let data = serde_json::to_vec_pretty(cursors)
            .map_err(|e| CursorError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn load(&self, user: &UserId) -> CursorResult<Option<FreshnessCursor>> {
        Ok(self.cursors.read().await.get(&user.0).copied())
    }

    async fn store(&self, user: &UserId, cursor: FreshnessCursor) -> CursorResult<()> {
        let mut cursors = self.cursors.write().await;
        cursors.insert(user.0.clone(), cursor);
        self.flush(&cursors).await
    }
}
