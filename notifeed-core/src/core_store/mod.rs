/*
    core_store - Cached notification set

    Single source of truth for UI consumers: the current notification set for
    one session, keyed by record id, plus the derived unread count.

    Ownership: the store exclusively owns the in-memory set. The change-feed
    subscriber and the read-state coordinator only propose mutations through
    apply_delta / mark_read; neither keeps a copy.

    The unread count is always computed from the set, never maintained as a
    separate counter, so count and set cannot diverge.
*/

use crate::core_model::{Delta, DeltaKind, NotificationId, NotificationRecord, Timestamp};
use std::collections::HashMap;
use tracing::trace;

/// Process-local cache of a user's notification set
#[derive(Debug, Default)]
pub struct NotificationStore {
    records: HashMap<NotificationId, NotificationRecord>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one change-feed delta. Returns true when the cached set changed.
    ///
    /// - `added`: insert if absent; a duplicate id is a no-op, so the initial
    ///   fetch and a live replay of the same record cannot double-insert.
    /// - `modified`: replace the record's fields by id; no-op if absent.
    /// - `removed`: delete by id.
    pub fn apply_delta(&mut self, delta: &Delta) -> bool {
        match delta.kind {
            DeltaKind::Added => {
                if self.records.contains_key(&delta.record.id) {
                    trace!(id = %delta.record.id, "duplicate added delta ignored");
                    return false;
                }
                self.records
                    .insert(delta.record.id.clone(), delta.record.clone());
                true
            }
            DeltaKind::Modified => {
                if !self.records.contains_key(&delta.record.id) {
                    trace!(id = %delta.record.id, "modified delta for unknown record ignored");
                    return false;
                }
                self.records
                    .insert(delta.record.id.clone(), delta.record.clone());
                true
            }
            DeltaKind::Removed => self.records.remove(&delta.record.id).is_some(),
        }
    }

    /// All cached records, created_at descending; records still waiting for a
    /// server timestamp sort last
    pub fn get_all(&self) -> Vec<NotificationRecord> {
        let mut records: Vec<NotificationRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    /// Derived unread count
    pub fn unread_count(&self) -> usize {
        self.records.values().filter(|r| !r.read).count()
    }

    /// Look up one record by id
    pub fn get(&self, id: &NotificationId) -> Option<&NotificationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flip a record to read. Returns true only when the record existed and
    /// was unread; marking an already-read or unknown record is a no-op.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        match self.records.get_mut(id) {
            Some(record) if !record.read => {
                record.read = true;
                true
            }
            _ => false,
        }
    }

    /// Flip every unread record to read, returning the ids that changed
    pub fn mark_all_read(&mut self) -> Vec<NotificationId> {
        let mut flipped = Vec::new();
        for record in self.records.values_mut() {
            if !record.read {
                record.read = true;
                flipped.push(record.id.clone());
            }
        }
        flipped
    }

    /// Drop records whose expiry has passed, returning how many were removed
    pub fn purge_expired(&mut self, now: Timestamp) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        before - self.records.len()
    }
}
