//! # History Store
//!
//! The persistence boundary of the audit trail. A store needs to insert an
//! entry, find the most recent entry for a `(panel, status)` pair, update an
//! entry's timestamp by id, and list a panel's entries in insertion order.
//!
//! [`HistoryStore::reconcile_latest`] combines "find most recent" and
//! "update timestamp" into one operation that implementations must run in a
//! single consistent read-then-write scope, so a concurrent append cannot
//! make it touch the wrong row.
//!
//! [`InMemoryHistoryStore`] keeps entries in process memory. The Postgres
//! implementation lives in [`crate::db`].

use std::sync::Arc;

use panelflow_core::{HistoryEntryId, PanelId, Status, Timestamp};
use parking_lot::RwLock;

use crate::entry::{NewHistoryEntry, StatusHistoryEntry};
use crate::error::AuditError;

/// Persistence operations required by the audit trail.
#[allow(async_fn_in_trait)]
pub trait HistoryStore: Send + Sync {
    /// Insert an entry, assigning its id and the next sequence number.
    async fn insert(&self, entry: NewHistoryEntry) -> Result<StatusHistoryEntry, AuditError>;

    /// The entry with the highest sequence for `(panel, status)`.
    async fn find_latest(
        &self,
        panel: PanelId,
        status: Status,
    ) -> Result<Option<StatusHistoryEntry>, AuditError>;

    /// Overwrite the timestamp of one entry.
    async fn update_timestamp(
        &self,
        id: HistoryEntryId,
        timestamp: Timestamp,
    ) -> Result<StatusHistoryEntry, AuditError>;

    /// Overwrite the timestamp of the most recent entry for
    /// `(panel, status)`, atomically with finding it. `None` when the pair
    /// has no entries.
    async fn reconcile_latest(
        &self,
        panel: PanelId,
        status: Status,
        timestamp: Timestamp,
    ) -> Result<Option<StatusHistoryEntry>, AuditError>;

    /// All entries for a panel, ordered by sequence.
    async fn history(&self, panel: PanelId) -> Result<Vec<StatusHistoryEntry>, AuditError>;
}

// ─── In-memory store ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Ledger {
    entries: Vec<StatusHistoryEntry>,
    last_sequence: i64,
}

/// Thread-safe, cloneable in-memory history store.
///
/// Entries are kept in insertion order, so sequence order and vector order
/// agree. The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    ledger: Arc<RwLock<Ledger>>,
}

impl InMemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all panels.
    pub fn len(&self) -> usize {
        self.ledger.read().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for InMemoryHistoryStore {
    async fn insert(&self, entry: NewHistoryEntry) -> Result<StatusHistoryEntry, AuditError> {
        let mut ledger = self.ledger.write();
        ledger.last_sequence += 1;
        let stored = entry.into_entry(HistoryEntryId::new(), ledger.last_sequence);
        ledger.entries.push(stored.clone());
        Ok(stored)
    }

    async fn find_latest(
        &self,
        panel: PanelId,
        status: Status,
    ) -> Result<Option<StatusHistoryEntry>, AuditError> {
        Ok(self
            .ledger
            .read()
            .entries
            .iter()
            .rev()
            .find(|e| e.panel == panel && e.status == status)
            .cloned())
    }

    async fn update_timestamp(
        &self,
        id: HistoryEntryId,
        timestamp: Timestamp,
    ) -> Result<StatusHistoryEntry, AuditError> {
        let mut ledger = self.ledger.write();
        let entry = ledger
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(AuditError::EntryNotFound { id })?;
        entry.timestamp = timestamp;
        Ok(entry.clone())
    }

    async fn reconcile_latest(
        &self,
        panel: PanelId,
        status: Status,
        timestamp: Timestamp,
    ) -> Result<Option<StatusHistoryEntry>, AuditError> {
        let mut ledger = self.ledger.write();
        Ok(ledger
            .entries
            .iter_mut()
            .rev()
            .find(|e| e.panel == panel && e.status == status)
            .map(|entry| {
                entry.timestamp = timestamp;
                entry.clone()
            }))
    }

    async fn history(&self, panel: PanelId) -> Result<Vec<StatusHistoryEntry>, AuditError> {
        Ok(self
            .ledger
            .read()
            .entries
            .iter()
            .filter(|e| e.panel == panel)
            .cloned()
            .collect())
    }
}
