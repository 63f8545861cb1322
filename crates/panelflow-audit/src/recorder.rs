//! # Audit Trail Recorder
//!
//! Appends or reconciles status history entries once a transition has been
//! committed. The recorder does not re-validate: it is only told *that* a
//! transition happened.
//!
//! ## Reconciliation
//!
//! When a business date is edited after the fact (the date a panel was
//! really issued for production, say), the timeline should show that date
//! without gaining a duplicate row. [`AuditRecorder::reconcile_latest_timestamp`]
//! overwrites the timestamp of the most recent entry for the
//! `(panel, status)` pair, or appends one entry if the pair has none. It
//! never writes more than one row and never touches another panel or status.

use panelflow_core::{PanelId, Status, Timestamp, UserId};

use crate::entry::{Annotation, NewHistoryEntry, StatusHistoryEntry};
use crate::error::AuditError;
use crate::store::HistoryStore;

/// Writes status history through a [`HistoryStore`].
#[derive(Debug, Clone)]
pub struct AuditRecorder<H> {
    store: H,
}

impl<H: HistoryStore> AuditRecorder<H> {
    /// Create a recorder over a store.
    pub fn new(store: H) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &H {
        &self.store
    }

    /// Append one entry. `timestamp` defaults to now.
    pub async fn append_entry(
        &self,
        panel: PanelId,
        status: Status,
        user: UserId,
        timestamp: Option<Timestamp>,
        annotation: Annotation,
    ) -> Result<StatusHistoryEntry, AuditError> {
        let entry = self
            .store
            .insert(NewHistoryEntry {
                panel,
                status,
                timestamp: timestamp.unwrap_or_else(Timestamp::now),
                user,
                annotation,
            })
            .await?;
        tracing::info!(
            %panel,
            %status,
            sequence = entry.sequence,
            timestamp = %entry.timestamp,
            "status history entry appended"
        );
        Ok(entry)
    }

    /// Reflect a business timestamp on the most recent `(panel, status)`
    /// entry, appending one only if none exists.
    ///
    /// When an entry is found only its timestamp changes; `user` and
    /// `annotation` are used solely for the fallback append.
    pub async fn reconcile_latest_timestamp(
        &self,
        panel: PanelId,
        status: Status,
        user: UserId,
        business_timestamp: Timestamp,
        annotation: Annotation,
    ) -> Result<StatusHistoryEntry, AuditError> {
        if let Some(entry) = self
            .store
            .reconcile_latest(panel, status, business_timestamp)
            .await?
        {
            tracing::info!(
                %panel,
                %status,
                sequence = entry.sequence,
                timestamp = %business_timestamp,
                "status history timestamp reconciled"
            );
            return Ok(entry);
        }

        self.append_entry(panel, status, user, Some(business_timestamp), annotation)
            .await
    }

    /// The status a panel held immediately before its most recent On Hold.
    ///
    /// Ordering is by store sequence, not timestamp, so reconciled or tied
    /// timestamps cannot change the answer. Consecutive On Hold entries are
    /// skipped. `None` if the panel was never on hold or has nothing earlier.
    pub async fn previous_status_before_hold(
        &self,
        panel: PanelId,
    ) -> Result<Option<Status>, AuditError> {
        let history = self.store.history(panel).await?;
        Ok(status_before_last_hold(&history))
    }

    /// A panel's entries in insertion order.
    pub async fn history(&self, panel: PanelId) -> Result<Vec<StatusHistoryEntry>, AuditError> {
        self.store.history(panel).await
    }
}

/// `history` must be in ascending sequence order.
fn status_before_last_hold(history: &[StatusHistoryEntry]) -> Option<Status> {
    let hold = history.iter().rposition(|e| e.status == Status::OnHold)?;
    history[..hold]
        .iter()
        .rev()
        .find(|e| e.status != Status::OnHold)
        .map(|e| e.status)
}
