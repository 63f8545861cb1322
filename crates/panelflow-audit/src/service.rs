//! # Lifecycle Service
//!
//! Sequences the validator, the panel store, and the audit trail for a
//! committed status change:
//!
//! ```text
//! read current ──▶ validate for role ──▶ persist status ──▶ append history
//!                        │                    │
//!                        │                    └── status moved since the read:
//!                        │                        conflict, nothing is written
//!                        └── rejected: nothing is written
//! ```
//!
//! When the panel is On Hold, the status it held before the hold is read
//! from the audit trail and passed to the validator, for every role.
//!
//! ## Bulk updates
//!
//! [`LifecycleService::bulk_transition`] runs that triple for each selected
//! panel independently. A failure on one panel does not roll back any other;
//! the returned [`BulkReport`] tells the operator which panels moved. There
//! is no lock across panels. A cancellation flag stops new triples from
//! starting, and panels already committed stay committed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use panelflow_core::{PanelId, Status, Timestamp, UserId};
use panelflow_state::{next_statuses_for_role, validate_transition_with_history};

use crate::entry::{Annotation, StatusHistoryEntry};
use crate::error::{AuditError, CommitError};
use crate::panel::PanelRepository;
use crate::recorder::AuditRecorder;
use crate::store::HistoryStore;

/// Who is acting. Supplied by the caller's session layer for every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The acting user, recorded on history entries.
    pub user: UserId,
    /// The acting role, checked against the role table.
    pub role: String,
}

impl Actor {
    pub fn new(user: UserId, role: impl Into<String>) -> Self {
        Self {
            user,
            role: role.into(),
        }
    }
}

/// Outcome of a bulk status change.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Panels whose status and history entry were both written.
    pub succeeded: Vec<PanelId>,
    /// Panels that failed, with the reason.
    pub failed: Vec<(PanelId, CommitError)>,
    /// Panels not attempted because the batch was cancelled.
    pub skipped: Vec<PanelId>,
}

impl BulkReport {
    /// Number of panels that moved.
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of panels that failed.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every selected panel moved.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

/// Commits panel status changes and their audit entries.
#[derive(Debug, Clone)]
pub struct LifecycleService<P, H> {
    panels: P,
    recorder: AuditRecorder<H>,
}

impl<P: PanelRepository, H: HistoryStore> LifecycleService<P, H> {
    pub fn new(panels: P, history: H) -> Self {
        Self {
            panels,
            recorder: AuditRecorder::new(history),
        }
    }

    /// The panel store.
    pub fn panels(&self) -> &P {
        &self.panels
    }

    /// The audit trail recorder.
    pub fn recorder(&self) -> &AuditRecorder<H> {
        &self.recorder
    }

    /// Validate, persist, and audit one status change.
    pub async fn transition_panel(
        &self,
        panel: PanelId,
        next: Status,
        actor: &Actor,
        annotation: Annotation,
    ) -> Result<StatusHistoryEntry, CommitError> {
        let current = self.panels.current_status(panel).await?;
        let previous = self.status_before_hold(panel, current).await?;
        validate_transition_with_history(current, next.ordinal(), &actor.role, previous)?;

        self.panels.set_status(panel, current, next).await?;

        let entry = self
            .recorder
            .append_entry(panel, next, actor.user, None, annotation)
            .await
            .map_err(|e| {
                tracing::error!(
                    %panel,
                    status = %next,
                    error = %e,
                    "panel status persisted but history entry failed"
                );
                e
            })?;

        tracing::info!(%panel, from = current, to = %next, role = %actor.role, "panel status changed");
        Ok(entry)
    }

    /// Apply the same status change to many panels, each independently.
    ///
    /// `cancel` is checked before each panel; once set, the remaining panels
    /// are reported as skipped.
    pub async fn bulk_transition(
        &self,
        panels: &[PanelId],
        next: Status,
        actor: &Actor,
        annotation: &Annotation,
        cancel: Option<&AtomicBool>,
    ) -> BulkReport {
        let mut report = BulkReport::default();

        for (i, &panel) in panels.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                report.skipped.extend_from_slice(&panels[i..]);
                tracing::warn!(skipped = report.skipped.len(), "bulk status change cancelled");
                break;
            }

            match self
                .transition_panel(panel, next, actor, annotation.clone())
                .await
            {
                Ok(_) => report.succeeded.push(panel),
                Err(err) => {
                    tracing::warn!(%panel, status = %next, error = %err, "bulk item failed");
                    report.failed.push((panel, err));
                }
            }
        }

        tracing::info!(
            status = %next,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            skipped = report.skipped.len(),
            "bulk status change finished"
        );
        report
    }

    /// Destinations the role may choose for this panel right now.
    ///
    /// For an On Hold panel, the status held before the hold is resolved
    /// from the audit trail.
    pub async fn allowed_next_statuses(
        &self,
        panel: PanelId,
        role: &str,
    ) -> Result<BTreeSet<Status>, CommitError> {
        let current = self.panels.current_status(panel).await?;
        let previous = self.status_before_hold(panel, current).await?;
        Ok(next_statuses_for_role(current, role, previous)?)
    }

    async fn status_before_hold(
        &self,
        panel: PanelId,
        current: u8,
    ) -> Result<Option<Status>, AuditError> {
        if current != Status::OnHold.ordinal() {
            return Ok(None);
        }
        self.recorder.previous_status_before_hold(panel).await
    }

    /// Record an after-the-fact business date for a status the panel has
    /// already entered, without duplicating its history entry.
    pub async fn reconcile_business_date(
        &self,
        panel: PanelId,
        status: Status,
        actor: &Actor,
        business_timestamp: Timestamp,
        annotation: Annotation,
    ) -> Result<StatusHistoryEntry, AuditError> {
        self.recorder
            .reconcile_latest_timestamp(panel, status, actor.user, business_timestamp, annotation)
            .await
    }
}
