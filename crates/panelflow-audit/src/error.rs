//! # Error Types
//!
//! Failures of the history store, the panel store, and the sequencing that
//! ties them to the validator.

use panelflow_core::{CatalogError, HistoryEntryId, PanelId};
use panelflow_state::TransitionError;
use thiserror::Error;

/// A history store failure. Callers treat every variant as a persistence
/// failure; nothing here is retried internally.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A timestamp update named an entry the store does not hold.
    #[error("history entry {id} not found")]
    EntryNotFound {
        /// The missing entry.
        id: HistoryEntryId,
    },

    /// A stored row could not be mapped back onto the catalog.
    #[error("stored history row is invalid: {0}")]
    InvalidRow(#[from] CatalogError),

    /// The database rejected or failed the operation.
    #[error("history store failure: {0}")]
    Database(#[from] sqlx::Error),
}

/// A panel store failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// The panel is unknown to the store.
    #[error("{panel} not found")]
    NotFound {
        /// The missing panel.
        panel: PanelId,
    },

    /// The panel's status changed between the read and the write.
    #[error("{panel} status changed concurrently: expected ordinal {expected}, found {actual}")]
    Conflict {
        /// The contended panel.
        panel: PanelId,
        /// Ordinal the write was validated against.
        expected: u8,
        /// Ordinal found at write time.
        actual: u8,
    },

    /// The store could not complete the read or write.
    #[error("panel store unavailable: {0}")]
    Unavailable(String),
}

/// Why committing a status change for one panel failed.
///
/// A `Rejected` commit wrote nothing. A `Panel` failure on the write wrote
/// nothing either; `PanelError::Conflict` means another commit moved the
/// panel first. An `Audit` failure happens after the new status was
/// persisted, so the panel has moved without a history entry.
#[derive(Error, Debug)]
pub enum CommitError {
    /// The validator rejected the transition.
    #[error("transition rejected: {0}")]
    Rejected(#[from] TransitionError),

    /// Reading or writing the panel failed.
    #[error(transparent)]
    Panel(#[from] PanelError),

    /// Writing the history entry failed.
    #[error(transparent)]
    Audit(#[from] AuditError),
}
