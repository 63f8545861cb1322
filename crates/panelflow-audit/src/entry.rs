//! # Status History Entries
//!
//! The audit record written for every committed status change.
//!
//! Entries are append-mostly. The one permitted mutation is reconciliation,
//! which overwrites `timestamp` on the most recent entry for a
//! `(panel, status)` pair. Entries are never deleted.

use panelflow_core::{HistoryEntryId, PanelId, Status, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Optional free-text and image attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Free-text note entered by the operator.
    pub note: Option<String>,
    /// Reference to an uploaded image (storage key or URL).
    pub image_ref: Option<String>,
}

impl Annotation {
    /// An annotation carrying only a note.
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            image_ref: None,
        }
    }
}

/// A persisted status history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Store-assigned insertion number, strictly increasing. All "most
    /// recent" decisions use this, never `timestamp`.
    pub sequence: i64,
    /// The panel whose status changed.
    pub panel: PanelId,
    /// The status entered.
    pub status: Status,
    /// When the status was entered. May be a reconciled business date.
    pub timestamp: Timestamp,
    /// The acting user.
    pub user: UserId,
    /// Optional note.
    pub note: Option<String>,
    /// Optional image reference.
    pub image_ref: Option<String>,
}

/// An entry before the store has assigned `id` and `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub panel: PanelId,
    pub status: Status,
    pub timestamp: Timestamp,
    pub user: UserId,
    pub annotation: Annotation,
}

impl NewHistoryEntry {
    /// Finish the entry with the identity assigned by a store.
    pub fn into_entry(self, id: HistoryEntryId, sequence: i64) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id,
            sequence,
            panel: self.panel,
            status: self.status,
            timestamp: self.timestamp,
            user: self.user,
            note: self.annotation.note,
            image_ref: self.annotation.image_ref,
        }
    }
}
