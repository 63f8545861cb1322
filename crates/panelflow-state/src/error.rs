//! # Transition Errors
//!
//! Every rejection the validator can return. Each variant carries the data a
//! caller needs to build an operator-facing message (the permitted
//! alternatives, the role, the ordinal), and the enum is `Serialize` so the
//! payload can be handed to a UI unchanged.

use std::collections::BTreeSet;

use panelflow_core::Status;
use serde::Serialize;
use thiserror::Error;

/// Why a proposed transition was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionError {
    /// An ordinal outside the catalog. Integration error, not user-facing.
    #[error("status ordinal {ordinal} is out of range (catalog has {} statuses)", Status::COUNT)]
    OutOfRange {
        /// The rejected ordinal.
        ordinal: u8,
    },

    /// The proposed status equals the current one.
    #[error("panel is already {status}; no change requested")]
    NoOpTransition {
        /// The unchanged status.
        status: Status,
    },

    /// The graph has no edge from `from` to `to`.
    #[error("cannot move from {from} to {to}; allowed: {}", join(.allowed))]
    IllegalTransition {
        /// Current status.
        from: Status,
        /// Rejected destination.
        to: Status,
        /// Destinations the graph does declare from `from`.
        allowed: BTreeSet<Status>,
    },

    /// The role may not set this destination.
    #[error("role {role:?} may not set {to}; allowed: {}", join(.allowed))]
    UnauthorizedRole {
        /// The acting role.
        role: String,
        /// Rejected destination.
        to: Status,
        /// Destinations the role may set.
        allowed: BTreeSet<Status>,
    },

    /// The Broken at Site guard failed: the panel never reached Delivered,
    /// or it is Cancelled.
    #[error("cannot move from {from} to {to}: panel has not reached Delivered or is Cancelled")]
    PreconditionNotMet {
        /// Current status.
        from: Status,
        /// Rejected destination.
        to: Status,
    },

    /// The role has no entry in the role table.
    #[error("unknown role {role:?}")]
    UnknownRole {
        /// The unrecognised role.
        role: String,
    },
}

/// Fieldless discriminant of [`TransitionError`], for callers that only
/// branch on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionErrorKind {
    OutOfRange,
    NoOpTransition,
    IllegalTransition,
    UnauthorizedRole,
    PreconditionNotMet,
    UnknownRole,
}

impl TransitionError {
    /// The rejection reason without its payload.
    pub fn kind(&self) -> TransitionErrorKind {
        match self {
            Self::OutOfRange { .. } => TransitionErrorKind::OutOfRange,
            Self::NoOpTransition { .. } => TransitionErrorKind::NoOpTransition,
            Self::IllegalTransition { .. } => TransitionErrorKind::IllegalTransition,
            Self::UnauthorizedRole { .. } => TransitionErrorKind::UnauthorizedRole,
            Self::PreconditionNotMet { .. } => TransitionErrorKind::PreconditionNotMet,
            Self::UnknownRole { .. } => TransitionErrorKind::UnknownRole,
        }
    }
}

fn join(set: &BTreeSet<Status>) -> String {
    if set.is_empty() {
        return "none".to_string();
    }
    set.iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}
