//! # Transition Graph
//!
//! The directed graph of declared status transitions, kept as a constant
//! table indexed by ordinal. It is the single source of truth for legality;
//! role permissions narrow it but never widen it.
//!
//! ```text
//! IssuedForProduction ──▶ Produced ──▶ ProceedForDelivery ──▶ Delivered
//!         ▲                                                      │
//!         │                                   ┌──────────────────┤
//!         │                                   ▼                  ▼
//!   BrokenAtSite ──▶ Delivered       ApprovedMaterial ◀──▶ RejectedMaterial
//!                                             │
//!                                             ▼
//!                                 Installed ──▶ Inspected ──▶ ApprovedFinal
//! ```
//!
//! On Hold and Cancelled are edge targets from every non-terminal status;
//! Broken at Site is an edge target from Delivered onwards. On Hold declares
//! no ordinary edges: a held panel resumes only to the status it held before
//! the hold, which the validator takes from the audit trail.

use panelflow_core::Status;
use panelflow_core::Status as S;

/// Declared edges, one row per status in ordinal order.
pub const TRANSITION_GRAPH: [(Status, &[Status]); Status::COUNT as usize] = [
    (S::IssuedForProduction, &[S::Produced, S::OnHold, S::Cancelled]),
    (S::Produced, &[S::ProceedForDelivery, S::OnHold, S::Cancelled]),
    (S::ProceedForDelivery, &[S::Delivered, S::OnHold, S::Cancelled]),
    (
        S::Delivered,
        &[
            S::ApprovedMaterial,
            S::RejectedMaterial,
            S::OnHold,
            S::Cancelled,
            S::BrokenAtSite,
        ],
    ),
    (
        S::ApprovedMaterial,
        &[
            S::RejectedMaterial,
            S::Installed,
            S::OnHold,
            S::Cancelled,
            S::BrokenAtSite,
        ],
    ),
    (
        S::RejectedMaterial,
        &[S::ApprovedMaterial, S::OnHold, S::Cancelled, S::BrokenAtSite],
    ),
    (
        S::Installed,
        &[S::Inspected, S::OnHold, S::Cancelled, S::BrokenAtSite],
    ),
    (
        S::Inspected,
        &[S::ApprovedFinal, S::OnHold, S::Cancelled, S::BrokenAtSite],
    ),
    (S::ApprovedFinal, &[]),
    (S::OnHold, &[S::Cancelled, S::BrokenAtSite]),
    (S::Cancelled, &[]),
    (
        S::BrokenAtSite,
        &[S::IssuedForProduction, S::Delivered, S::OnHold, S::Cancelled],
    ),
];

/// Statuses directly reachable from `from` through a declared edge.
pub fn edges(from: Status) -> &'static [Status] {
    TRANSITION_GRAPH[usize::from(from.ordinal())].1
}

/// Whether the graph declares the edge `from → to`.
pub fn has_edge(from: Status, to: Status) -> bool {
    edges(from).contains(&to)
}
