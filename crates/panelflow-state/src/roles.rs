//! # Role Destination Table
//!
//! Maps a role identifier to the statuses that role may set as a
//! destination. Roles are opaque strings supplied by the session provider;
//! the engine does no authentication.
//!
//! A role's authority is the intersection of this table with the transition
//! graph. `Administrator` has no row: it is exempt from the destination
//! restriction and handled separately by the validator.

use panelflow_core::Status;
use panelflow_core::Status as S;

/// Role exempt from the destination table.
pub const ADMINISTRATOR: &str = "Administrator";

/// Role allowed to declare a panel Broken at Site.
pub const STORE_SITE: &str = "Store Site";

/// Destination statuses per role.
pub const ROLE_TABLE: &[(&str, &[Status])] = &[
    (
        "Planning Engineer",
        &[S::IssuedForProduction, S::Produced, S::OnHold],
    ),
    ("Production", &[S::Produced, S::ProceedForDelivery]),
    ("Logistics", &[S::ProceedForDelivery, S::Delivered]),
    (STORE_SITE, &[S::Delivered, S::BrokenAtSite]),
    (
        "QC Site",
        &[
            S::ApprovedMaterial,
            S::RejectedMaterial,
            S::Inspected,
            S::ApprovedFinal,
        ],
    ),
    ("Site Engineer", &[S::Installed, S::OnHold]),
    (
        "Project Manager",
        &[S::IssuedForProduction, S::OnHold, S::Cancelled],
    ),
];

/// Destinations a role may set, or `None` for a role with no table row.
pub fn destinations(role: &str) -> Option<&'static [Status]> {
    ROLE_TABLE
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, allowed)| *allowed)
}

/// Whether the role is exempt from the destination table.
pub fn is_administrator(role: &str) -> bool {
    role == ADMINISTRATOR
}
