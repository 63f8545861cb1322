//! # Status Catalog
//!
//! The fixed, totally ordered catalog of panel lifecycle statuses.
//!
//! ```text
//!  0 Issued For Production      6 Installed
//!  1 Produced                   7 Inspected
//!  2 Proceed For Delivery       8 Approved Final       (terminal)
//!  3 Delivered                  9 On Hold              (special)
//!  4 Approved Material         10 Cancelled            (special, terminal)
//!  5 Rejected Material         11 Broken at Site       (special)
//! ```
//!
//! Ordinals are persisted by the panel store and the audit trail, so the
//! discriminants below are stable. The special and terminal flags are
//! declared per variant; the transition graph in `panelflow-state` is checked
//! against the terminal flags by its own tests.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A panel lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Status {
    /// Released to the factory for production.
    IssuedForProduction = 0,
    /// Cast and cured at the factory.
    Produced = 1,
    /// Cleared to leave the factory.
    ProceedForDelivery = 2,
    /// Received at site.
    Delivered = 3,
    /// Material inspection at site passed.
    ApprovedMaterial = 4,
    /// Material inspection at site failed.
    RejectedMaterial = 5,
    /// Fixed in place.
    Installed = 6,
    /// Installation inspected.
    Inspected = 7,
    /// Final sign-off.
    ApprovedFinal = 8,
    /// Work paused; resumes to the status held before.
    OnHold = 9,
    /// Withdrawn permanently.
    Cancelled = 10,
    /// Damaged after delivery.
    BrokenAtSite = 11,
}

impl Status {
    /// Number of statuses in the catalog.
    pub const COUNT: u8 = 12;

    /// Every status, in ordinal order.
    pub const ALL: [Status; 12] = [
        Self::IssuedForProduction,
        Self::Produced,
        Self::ProceedForDelivery,
        Self::Delivered,
        Self::ApprovedMaterial,
        Self::RejectedMaterial,
        Self::Installed,
        Self::Inspected,
        Self::ApprovedFinal,
        Self::OnHold,
        Self::Cancelled,
        Self::BrokenAtSite,
    ];

    /// The special statuses, reachable outside the declared graph.
    pub const SPECIAL: [Status; 3] = [Self::OnHold, Self::Cancelled, Self::BrokenAtSite];

    /// The persisted ordinal.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Resolve a persisted ordinal.
    pub fn from_ordinal(ordinal: u8) -> Result<Self, CatalogError> {
        Self::ALL
            .get(usize::from(ordinal))
            .copied()
            .ok_or(CatalogError::OutOfRange {
                ordinal,
                count: Self::COUNT,
            })
    }

    /// The display name, as shown to operators and stored in spreadsheets.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IssuedForProduction => "Issued For Production",
            Self::Produced => "Produced",
            Self::ProceedForDelivery => "Proceed For Delivery",
            Self::Delivered => "Delivered",
            Self::ApprovedMaterial => "Approved Material",
            Self::RejectedMaterial => "Rejected Material",
            Self::Installed => "Installed",
            Self::Inspected => "Inspected",
            Self::ApprovedFinal => "Approved Final",
            Self::OnHold => "On Hold",
            Self::Cancelled => "Cancelled",
            Self::BrokenAtSite => "Broken at Site",
        }
    }

    /// Resolve a display name. Matching is exact.
    pub fn from_name(name: &str) -> Result<Self, CatalogError> {
        let status = match name {
            "Issued For Production" => Self::IssuedForProduction,
            "Produced" => Self::Produced,
            "Proceed For Delivery" => Self::ProceedForDelivery,
            "Delivered" => Self::Delivered,
            "Approved Material" => Self::ApprovedMaterial,
            "Rejected Material" => Self::RejectedMaterial,
            "Installed" => Self::Installed,
            "Inspected" => Self::Inspected,
            "Approved Final" => Self::ApprovedFinal,
            "On Hold" => Self::OnHold,
            "Cancelled" => Self::Cancelled,
            "Broken at Site" => Self::BrokenAtSite,
            other => return Err(CatalogError::UnknownName(other.to_string())),
        };
        Ok(status)
    }

    /// Whether the status may be targeted outside the declared graph.
    pub const fn is_special(self) -> bool {
        matches!(self, Self::OnHold | Self::Cancelled | Self::BrokenAtSite)
    }

    /// Whether the status has no outgoing edges.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ApprovedFinal | Self::Cancelled)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Status {
    type Error = CatalogError;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal)
    }
}

impl TryFrom<i16> for Status {
    type Error = CatalogError;

    /// Stored columns are `SMALLINT`; negative or oversized values are rejected.
    fn try_from(value: i16) -> Result<Self, Self::Error> {
        let ordinal = u8::try_from(value).map_err(|_| CatalogError::InvalidStoredOrdinal {
            value: i64::from(value),
        })?;
        Self::from_ordinal(ordinal)
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.ordinal()
    }
}

// ─── Ordinal-level lookups ───────────────────────────────────────────

/// Number of statuses in the catalog.
pub const fn ordinal_count() -> u8 {
    Status::COUNT
}

/// Whether the status with this ordinal is special.
pub fn is_special(ordinal: u8) -> Result<bool, CatalogError> {
    Status::from_ordinal(ordinal).map(Status::is_special)
}

/// Whether the status with this ordinal is terminal.
pub fn is_terminal(ordinal: u8) -> Result<bool, CatalogError> {
    Status::from_ordinal(ordinal).map(Status::is_terminal)
}

/// Display name of the status with this ordinal.
pub fn name(ordinal: u8) -> Result<&'static str, CatalogError> {
    Status::from_ordinal(ordinal).map(Status::name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(Status::IssuedForProduction.ordinal(), 0);
        assert_eq!(Status::Delivered.ordinal(), 3);
        assert_eq!(Status::ApprovedMaterial.ordinal(), 4);
        assert_eq!(Status::RejectedMaterial.ordinal(), 5);
        assert_eq!(Status::Installed.ordinal(), 6);
        assert_eq!(Status::ApprovedFinal.ordinal(), 8);
        assert_eq!(Status::BrokenAtSite.ordinal(), 11);
    }

    #[test]
    fn test_all_is_in_ordinal_order() {
        assert_eq!(Status::ALL.len(), usize::from(Status::COUNT));
        for (i, status) in Status::ALL.iter().enumerate() {
            assert_eq!(usize::from(status.ordinal()), i);
        }
    }

    #[test]
    fn test_special_set_is_exactly_three() {
        let special: Vec<Status> = Status::ALL.into_iter().filter(|s| s.is_special()).collect();
        assert_eq!(special, Status::SPECIAL.to_vec());
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(Status::Cancelled.is_terminal());
        assert!(Status::ApprovedFinal.is_terminal());
        assert!(!Status::OnHold.is_terminal());
        assert!(!Status::BrokenAtSite.is_terminal());
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Status::from_ordinal(12),
            Err(CatalogError::OutOfRange { ordinal: 12, count: 12 })
        );
        assert!(is_special(200).is_err());
        assert!(is_terminal(12).is_err());
        assert!(name(255).is_err());
    }

    #[test]
    fn test_stored_ordinal_conversion() {
        assert_eq!(Status::try_from(3_i16), Ok(Status::Delivered));
        assert_eq!(
            Status::try_from(-1_i16),
            Err(CatalogError::InvalidStoredOrdinal { value: -1 })
        );
        assert!(Status::try_from(300_i16).is_err());
    }

    #[test]
    fn test_name_table_is_bidirectional() {
        for status in Status::ALL {
            assert_eq!(Status::from_name(status.name()), Ok(status));
        }
        assert!(Status::from_name("broken at site").is_err());
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Status::OnHold.to_string(), "On Hold");
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&Status::BrokenAtSite).unwrap();
        assert_eq!(json, "\"BROKEN_AT_SITE\"");
        let parsed: Status = serde_json::from_str("\"PROCEED_FOR_DELIVERY\"").unwrap();
        assert_eq!(parsed, Status::ProceedForDelivery);
    }

    proptest! {
        /// Ordinal lookups are pure: repeated calls agree with each other.
        #[test]
        fn lookups_are_idempotent(ordinal in 0u8..Status::COUNT) {
            prop_assert_eq!(is_special(ordinal), is_special(ordinal));
            prop_assert_eq!(is_terminal(ordinal), is_terminal(ordinal));
            prop_assert_eq!(name(ordinal), name(ordinal));
        }

        /// Every ordinal at or past the catalog size is rejected.
        #[test]
        fn out_of_range_rejected(ordinal in Status::COUNT..=u8::MAX) {
            let is_out_of_range = matches!(
                Status::from_ordinal(ordinal),
                Err(CatalogError::OutOfRange { .. })
            );
            prop_assert!(is_out_of_range);
        }
    }
}
