//! # Error Types
//!
//! Errors raised by the status catalog and the core value types. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations and
//! carry the offending input so a caller can report it.

use thiserror::Error;

/// Error returned by catalog lookups and core value constructors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// An ordinal outside `[0, Status::COUNT)`.
    #[error("status ordinal {ordinal} is out of range (catalog has {count} statuses)")]
    OutOfRange {
        /// The rejected ordinal.
        ordinal: u8,
        /// Size of the catalog.
        count: u8,
    },

    /// A persisted ordinal that does not even fit the ordinal type.
    #[error("stored status value {value} is not a valid ordinal")]
    InvalidStoredOrdinal {
        /// The raw stored value.
        value: i64,
    },

    /// A display name that matches no catalog entry.
    #[error("unknown status name: {0:?}")]
    UnknownName(String),

    /// A timestamp string that could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
