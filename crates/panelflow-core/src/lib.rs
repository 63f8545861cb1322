//! # panelflow-core: Foundational Types for the Panel Lifecycle Engine
//!
//! This crate is the leaf of the workspace. It defines the status catalog
//! every other crate is keyed by, together with the identifier newtypes and
//! the timestamp type used by the audit trail.
//!
//! ## Key Design Principles
//!
//! 1. **Ordinals are persisted.** `Status` is a `#[repr(u8)]` enum whose
//!    discriminants are the stored ordinals. They are never renumbered.
//!
//! 2. **Catalog flags are data.** Special and terminal membership is declared
//!    per variant, not derived from the transition graph.
//!
//! 3. **Newtype wrappers for identifiers.** `PanelId`, `UserId` and
//!    `HistoryEntryId` cannot be confused with one another.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `panelflow-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod status;
pub mod temporal;

pub use error::CatalogError;
pub use identity::{HistoryEntryId, PanelId, UserId};
pub use status::{is_special, is_terminal, name, ordinal_count, Status};
pub use temporal::Timestamp;
