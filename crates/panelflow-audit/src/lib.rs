//! # panelflow-audit: Status History and Commit Sequencing
//!
//! Records every committed panel status change, reconciles after-the-fact
//! business dates onto existing history entries, and sequences the
//! validator, the panel store, and the audit trail for single and bulk
//! updates.
//!
//! ## Components
//!
//! - **Entries** (`entry.rs`): `StatusHistoryEntry` and the `Annotation`
//!   (note and image reference) carried alongside a change.
//!
//! - **Stores** (`store.rs`, `db.rs`): the `HistoryStore` boundary with an
//!   in-memory implementation and a Postgres one. `sequence` is the only
//!   tie-break for "most recent"; timestamps are business data and may be
//!   edited.
//!
//! - **Recorder** (`recorder.rs`): append, reconcile, history listing, and
//!   resolving the status a panel held before it was put On Hold.
//!
//! - **Panels** (`panel.rs`): the `PanelRepository` boundary to the
//!   external panel store.
//!
//! - **Service** (`service.rs`): validate, persist, then audit. Bulk
//!   updates repeat that per panel with independent failures.
//!
//! - **Config and telemetry** (`config.rs`, `telemetry.rs`): environment
//!   configuration and `tracing` subscriber setup.

pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod panel;
pub mod recorder;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::{ConfigError, EngineConfig, LogFormat};
pub use db::{init_pool, PgHistoryStore};
pub use entry::{Annotation, NewHistoryEntry, StatusHistoryEntry};
pub use error::{AuditError, CommitError, PanelError};
pub use panel::{InMemoryPanelRepository, PanelRepository};
pub use recorder::AuditRecorder;
pub use service::{Actor, BulkReport, LifecycleService};
pub use store::{HistoryStore, InMemoryHistoryStore};
pub use telemetry::{init_tracing, TelemetryError};
