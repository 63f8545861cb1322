//! # Panel Persistence Boundary
//!
//! Panels are owned by an external store. The engine only reads a panel's
//! current status ordinal and asks for a new one to be persisted after
//! validation has succeeded.
//!
//! `current_status` returns the raw stored ordinal so that a corrupt value
//! reaches the validator and comes back as `OutOfRange` instead of being
//! silently coerced.
//!
//! `set_status` is a compare-and-set on that ordinal. Two commits that
//! validated against the same status cannot both land; the loser gets
//! `PanelError::Conflict` and writes no history.

use std::collections::HashMap;
use std::sync::Arc;

use panelflow_core::{PanelId, Status};
use parking_lot::RwLock;

use crate::error::PanelError;

/// Read and write access to a panel's status field.
#[allow(async_fn_in_trait)]
pub trait PanelRepository: Send + Sync {
    /// The panel's stored status ordinal.
    async fn current_status(&self, panel: PanelId) -> Result<u8, PanelError>;

    /// Persist a new status for the panel if its stored ordinal is still
    /// `expected`.
    async fn set_status(
        &self,
        panel: PanelId,
        expected: u8,
        status: Status,
    ) -> Result<(), PanelError>;
}

/// Process-local panel store for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPanelRepository {
    panels: Arc<RwLock<HashMap<PanelId, u8>>>,
}

impl InMemoryPanelRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a panel with an initial status.
    pub fn insert(&self, panel: PanelId, status: Status) {
        self.panels.write().insert(panel, status.ordinal());
    }

    /// Register a panel with a raw stored ordinal, valid or not.
    pub fn insert_raw(&self, panel: PanelId, ordinal: u8) {
        self.panels.write().insert(panel, ordinal);
    }

    /// The stored status, if the panel exists and its ordinal is valid.
    pub fn status(&self, panel: PanelId) -> Option<Status> {
        let ordinal = *self.panels.read().get(&panel)?;
        Status::from_ordinal(ordinal).ok()
    }
}

impl PanelRepository for InMemoryPanelRepository {
    async fn current_status(&self, panel: PanelId) -> Result<u8, PanelError> {
        self.panels
            .read()
            .get(&panel)
            .copied()
            .ok_or(PanelError::NotFound { panel })
    }

    async fn set_status(
        &self,
        panel: PanelId,
        expected: u8,
        status: Status,
    ) -> Result<(), PanelError> {
        let mut panels = self.panels.write();
        let slot = panels
            .get_mut(&panel)
            .ok_or(PanelError::NotFound { panel })?;
        if *slot != expected {
            return Err(PanelError::Conflict {
                panel,
                expected,
                actual: *slot,
            });
        }
        *slot = status.ordinal();
        Ok(())
    }
}
