//! # Postgres History Store
//!
//! Persists status history to the `panel_status_history` table via SQLx.
//!
//! The database layer is optional. When `DATABASE_URL` is set,
//! [`init_pool`] connects and applies the embedded migrations; when absent,
//! callers fall back to [`crate::store::InMemoryHistoryStore`].
//!
//! `sequence` is a `BIGSERIAL` and is the only ordering used for "most
//! recent". Reconciliation is a single `UPDATE` whose target row is chosen
//! by a `FOR UPDATE` subquery, so finding and updating happen in one
//! statement.

use chrono::{DateTime, Utc};
use panelflow_core::{HistoryEntryId, PanelId, Status, Timestamp, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::entry::{NewHistoryEntry, StatusHistoryEntry};
use crate::error::AuditError;
use crate::store::HistoryStore;

const COLUMNS: &str = "id, sequence, panel_id, status, recorded_at, user_id, note, image_ref";

/// Connect to Postgres and run migrations.
///
/// Returns `None` if no database URL is configured (in-memory mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(config: &EngineConfig) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, status history is in memory only and will not survive restarts"
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    sequence: i64,
    panel_id: Uuid,
    status: i16,
    recorded_at: DateTime<Utc>,
    user_id: Uuid,
    note: Option<String>,
    image_ref: Option<String>,
}

impl TryFrom<HistoryRow> for StatusHistoryEntry {
    type Error = AuditError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: HistoryEntryId(row.id),
            sequence: row.sequence,
            panel: PanelId(row.panel_id),
            status: Status::try_from(row.status)?,
            timestamp: Timestamp::from_utc(row.recorded_at),
            user: UserId(row.user_id),
            note: row.note,
            image_ref: row.image_ref,
        })
    }
}

/// History store backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn stored_status(status: Status) -> i16 {
    i16::from(status.ordinal())
}

impl HistoryStore for PgHistoryStore {
    async fn insert(&self, entry: NewHistoryEntry) -> Result<StatusHistoryEntry, AuditError> {
        let id = HistoryEntryId::new();
        let sequence: i64 = sqlx::query_scalar(
            "INSERT INTO panel_status_history (id, panel_id, status, recorded_at, user_id, note, image_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING sequence",
        )
        .bind(id.0)
        .bind(entry.panel.0)
        .bind(stored_status(entry.status))
        .bind(*entry.timestamp.as_datetime())
        .bind(entry.user.0)
        .bind(entry.annotation.note.as_deref())
        .bind(entry.annotation.image_ref.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry.into_entry(id, sequence))
    }

    async fn find_latest(
        &self,
        panel: PanelId,
        status: Status,
    ) -> Result<Option<StatusHistoryEntry>, AuditError> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {COLUMNS} FROM panel_status_history
             WHERE panel_id = $1 AND status = $2
             ORDER BY sequence DESC
             LIMIT 1"
        ))
        .bind(panel.0)
        .bind(stored_status(status))
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatusHistoryEntry::try_from).transpose()
    }

    async fn update_timestamp(
        &self,
        id: HistoryEntryId,
        timestamp: Timestamp,
    ) -> Result<StatusHistoryEntry, AuditError> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "UPDATE panel_status_history SET recorded_at = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id.0)
        .bind(*timestamp.as_datetime())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(AuditError::EntryNotFound { id })?.try_into()
    }

    async fn reconcile_latest(
        &self,
        panel: PanelId,
        status: Status,
        timestamp: Timestamp,
    ) -> Result<Option<StatusHistoryEntry>, AuditError> {
        let row = sqlx::query_as::<_, HistoryRow>(&format!(
            "UPDATE panel_status_history SET recorded_at = $3
             WHERE id = (
                 SELECT id FROM panel_status_history
                 WHERE panel_id = $1 AND status = $2
                 ORDER BY sequence DESC
                 LIMIT 1
                 FOR UPDATE
             )
             RETURNING {COLUMNS}"
        ))
        .bind(panel.0)
        .bind(stored_status(status))
        .bind(*timestamp.as_datetime())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StatusHistoryEntry::try_from).transpose()
    }

    async fn history(&self, panel: PanelId) -> Result<Vec<StatusHistoryEntry>, AuditError> {
        let rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {COLUMNS} FROM panel_status_history
             WHERE panel_id = $1
             ORDER BY sequence ASC"
        ))
        .bind(panel.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusHistoryEntry::try_from).collect()
    }
}
