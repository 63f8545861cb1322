//! Engine configuration.
//!
//! Read from environment variables by [`EngineConfig::from_env`]. Every
//! variable is optional; a value that is present but malformed is an error
//! rather than a silent fallback to the default.

use std::time::Duration;

/// Log output format for [`crate::telemetry::init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Configuration for the history store and logging.
///
/// Custom `Debug` implementation redacts `database_url`, which usually
/// embeds a password.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: u32,
    /// How long to wait for a pooled connection.
    pub db_acquire_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("log_format", &self.log_format)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: 10,
            db_acquire_timeout: Duration::from_secs(5),
            log_format: LogFormat::Text,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DATABASE_URL` (optional)
    /// - `PANELFLOW_DB_MAX_CONNECTIONS` (default: 10, must be positive)
    /// - `PANELFLOW_DB_ACQUIRE_TIMEOUT_SECS` (default: 5)
    /// - `PANELFLOW_LOG_FORMAT` (`text` or `json`, default: `text`)
    /// - `PANELFLOW_LOG_FILTER` (default: `info`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let db_max_connections = match lookup("PANELFLOW_DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::invalid("PANELFLOW_DB_MAX_CONNECTIONS", raw)),
            },
            None => defaults.db_max_connections,
        };

        let db_acquire_timeout = match lookup("PANELFLOW_DB_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::invalid("PANELFLOW_DB_ACQUIRE_TIMEOUT_SECS", raw))?,
            None => defaults.db_acquire_timeout,
        };

        let log_format = match lookup("PANELFLOW_LOG_FORMAT") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::invalid("PANELFLOW_LOG_FORMAT", raw)),
            },
            None => defaults.log_format,
        };

        let log_filter = lookup("PANELFLOW_LOG_FILTER").unwrap_or(defaults.log_filter);

        Ok(Self {
            database_url,
            db_max_connections,
            db_acquire_timeout,
            log_format,
            log_filter,
        })
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

impl ConfigError {
    fn invalid(var: &str, value: String) -> Self {
        Self::InvalidValue {
            var: var.to_string(),
            value,
        }
    }
}
