//! Tracing subscriber setup for processes embedding the engine.

use tracing_subscriber::EnvFilter;

use crate::config::{EngineConfig, LogFormat};

/// Errors installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set and valid; otherwise `config.log_filter` is used.
pub fn init_tracing(config: &EngineConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| TelemetryError::AlreadyInstalled(e.to_string()))
}
