//! Tracing subscriber setup for the daemon.
//!
//! `RUST_LOG` wins over the configured filter when set, so a single module
//! can be turned up without touching service config:
//!
//! ```bash
//! RUST_LOG=info,credit_risk_api::validate=debug credit-riskd
//! ```

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::filter::{EnvFilter, ParseError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" | "" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log format: {0} (expected pretty, compact or json)")]
    UnknownFormat(String),

    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    #[error("subscriber already installed: {0}")]
    Init(String),
}

pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.filter)?),
    }
}

/// Installs the global subscriber. Call once, before the store is loaded, so
/// load-time warnings are captured.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(config)?);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| LoggingError::Init(err.to_string()))
}
