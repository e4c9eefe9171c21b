use std::path::PathBuf;

use crate::logging::{LogConfig, LogFormat, LoggingError};

pub const ENV_HTTP_ADDR: &str = "CREDIT_RISK_HTTP_ADDR";
pub const ENV_DATA_PATH: &str = "CREDIT_RISK_DATA";
pub const ENV_LOG_FILTER: &str = "CREDIT_RISK_LOG";
pub const ENV_LOG_FORMAT: &str = "CREDIT_RISK_LOG_FORMAT";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DATA_PATH: &str = "borrowers.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub http_addr: String,
    pub data_path: PathBuf,
    pub log: LogConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            log: LogConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> (Self, Option<LoggingError>) {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds config from any key lookup. Blank values fall back to defaults.
    /// An unknown log format falls back to compact and the parse error is
    /// handed back, since no subscriber exists yet to report it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Option<LoggingError>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let (format, format_err) = match get(ENV_LOG_FORMAT).map(|raw| raw.parse::<LogFormat>()) {
            Some(Ok(format)) => (format, None),
            Some(Err(err)) => (LogFormat::Compact, Some(err)),
            None => (defaults.log.format, None),
        };

        let config = Self {
            http_addr: get(ENV_HTTP_ADDR).unwrap_or(defaults.http_addr),
            data_path: get(ENV_DATA_PATH).map_or(defaults.data_path, PathBuf::from),
            log: LogConfig {
                filter: get(ENV_LOG_FILTER).unwrap_or(defaults.log.filter),
                format,
            },
        };
        (config, format_err)
    }
}
