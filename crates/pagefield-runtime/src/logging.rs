//! Structured logging bootstrap.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once to
//! install a `tracing-subscriber` stack writing to stderr. The
//! `PAGEFIELD_LOG` environment variable, when set, overrides the configured
//! filter directive.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable that overrides [`LoggingConfig::filter`].
pub const LOG_ENV_VAR: &str = "PAGEFIELD_LOG";

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable single lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging section of the editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"pagefield.registry=debug"`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Resolve the effective filter: environment first, then config.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        match std::env::var(LOG_ENV_VAR) {
            Ok(directive) if !directive.trim().is_empty() => {
                EnvFilter::try_new(&directive).map_err(|e| LoggingError::Filter {
                    directive,
                    message: e.to_string(),
                })
            }
            _ => EnvFilter::try_new(&self.filter).map_err(|e| LoggingError::Filter {
                directive: self.filter.clone(),
                message: e.to_string(),
            }),
        }
    }
}

/// Logging setup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// The filter directive does not parse.
    Filter { directive: String, message: String },
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter { directive, message } => {
                write!(f, "invalid log filter {directive:?}: {message}")
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a global subscriber was already installed, so
/// calling this more than once is harmless.
pub fn init(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let filter = config.env_filter()?;
    let (text, json) = match config.format {
        LogFormat::Text => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()
        .is_ok();
    Ok(installed)
}
