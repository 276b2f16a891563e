use std::path::PathBuf;

use pagefield_layout::ExportError;
use pagefield_runtime::{ConfigError, LoggingError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid script {path}: {source}")]
    ScriptParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid script {path}: {message}")]
    ScriptInvalid { path: PathBuf, message: String },

    #[error("step {index} ({step}): {message}")]
    InvalidStep {
        index: usize,
        step: &'static str,
        message: String,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("{count} step(s) changed nothing (strict mode)")]
    StepsIgnored { count: usize },
}

impl ReplayError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScriptParse { .. }
            | Self::ScriptInvalid { .. }
            | Self::InvalidStep { .. }
            | Self::Config(_) => 2,
            Self::StepsIgnored { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid_step(index: usize, step: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidStep {
            index,
            step,
            message: message.into(),
        }
    }
}
