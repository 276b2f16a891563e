#![forbid(unsafe_code)]

//! Unified error type and recovery classification.
//!
//! Each crate keeps its own typed errors so callers can match on what they
//! care about. [`Error`] wraps all of them for applications that just want
//! `?`, and [`Error::recovery`] tells a host what to do next.

use std::fmt;

use pagefield_layout::{CellKeyParseError, ExportError, FieldModelError, GridError};
#[cfg(feature = "runtime")]
use pagefield_runtime::{ConfigError, LoggingError};

/// Top-level error type for PageField hosts.
#[derive(Debug)]
pub enum Error {
    /// A registry command was rejected.
    Field(FieldModelError),
    /// A table grid operation was rejected.
    Grid(GridError),
    /// A `"row-col"` cell key did not parse.
    CellKey(CellKeyParseError),
    /// Writing the layout document failed.
    Export(ExportError),
    /// Configuration could not be loaded or is invalid.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
    /// The logging subscriber could not be set up.
    #[cfg(feature = "runtime")]
    Logging(LoggingError),
    /// Raw I/O error.
    Io(std::io::Error),
}

/// Standard result type for PageField APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What a host should do when an error reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Drop the command; the layout is unchanged and still valid.
    IgnoreCommand,
    /// Keep running with default settings.
    UseDefaults,
    /// Retry the export, possibly to another destination.
    RetryExport,
    /// Internal state is inconsistent; stop editing this document.
    Abort,
}

impl Error {
    /// Recovery action for this error.
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Field(FieldModelError::Invariant { .. } | FieldModelError::FieldIdOverflow { .. }) => {
                Recovery::Abort
            }
            Self::Field(_) | Self::Grid(_) | Self::CellKey(_) => Recovery::IgnoreCommand,
            Self::Export(ExportError::Serialize(_)) => Recovery::Abort,
            Self::Export(ExportError::Io(_)) | Self::Io(_) => Recovery::RetryExport,
            #[cfg(feature = "runtime")]
            Self::Config(_) | Self::Logging(_) => Recovery::UseDefaults,
        }
    }

    /// Short label for log fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Field(_) => "field",
            Self::Grid(_) => "grid",
            Self::CellKey(_) => "cell_key",
            Self::Export(_) => "export",
            #[cfg(feature = "runtime")]
            Self::Config(_) => "config",
            #[cfg(feature = "runtime")]
            Self::Logging(_) => "logging",
            Self::Io(_) => "io",
        }
    }

    /// Whether editing can continue.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.recovery() != Recovery::Abort
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::CellKey(e) => write!(f, "cell key: {e}"),
            Self::Export(e) => write!(f, "export: {e}"),
            #[cfg(feature = "runtime")]
            Self::Config(e) => write!(f, "config: {e}"),
            #[cfg(feature = "runtime")]
            Self::Logging(e) => write!(f, "logging: {e}"),
            Self::Io(e) => write!(f, "I/O: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::CellKey(e) => Some(e),
            Self::Export(e) => Some(e),
            #[cfg(feature = "runtime")]
            Self::Config(e) => Some(e),
            #[cfg(feature = "runtime")]
            Self::Logging(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<FieldModelError> for Error {
    fn from(err: FieldModelError) -> Self {
        Self::Field(err)
    }
}

impl From<GridError> for Error {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

impl From<CellKeyParseError> for Error {
    fn from(err: CellKeyParseError) -> Self {
        Self::CellKey(err)
    }
}

impl From<ExportError> for Error {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "runtime")]
impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagefield_layout::{CellKey, FieldId, FieldKind};

    #[test]
    fn rejected_commands_are_ignorable() {
        let err: Error = FieldModelError::UnknownField { id: FieldId::MIN }.into();
        assert_eq!(err.recovery(), Recovery::IgnoreCommand);
        assert!(err.is_recoverable());
        assert_eq!(err.error_type(), "field");

        let err: Error = GridError::CellOutOfRange {
            key: CellKey::new(9, 9),
            rows: 4,
            columns: 4,
        }
        .into();
        assert_eq!(err.recovery(), Recovery::IgnoreCommand);
    }

    #[test]
    fn broken_invariants_abort() {
        let err: Error = FieldModelError::Invariant {
            detail: "duplicate id".into(),
        }
        .into();
        assert_eq!(err.recovery(), Recovery::Abort);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn io_failures_retry_export() {
        let err: Error = std::io::Error::other("disk full").into();
        assert_eq!(err.recovery(), Recovery::RetryExport);
        assert_eq!(err.to_string(), "I/O: disk full");
    }

    #[test]
    fn parse_errors_keep_their_source() {
        let err: Error = "x-1".parse::<CellKey>().unwrap_err().into();
        assert!(std::error::Error::source(&err).is_some());
        let kind: std::result::Result<FieldKind, _> = "stamp".parse();
        let err: Error = kind.unwrap_err().into();
        assert_eq!(err.error_type(), "field");
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn bad_config_falls_back_to_defaults() {
        let err: Error = pagefield_runtime::EditorConfig::from_toml_str("[zoom]\nstep = \"big\"\n")
            .unwrap_err()
            .into();
        assert_eq!(err.recovery(), Recovery::UseDefaults);
    }
}
