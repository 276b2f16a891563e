#![forbid(unsafe_code)]

//! Editor configuration loaded from TOML or JSON.
//!
//! ```toml
//! # pagefield.toml
//! [geometry]
//! coordinate_space = "percentage"
//! clamp_positions = true
//!
//! [zoom]
//! initial_scale = 1.0
//! step = 0.1
//! min_scale = 0.1
//!
//! [export]
//! fidelity = "minimal"
//! pretty = true
//!
//! [logging]
//! filter = "info"
//! format = "text"
//! ```
//!
//! Every section and key is optional; omitted values take the defaults shown.

use std::fmt;
use std::path::Path;

use pagefield_core::CoordinateSpace;
use pagefield_layout::{ExportFidelity, PositionPolicy, ZoomSettings};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub geometry: GeometryConfig,
    pub zoom: ZoomSettings,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Coordinate storage settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub coordinate_space: CoordinateSpace,
    /// Clamp percentage positions into `[0, 100]`. Ignored for the pixel
    /// space, which has no page-relative upper bound.
    pub clamp_positions: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            coordinate_space: CoordinateSpace::Percentage,
            clamp_positions: true,
        }
    }
}

impl GeometryConfig {
    /// Registry position policy implied by these settings.
    #[must_use]
    pub const fn position_policy(&self) -> PositionPolicy {
        match (self.coordinate_space, self.clamp_positions) {
            (CoordinateSpace::Percentage, true) => PositionPolicy::Clamp,
            _ => PositionPolicy::Unclamped,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub fidelity: ExportFidelity,
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fidelity: ExportFidelity::Minimal,
            pretty: true,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load by extension (`.json` is JSON, anything else TOML) and reject
    /// configurations that fail [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate value ranges. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let zoom = &self.zoom;
        if !(zoom.min_scale.is_finite() && zoom.min_scale > 0.0) {
            errors.push(format!("zoom.min_scale must be > 0, got {}", zoom.min_scale));
        }
        if !(zoom.step.is_finite() && zoom.step > 0.0) {
            errors.push(format!("zoom.step must be > 0, got {}", zoom.step));
        }
        if !zoom.initial_scale.is_finite() || zoom.initial_scale < zoom.min_scale {
            errors.push(format!(
                "zoom.initial_scale must be >= zoom.min_scale ({}), got {}",
                zoom.min_scale, zoom.initial_scale
            ));
        }
        if self.logging.filter.trim().is_empty() {
            errors.push("logging.filter must not be empty".to_owned());
        }
        errors
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSerialize)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(ConfigError::Io)
}

/// Errors from loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// TOML serialization error.
    TomlSerialize(toml::ser::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn empty_toml_is_default() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(config.validate().is_empty());
        assert_eq!(config.geometry.position_policy(), PositionPolicy::Clamp);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let config = EditorConfig::from_toml_str(
            r#"
            [geometry]
            coordinate_space = "pixel"

            [export]
            fidelity = "full"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.geometry.coordinate_space, CoordinateSpace::Pixel);
        assert!(config.geometry.clamp_positions);
        assert_eq!(config.geometry.position_policy(), PositionPolicy::Unclamped);
        assert_eq!(config.export.fidelity, ExportFidelity::Full);
        assert!(config.export.pretty);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.zoom, ZoomSettings::default());
    }

    #[test]
    fn json_loads_too() {
        let config =
            EditorConfig::from_json_str(r#"{ "zoom": { "step": 0.25 }, "geometry": { "clamp_positions": false } }"#)
                .unwrap();
        assert_eq!(config.zoom.step, 0.25);
        assert_eq!(config.geometry.position_policy(), PositionPolicy::Unclamped);
    }

    #[test]
    fn unknown_section_is_rejected() {
        assert!(matches!(
            EditorConfig::from_toml_str("[colours]\nprimary = 1\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn validate_reports_bad_ranges() {
        let mut config = EditorConfig::default();
        config.zoom.min_scale = 0.0;
        config.zoom.step = -1.0;
        config.logging.filter = "  ".into();
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
    }

    #[test]
    fn load_by_extension_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("editor.toml");
        std::fs::write(&toml_path, "[zoom]\ninitial_scale = 2.0\n").unwrap();
        assert_eq!(EditorConfig::load(&toml_path).unwrap().zoom.initial_scale, 2.0);

        let json_path = dir.path().join("editor.json");
        std::fs::write(&json_path, r#"{ "zoom": { "initial_scale": 0.01 } }"#).unwrap();
        assert!(matches!(
            EditorConfig::load(&json_path),
            Err(ConfigError::Validation(_))
        ));

        assert!(matches!(
            EditorConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let mut config = EditorConfig::default();
        config.export.fidelity = ExportFidelity::Full;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EditorConfig::from_toml_str(&text).unwrap(), config);
    }
}
