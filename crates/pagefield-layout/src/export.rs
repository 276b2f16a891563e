//! Projection of the registry into the layout document.
//!
//! The document is deterministic for a given registry state: fields appear
//! in insertion order, and keys appear in declaration order below.
//!
//! ```json
//! {
//!   "documentName": "lease.pdf",
//!   "fields": [
//!     { "id": 1, "kind": "text", "title": "Text", "pageIndex": 1,
//!       "xPct": 12.5, "yPct": 40.0, "width": 150.0, "height": 30.0 }
//!   ]
//! }
//! ```

use std::fmt;
use std::io::Write;

use pagefield_core::CoordinateSpace;
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::field::{Field, FieldKind};
use crate::registry::FieldRegistry;
use crate::settings::FieldSettings;

/// Whether field settings are included in the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFidelity {
    /// Geometry and title only.
    #[default]
    Minimal,
    /// Geometry, title, and settings.
    Full,
}

/// Exported layout document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub document_name: String,
    /// Only written for the non-canonical pixel space.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_space: Option<CoordinateSpace>,
    pub fields: Vec<FieldRecord>,
}

/// One exported field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: u64,
    pub kind: FieldKind,
    pub title: String,
    pub page_index: u32,
    pub x_pct: f64,
    pub y_pct: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<FieldSettings>,
}

impl FieldRecord {
    fn project(field: &Field, fidelity: ExportFidelity) -> Self {
        let position = field.position();
        let size = field.size();
        Self {
            id: field.id().get(),
            kind: field.kind(),
            title: field.title().to_owned(),
            page_index: position.page_index.get(),
            x_pct: position.x,
            y_pct: position.y,
            width: size.width,
            height: size.height,
            settings: match fidelity {
                ExportFidelity::Minimal => None,
                ExportFidelity::Full => Some(field.settings().clone()),
            },
        }
    }
}

/// Export failures.
#[derive(Debug)]
pub enum ExportError {
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "layout serialization failed: {err}"),
            Self::Io(err) => write!(f, "layout write failed: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Builds [`LayoutDocument`]s from a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutExporter {
    fidelity: ExportFidelity,
    space: CoordinateSpace,
}

impl LayoutExporter {
    #[must_use]
    pub const fn new(fidelity: ExportFidelity, space: CoordinateSpace) -> Self {
        Self { fidelity, space }
    }

    #[must_use]
    pub const fn fidelity(&self) -> ExportFidelity {
        self.fidelity
    }

    #[must_use]
    pub const fn with_fidelity(mut self, fidelity: ExportFidelity) -> Self {
        self.fidelity = fidelity;
        self
    }

    /// Project every field of `registry`, in insertion order.
    #[must_use]
    pub fn export(&self, document_name: &str, registry: &FieldRegistry) -> LayoutDocument {
        let _span = debug_span!(
            "layout.export",
            document = document_name,
            fields = registry.len(),
            fidelity = ?self.fidelity,
        )
        .entered();
        LayoutDocument {
            document_name: document_name.to_owned(),
            coordinate_space: match self.space {
                CoordinateSpace::Percentage => None,
                CoordinateSpace::Pixel => Some(CoordinateSpace::Pixel),
            },
            fields: registry
                .iter()
                .map(|field| FieldRecord::project(field, self.fidelity))
                .collect(),
        }
    }
}

impl LayoutDocument {
    /// Compact JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write JSON to `writer`, followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<(), ExportError> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
