//! Field identity, kind catalogue, and the placed-field record.

use std::fmt;
use std::str::FromStr;

use pagefield_core::{PageIndex, RelativePoint};
use serde::{Deserialize, Serialize};

use crate::grid::{CellKey, GridError, TableGrid};
use crate::settings::FieldSettings;

/// Stable identifier for a placed field.
///
/// `0` is reserved/invalid so ids are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FieldId(u64);

impl FieldId {
    /// First id handed out by a fresh registry.
    pub const MIN: Self = Self(1);

    /// Create a new field ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, FieldModelError> {
        if raw == 0 {
            return Err(FieldModelError::ZeroFieldId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID (`self + 1`).
    pub fn checked_next(self) -> Result<Self, FieldModelError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(FieldModelError::FieldIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl TryFrom<u64> for FieldId {
    type Error = FieldModelError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<FieldId> for u64 {
    fn from(id: FieldId) -> Self {
        id.0
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a placed field. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Table,
    Multiline,
    Signature,
}

/// Palette label, default size, and minimum size of one [`FieldKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindSpec {
    pub label: &'static str,
    pub default_width: f64,
    pub default_height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl KindSpec {
    /// Size given to a freshly created field.
    #[must_use]
    pub const fn default_size(&self) -> FieldSize {
        FieldSize::new(self.default_width, self.default_height)
    }

    /// Smallest size a resize may produce.
    #[must_use]
    pub const fn min_size(&self) -> FieldSize {
        FieldSize::new(self.min_width, self.min_height)
    }
}

const fn kind_spec(label: &'static str, default: (f64, f64), min: (f64, f64)) -> KindSpec {
    KindSpec {
        label,
        default_width: default.0,
        default_height: default.1,
        min_width: min.0,
        min_height: min.1,
    }
}

const TEXT_SPEC: KindSpec = kind_spec("Text", (150.0, 30.0), (100.0, 30.0));
const NUMBER_SPEC: KindSpec = kind_spec("Number", (150.0, 30.0), (100.0, 30.0));
const DATE_SPEC: KindSpec = kind_spec("Date", (150.0, 30.0), (100.0, 30.0));
const TABLE_SPEC: KindSpec = kind_spec("Table", (300.0, 150.0), (200.0, 100.0));
const MULTILINE_SPEC: KindSpec = kind_spec("Multiline", (300.0, 150.0), (150.0, 100.0));
const SIGNATURE_SPEC: KindSpec = kind_spec("Signature", (150.0, 150.0), (60.0, 60.0));

impl FieldKind {
    /// Every kind, in palette order.
    pub const ALL: [Self; 6] = [
        Self::Text,
        Self::Number,
        Self::Date,
        Self::Table,
        Self::Multiline,
        Self::Signature,
    ];

    /// Stable lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Table => "table",
            Self::Multiline => "multiline",
            Self::Signature => "signature",
        }
    }

    /// Sizing and palette metadata.
    #[must_use]
    pub const fn spec(self) -> &'static KindSpec {
        match self {
            Self::Text => &TEXT_SPEC,
            Self::Number => &NUMBER_SPEC,
            Self::Date => &DATE_SPEC,
            Self::Table => &TABLE_SPEC,
            Self::Multiline => &MULTILINE_SPEC,
            Self::Signature => &SIGNATURE_SPEC,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = FieldModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FieldModelError::UnknownKind {
                name: s.to_owned(),
            })
    }
}

/// Where a field sits: a page and a page-relative point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPosition {
    pub page_index: PageIndex,
    pub x: f64,
    pub y: f64,
}

impl FieldPosition {
    #[must_use]
    pub const fn new(page_index: PageIndex, x: f64, y: f64) -> Self {
        Self { page_index, x, y }
    }

    /// Build from a mapped point.
    #[must_use]
    pub const fn on_page(page_index: PageIndex, point: RelativePoint) -> Self {
        Self::new(page_index, point.x, point.y)
    }

    #[must_use]
    pub const fn relative(&self) -> RelativePoint {
        RelativePoint::new(self.x, self.y)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Box size in reference-scale pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSize {
    pub width: f64,
    pub height: f64,
}

impl FieldSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Raise each axis to at least `min`.
    #[must_use]
    pub fn at_least(self, min: FieldSize) -> Self {
        Self::new(self.width.max(min.width), self.height.max(min.height))
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// One placed field.
///
/// Mutation goes through [`FieldRegistry`](crate::FieldRegistry) so that ids,
/// sizing floors, and table invariants are enforced in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    id: FieldId,
    kind: FieldKind,
    title: String,
    position: FieldPosition,
    size: FieldSize,
    settings: FieldSettings,
}

impl Field {
    pub(crate) fn new(id: FieldId, kind: FieldKind, title: String, position: FieldPosition) -> Self {
        Self {
            id,
            kind,
            title,
            position,
            size: kind.spec().default_size(),
            settings: FieldSettings::for_kind(kind),
        }
    }

    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn position(&self) -> FieldPosition {
        self.position
    }

    #[must_use]
    pub const fn size(&self) -> FieldSize {
        self.size
    }

    #[must_use]
    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    /// The table grid, for table fields.
    #[must_use]
    pub fn grid(&self) -> Option<&TableGrid> {
        self.settings.grid()
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub(crate) fn set_position(&mut self, position: FieldPosition) {
        self.position = position;
    }

    pub(crate) fn set_size(&mut self, size: FieldSize) {
        self.size = size;
    }

    pub(crate) fn replace_settings(&mut self, settings: FieldSettings) {
        self.settings = settings;
    }

    pub(crate) fn grid_mut(&mut self) -> Result<&mut TableGrid, FieldModelError> {
        let (id, kind) = (self.id, self.kind);
        self.settings
            .grid_mut()
            .ok_or(FieldModelError::NotATable { id, kind })
    }
}

/// Errors from field model and registry commands.
///
/// Every command that returns one of these has left the registry unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldModelError {
    /// Field id 0 is reserved.
    ZeroFieldId,
    /// The id counter cannot advance.
    FieldIdOverflow { current: FieldId },
    /// No field with this id exists.
    UnknownField { id: FieldId },
    /// Not a known field kind name.
    UnknownKind { name: String },
    /// A cell-scoped command targeted a non-table field.
    NotATable { id: FieldId, kind: FieldKind },
    /// A settings member does not apply to the field's kind.
    KindMismatch {
        kind: FieldKind,
        member: &'static str,
    },
    /// Position coordinates are NaN or infinite.
    NonFinitePosition { x: f64, y: f64 },
    /// Size is NaN or infinite.
    NonFiniteSize { width: f64, height: f64 },
    /// Table grid addressing or shape failure.
    Grid(GridError),
    /// A registry-wide invariant does not hold.
    Invariant { detail: String },
}

impl fmt::Display for FieldModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFieldId => write!(f, "field id must be non-zero"),
            Self::FieldIdOverflow { current } => {
                write!(f, "field id overflow after {current}")
            }
            Self::UnknownField { id } => write!(f, "unknown field {id}"),
            Self::UnknownKind { name } => write!(f, "unknown field kind {name:?}"),
            Self::NotATable { id, kind } => {
                write!(f, "field {id} is a {kind} field, not a table")
            }
            Self::KindMismatch { kind, member } => {
                write!(f, "setting '{member}' does not apply to {kind} fields")
            }
            Self::NonFinitePosition { x, y } => {
                write!(f, "position ({x}, {y}) is not finite")
            }
            Self::NonFiniteSize { width, height } => {
                write!(f, "size {width}x{height} is not finite")
            }
            Self::Grid(err) => write!(f, "{err}"),
            Self::Invariant { detail } => write!(f, "registry invariant violated: {detail}"),
        }
    }
}

impl std::error::Error for FieldModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridError> for FieldModelError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}

/// The selected cell of a field, read through the malformed-key rule.
pub(crate) fn selected_cell_of(field: &Field) -> Option<CellKey> {
    field.grid().and_then(TableGrid::selected_cell)
}
