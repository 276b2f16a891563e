#![forbid(unsafe_code)]

//! Layout: the field data model, table grids, selection, and export.
//!
//! # Role in PageField
//! `pagefield-layout` owns the state a user builds while placing fields on a
//! document: the ordered [`FieldRegistry`], each table's [`TableGrid`], the
//! [`Selection`], and the [`LayoutExporter`] that projects all of it into a
//! [`LayoutDocument`].
//!
//! # How it fits in the system
//! Positions arrive already mapped by `pagefield-core`. The gesture
//! controllers in `pagefield-runtime` are the main callers of the registry
//! commands; UI code reads fields back through [`FieldRegistry::iter`] and
//! [`FieldRegistry::selected`] and re-renders on [`RegistryChange`].

pub mod export;
pub mod field;
pub mod grid;
pub mod notify;
pub mod registry;
pub mod selection;
pub mod settings;
pub mod viewer;

pub use export::{ExportError, ExportFidelity, FieldRecord, LayoutDocument, LayoutExporter};
pub use field::{Field, FieldId, FieldKind, FieldModelError, FieldPosition, FieldSize, KindSpec};
pub use grid::{
    Cell, CellKey, CellKeyParseError, CellType, DEFAULT_CELL_HEIGHT, DEFAULT_CELL_WIDTH,
    DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, GridAxis, GridError, MAX_GRID_COLUMNS, MAX_GRID_ROWS,
    MIN_CELL_HEIGHT, MIN_CELL_WIDTH, TableGrid,
};
pub use notify::{RegistryChange, Subscription};
pub use registry::{FieldRegistry, PositionPolicy};
pub use selection::{Selection, SelectionView};
pub use settings::{FieldSettings, KindSettings, SettingsPatch};
pub use viewer::{ViewerState, ZoomSettings};
