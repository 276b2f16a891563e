#![forbid(unsafe_code)]

//! PageField public facade crate.
//!
//! Re-exports the types most hosts need from the internal crates and offers
//! a [`prelude`]. A typical host owns one [`Editor`], forwards its pointer
//! and drag-layer events to it, and renders from [`Editor::registry`].
//!
//! ```
//! use pagefield::prelude::*;
//!
//! let pages = PageStack::vertical(2, 600.0, 800.0, 16.0);
//! let mut editor = Editor::default();
//! editor.open_document("lease.pdf");
//! editor.content_ready(2);
//!
//! let dropped = editor.drop(
//!     &pages,
//!     DropTarget::Document,
//!     Point::new(300.0, 400.0),
//!     Some(DragPayload::palette(FieldKind::Signature)),
//! );
//! assert!(matches!(dropped.outcome, DropOutcome::Created { .. }));
//!
//! let doc = editor.export();
//! assert_eq!(doc.fields[0].x_pct, 50.0);
//! ```

pub mod error;

pub use error::{Error, Recovery, Result};

// --- Geometry re-exports ---------------------------------------------------

pub use pagefield_core::{
    CoordinateSpace, GeometryMapper, PageIndex, PageStack, PageSurfaces, Point, PointerEvent,
    PointerEventKind, RelativePoint, ResolvedPage, SurfaceRect, resolve_page, to_absolute,
    to_relative,
};

// --- Layout re-exports -----------------------------------------------------

pub use pagefield_layout::{
    Cell, CellKey, CellType, ExportFidelity, Field, FieldId, FieldKind, FieldPosition,
    FieldRecord, FieldRegistry, FieldSettings, FieldSize, KindSettings, LayoutDocument,
    LayoutExporter, PositionPolicy, RegistryChange, Selection, SelectionView, SettingsPatch,
    Subscription, TableGrid, ViewerState, ZoomSettings,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use pagefield_runtime::{
    CellResizeAxis, DragPayload, DropOutcome, DropResponse, DropTarget, Editor, EditorConfig,
    GestureState, GestureTransition, ListenerDirective, LoggingConfig, PointerResponse,
    ResizeApplied,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CellKey, CellType, CoordinateSpace, Error, FieldId, FieldKind, FieldPosition,
        FieldRegistry, FieldSize, LayoutDocument, PageIndex, PageStack, PageSurfaces, Point,
        PointerEvent, Result, SettingsPatch,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        CellResizeAxis, DragPayload, DropOutcome, DropTarget, Editor, EditorConfig,
        ListenerDirective,
    };

    pub use crate::{core, layout};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use pagefield_core as core;
pub use pagefield_layout as layout;
#[cfg(feature = "runtime")]
pub use pagefield_runtime as runtime;
