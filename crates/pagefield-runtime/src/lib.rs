#![forbid(unsafe_code)]

//! Runtime: gestures, configuration, logging, and the editor surface.
//!
//! # Role in PageField
//! `pagefield-runtime` turns host input into layout commands. The
//! [`GestureMachine`] owns the single active gesture, [`resize`] and
//! [`drag`] hold the arithmetic applied on each frame or drop, and
//! [`Editor`] ties them to a [`FieldRegistry`](pagefield_layout::FieldRegistry)
//! and a [`ViewerState`](pagefield_layout::ViewerState).
//!
//! # How it fits in the system
//! UI code forwards pointer and drag-layer events to [`Editor`], follows the
//! returned [`ListenerDirective`] for its document-wide listeners, and
//! re-renders on registry changes. Binaries load an [`EditorConfig`] and call
//! [`logging::init`] once at startup.

pub mod config;
pub mod drag;
pub mod editor;
pub mod logging;
pub mod resize;
pub mod session;

pub use config::{ConfigError, EditorConfig, ExportConfig, GeometryConfig};
pub use drag::{DragPayload, DropIgnoredReason, DropOutcome, DropTarget, apply_drop};
pub use editor::{DRAG_POINTER_ID, DropResponse, Editor, PointerResponse, ResizeApplied};
pub use logging::{LOG_ENV_VAR, LogFormat, LoggingConfig, LoggingError};
pub use resize::{CellResizeAxis, box_resize, cell_resize};
pub use session::{
    ActiveGesture, GestureCancelReason, GestureClass, GestureEffect, GestureMachine,
    GestureNoopReason, GestureState, GestureTransition, ListenerDirective,
};
