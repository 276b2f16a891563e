//! Gesture scripts and their replay against an [`Editor`].
//!
//! A script names the document, describes the rendered pages at scale 1.0,
//! and lists steps. Pointer coordinates are viewport pixels at the zoom in
//! effect when the step runs; page surfaces are rebuilt for every step.
//!
//! ```json
//! {
//!   "documentName": "lease.pdf",
//!   "pages": { "count": 2, "width": 612, "height": 792, "gap": 16 },
//!   "steps": [
//!     { "step": "content_ready" },
//!     { "step": "palette_drop", "kind": "table", "x": 100, "y": 120 },
//!     { "step": "cell_resize", "field": 1, "column": 2, "delta": -40 },
//!     { "step": "box_resize", "field": 1, "dx": 50, "dy": 20 }
//!   ]
//! }
//! ```

use std::path::Path;

use pagefield_core::{PageStack, Point, PointerEvent};
use pagefield_layout::{CellKey, CellType, FieldId, FieldKind, FieldModelError, SettingsPatch};
use pagefield_runtime::{CellResizeAxis, DragPayload, DropOutcome, DropTarget, Editor, GestureTransition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReplayError, Result};

/// A recorded editing session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Script {
    pub document_name: String,
    #[serde(default)]
    pub pages: PageLayout,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Most pages a script may describe.
pub const MAX_SCRIPT_PAGES: u32 = 10_000;

/// Uniform vertical page stack at scale 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageLayout {
    pub count: u32,
    pub width: f64,
    pub height: f64,
    pub gap: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        // US Letter at 72 dpi.
        Self {
            count: 1,
            width: 612.0,
            height: 792.0,
            gap: 16.0,
        }
    }
}

impl PageLayout {
    /// Reject page stacks that are oversized or not finite.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.count > MAX_SCRIPT_PAGES {
            return Err(format!(
                "pages.count {} exceeds the limit of {MAX_SCRIPT_PAGES}",
                self.count
            ));
        }
        let sizes = [("width", self.width), ("height", self.height)];
        if let Some((name, value)) = sizes.iter().find(|(_, v)| !v.is_finite() || *v <= 0.0) {
            return Err(format!("pages.{name} must be a positive number, got {value}"));
        }
        if !self.gap.is_finite() || self.gap < 0.0 {
            return Err(format!("pages.gap must be non-negative, got {}", self.gap));
        }
        Ok(())
    }

    /// Page surfaces as rendered at `scale`.
    #[must_use]
    pub fn surfaces(&self, scale: f64) -> PageStack {
        PageStack::vertical(self.count, self.width, self.height, self.gap).scaled(scale)
    }
}

/// One user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    ContentReady {
        #[serde(default)]
        pages: Option<u32>,
    },
    ZoomIn,
    ZoomOut,
    PaletteDrop {
        kind: FieldKind,
        #[serde(default)]
        label: Option<String>,
        x: f64,
        y: f64,
    },
    MoveDrop {
        field: FieldId,
        x: f64,
        y: f64,
        #[serde(default)]
        grab_x: f64,
        #[serde(default)]
        grab_y: f64,
    },
    DeleteDrop {
        field: FieldId,
    },
    BoxResize {
        field: FieldId,
        dx: f64,
        dy: f64,
    },
    CellResize {
        field: FieldId,
        #[serde(default)]
        column: Option<u32>,
        #[serde(default)]
        row: Option<u32>,
        delta: f64,
    },
    ClickField {
        field: FieldId,
    },
    ClickBackground,
    ClickCell {
        field: FieldId,
        cell: CellKey,
    },
    SetTitle {
        field: FieldId,
        title: String,
    },
    Settings {
        field: FieldId,
        patch: SettingsPatch,
    },
    CellTitle {
        field: FieldId,
        cell: CellKey,
        title: String,
    },
    CellType {
        field: FieldId,
        cell: CellKey,
        #[serde(rename = "type")]
        cell_type: CellType,
    },
    Blur,
}

impl Step {
    /// Script name of the step.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ContentReady { .. } => "content_ready",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::PaletteDrop { .. } => "palette_drop",
            Self::MoveDrop { .. } => "move_drop",
            Self::DeleteDrop { .. } => "delete_drop",
            Self::BoxResize { .. } => "box_resize",
            Self::CellResize { .. } => "cell_resize",
            Self::ClickField { .. } => "click_field",
            Self::ClickBackground => "click_background",
            Self::ClickCell { .. } => "click_cell",
            Self::SetTitle { .. } => "set_title",
            Self::Settings { .. } => "settings",
            Self::CellTitle { .. } => "cell_title",
            Self::CellType { .. } => "cell_type",
            Self::Blur => "blur",
        }
    }
}

impl Script {
    /// Parse a script from JSON text and check its page layout.
    pub fn from_json_str(s: &str, origin: &Path) -> Result<Self> {
        let script: Self = serde_json::from_str(s).map_err(|source| ReplayError::ScriptParse {
            path: origin.to_path_buf(),
            source,
        })?;
        script
            .pages
            .validate()
            .map_err(|message| ReplayError::ScriptInvalid {
                path: origin.to_path_buf(),
                message,
            })?;
        Ok(script)
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReplayError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, path)
    }
}

/// A step that ran but left the layout unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredStep {
    pub index: usize,
    pub step: &'static str,
    pub reason: String,
}

/// What a replay did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub applied: usize,
    pub ignored: Vec<IgnoredStep>,
}

/// Run `script` against `editor`.
///
/// Steps the editor ignores are collected in the summary rather than
/// failing the replay. Malformed steps are errors.
pub fn replay(editor: &mut Editor, script: &Script) -> Result<ReplaySummary> {
    editor.open_document(script.document_name.clone());
    let mut summary = ReplaySummary::default();
    for (index, step) in script.steps.iter().enumerate() {
        match run_step(editor, &script.pages, step).map_err(|e| e.into_error(index, step))? {
            Ok(()) => summary.applied += 1,
            Err(reason) => {
                warn!(target: "pagefield.replay", index, step = step.name(), %reason, "step ignored");
                summary.ignored.push(IgnoredStep {
                    index,
                    step: step.name(),
                    reason,
                });
            }
        }
        debug!(target: "pagefield.replay", index, step = step.name(), version = editor.registry().version(), "step done");
    }
    // A script may end mid-gesture; leave the session idle either way.
    editor.force_cancel();
    Ok(summary)
}

struct Malformed(String);

impl Malformed {
    fn into_error(self, index: usize, step: &Step) -> ReplayError {
        ReplayError::invalid_step(index, step.name(), self.0)
    }
}

type StepResult = std::result::Result<std::result::Result<(), String>, Malformed>;

fn run_step(editor: &mut Editor, layout: &PageLayout, step: &Step) -> StepResult {
    let surfaces = layout.surfaces(editor.viewer().scale());
    let outcome = match step {
        Step::ContentReady { pages } => {
            editor.content_ready(pages.unwrap_or(layout.count));
            Ok(())
        }
        Step::ZoomIn => {
            editor.zoom_in();
            Ok(())
        }
        Step::ZoomOut => {
            editor.zoom_out();
            Ok(())
        }
        Step::PaletteDrop { kind, label, x, y } => {
            let payload = DragPayload::Palette {
                kind: *kind,
                label: label.clone().unwrap_or_else(|| kind.spec().label.to_owned()),
            };
            drag(editor, &surfaces, payload, DropTarget::Document, Point::new(*x, *y))
        }
        Step::MoveDrop {
            field,
            x,
            y,
            grab_x,
            grab_y,
        } => {
            let payload = DragPayload::Existing {
                id: *field,
                grab_offset: Point::new(*grab_x, *grab_y),
            };
            drag(editor, &surfaces, payload, DropTarget::Document, Point::new(*x, *y))
        }
        Step::DeleteDrop { field } => drag(
            editor,
            &surfaces,
            DragPayload::existing(*field),
            DropTarget::DeleteZone,
            Point::ORIGIN,
        ),
        Step::BoxResize { field, dx, dy } => {
            let began = editor.begin_box_resize(*field, PointerEvent::down(0.0, 0.0));
            pointer_drag(editor, &began, *dx, *dy)
        }
        Step::CellResize {
            field,
            column,
            row,
            delta,
        } => {
            let axis = match (column, row) {
                (Some(col), None) => CellResizeAxis::Horizontal { col: *col },
                (None, Some(row)) => CellResizeAxis::Vertical { row: *row },
                _ => return Err(Malformed("exactly one of `column` or `row` is required".into())),
            };
            let began = editor.begin_cell_resize(*field, axis, PointerEvent::down(0.0, 0.0));
            let (dx, dy) = match axis {
                CellResizeAxis::Horizontal { .. } => (*delta, 0.0),
                CellResizeAxis::Vertical { .. } => (0.0, *delta),
            };
            pointer_drag(editor, &began, dx, dy)
        }
        Step::ClickField { field } => command(editor.click_field(*field)),
        Step::ClickBackground => {
            editor.click_background();
            Ok(())
        }
        Step::ClickCell { field, cell } => command(editor.click_cell(*field, *cell)),
        Step::SetTitle { field, title } => command(editor.set_title(*field, title.clone())),
        Step::Settings { field, patch } => command(editor.update_settings(*field, patch)),
        Step::CellTitle { field, cell, title } => {
            command(editor.set_cell_title(*field, *cell, title.clone()))
        }
        Step::CellType {
            field,
            cell,
            cell_type,
        } => command(editor.set_cell_type(*field, *cell, *cell_type)),
        Step::Blur => {
            editor.blur();
            Ok(())
        }
    };
    Ok(outcome)
}

fn command(result: std::result::Result<(), FieldModelError>) -> std::result::Result<(), String> {
    result.map_err(|e| e.to_string())
}

fn drag(
    editor: &mut Editor,
    surfaces: &PageStack,
    payload: DragPayload,
    target: DropTarget,
    point: Point,
) -> std::result::Result<(), String> {
    let started = editor.drag_start(payload, point);
    if started.is_noop() {
        return Err(format!("{:?}", started.effect));
    }
    editor.drag_move(point);
    match editor.drop(surfaces, target, point, None).outcome {
        DropOutcome::Ignored { reason } => Err(format!("drop ignored: {reason:?}")),
        _ => Ok(()),
    }
}

fn pointer_drag(
    editor: &mut Editor,
    began: &GestureTransition,
    dx: f64,
    dy: f64,
) -> std::result::Result<(), String> {
    if began.is_noop() {
        return Err(format!("{:?}", began.effect));
    }
    let frame = editor.pointer_move(PointerEvent::moved(dx, dy));
    editor.pointer_up(PointerEvent::up(dx, dy));
    match frame.applied {
        Some(_) => Ok(()),
        None => Err("resize frame not applied".to_owned()),
    }
}
