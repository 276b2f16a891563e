//! The editor command surface.
//!
//! [`Editor`] is what a UI layer drives. It owns the field registry, the
//! gesture session, and the viewer state, and it translates host events into
//! registry commands. Page surfaces are passed into every geometric call so
//! they are always read fresh for the current zoom and scroll.
//!
//! Gesture-level failures never surface as errors: they come back as `Noop`
//! transitions or ignored drop outcomes and are logged at debug level.
//! Direct edits from the settings surface return the registry's
//! [`FieldModelError`] so the caller can choose to ignore it.

use std::io::Write;

use pagefield_core::{GeometryMapper, PageSurfaces, Point, PointerEvent, PointerEventKind};
use pagefield_layout::{
    CellKey, CellType, ExportError, FieldId, FieldModelError, FieldRegistry, FieldSize, GridError,
    LayoutDocument, LayoutExporter, RegistryChange, SettingsPatch, Subscription, ViewerState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EditorConfig;
use crate::drag::{DragPayload, DropIgnoredReason, DropOutcome, DropTarget, apply_drop};
use crate::resize::{CellResizeAxis, box_resize, cell_resize};
use crate::session::{
    ActiveGesture, GestureCancelReason, GestureClass, GestureMachine, GestureNoopReason, GestureState,
    GestureTransition,
};

/// Drag-layer events carry no pointer identity; drags use this id.
pub const DRAG_POINTER_ID: u32 = 0;

/// A size change applied during a resize frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "applied", rename_all = "snake_case")]
pub enum ResizeApplied {
    Box { id: FieldId, size: FieldSize },
    Cell { id: FieldId, axis: CellResizeAxis, extent: u32 },
}

/// Result of a raw pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerResponse {
    pub transition: GestureTransition,
    pub applied: Option<ResizeApplied>,
}

/// Result of a drop.
#[derive(Debug, Clone, PartialEq)]
pub struct DropResponse {
    /// The drag gesture ending, when one was active.
    pub transition: Option<GestureTransition>,
    pub outcome: DropOutcome,
}

/// Field layout editor for one open document.
#[derive(Debug)]
pub struct Editor {
    document_name: String,
    registry: FieldRegistry,
    gestures: GestureMachine,
    viewer: ViewerState,
    mapper: GeometryMapper,
    exporter: LayoutExporter,
    pretty: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Editor {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        let space = config.geometry.coordinate_space;
        Self {
            document_name: String::new(),
            registry: FieldRegistry::with_policy(config.geometry.position_policy()),
            gestures: GestureMachine::new(),
            viewer: ViewerState::new(config.zoom),
            mapper: GeometryMapper::new(space),
            exporter: LayoutExporter::new(config.export.fidelity, space),
            pretty: config.export.pretty,
        }
    }

    // --- document and viewer -------------------------------------------------

    /// A new document was opened. Any in-flight gesture is abandoned.
    pub fn open_document(&mut self, name: impl Into<String>) -> Option<GestureTransition> {
        self.document_name = name.into();
        debug!(target: "pagefield.editor", document = %self.document_name, "document opened");
        self.gestures.force_cancel()
    }

    #[must_use]
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    /// Content-ready signal from the renderer.
    pub fn content_ready(&mut self, page_count: u32) {
        self.viewer.content_ready(page_count);
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.viewer.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.viewer.zoom_out()
    }

    #[must_use]
    pub const fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    #[must_use]
    pub const fn mapper(&self) -> GeometryMapper {
        self.mapper
    }

    // --- registry access -----------------------------------------------------

    #[must_use]
    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Observe registry changes. Dropping the guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&RegistryChange) + 'static) -> Subscription {
        self.registry.subscribe(callback)
    }

    #[must_use]
    pub const fn gesture_state(&self) -> &GestureState {
        self.gestures.state()
    }

    // --- drag gestures -------------------------------------------------------

    /// The drag layer picked up `payload`.
    pub fn drag_start(&mut self, payload: DragPayload, point: Point) -> GestureTransition {
        if let DragPayload::Existing { id, .. } = &payload
            && !self.registry.contains(*id)
        {
            return self.gestures.noop(GestureNoopReason::UnknownTarget);
        }
        self.gestures
            .begin(ActiveGesture::Drag { payload }, DRAG_POINTER_ID, point)
    }

    /// Live drag position. Visual only; no state changes.
    pub fn drag_move(&mut self, point: Point) -> GestureTransition {
        self.gestures.update(GestureClass::Drag, DRAG_POINTER_ID, point)
    }

    /// The drag layer ended the drag without a drop.
    pub fn drag_cancel(&mut self) -> GestureTransition {
        match self.gestures.state().gesture().map(ActiveGesture::class) {
            Some(GestureClass::Drag) => self.gestures.cancel(GestureCancelReason::DragAborted),
            Some(GestureClass::Resize) => self.gestures.noop(GestureNoopReason::GestureClassMismatch),
            None => self.gestures.noop(GestureNoopReason::IdleWithoutActiveGesture),
        }
    }

    /// Release a drag over `target`.
    ///
    /// With an active drag the payload comes from the session. With no
    /// active gesture the drop is handled one-shot with `payload`. A drop
    /// while a resize owns the pointer is ignored.
    pub fn drop(
        &mut self,
        surfaces: &dyn PageSurfaces,
        target: DropTarget,
        point: Point,
        payload: Option<DragPayload>,
    ) -> DropResponse {
        let (transition, payload) = match self.gestures.state().gesture().map(ActiveGesture::class) {
            Some(GestureClass::Resize) => {
                return DropResponse {
                    transition: Some(self.gestures.noop(GestureNoopReason::GestureClassMismatch)),
                    outcome: DropOutcome::Ignored {
                        reason: DropIgnoredReason::GestureInProgress,
                    },
                };
            }
            Some(GestureClass::Drag) => {
                let transition = self.gestures.end(GestureClass::Drag, DRAG_POINTER_ID, point);
                let payload = match &transition.from {
                    GestureState::Active {
                        gesture: ActiveGesture::Drag { payload },
                        ..
                    } => Some(payload.clone()),
                    _ => None,
                };
                (Some(transition), payload)
            }
            None => (None, payload),
        };
        let outcome = match payload {
            Some(payload) => apply_drop(
                &mut self.registry,
                surfaces,
                self.mapper,
                self.viewer.scale(),
                &payload,
                target,
                point,
            ),
            None => DropOutcome::Ignored {
                reason: DropIgnoredReason::Rejected,
            },
        };
        DropResponse {
            transition,
            outcome,
        }
    }

    // --- resize gestures -----------------------------------------------------

    /// Pointer-down on the box resize handle of `id`.
    pub fn begin_box_resize(&mut self, id: FieldId, event: PointerEvent) -> GestureTransition {
        let Some(field) = self.registry.get(id) else {
            return self.gestures.noop(GestureNoopReason::UnknownTarget);
        };
        let gesture = ActiveGesture::BoxResize {
            field: id,
            start_size: field.size(),
        };
        self.gestures.begin(gesture, event.pointer_id, event.position)
    }

    /// Pointer-down on a column or row boundary of table `id`.
    pub fn begin_cell_resize(&mut self, id: FieldId, axis: CellResizeAxis, event: PointerEvent) -> GestureTransition {
        let start_extent = self.registry.get(id).and_then(|f| f.grid()).and_then(|grid| match axis {
            CellResizeAxis::Horizontal { col } => grid.column_width(col),
            CellResizeAxis::Vertical { row } => grid.row_height(row),
        });
        let Some(start_extent) = start_extent else {
            return self.gestures.noop(GestureNoopReason::UnknownTarget);
        };
        let gesture = ActiveGesture::CellResize {
            field: id,
            axis,
            start_extent,
        };
        self.gestures.begin(gesture, event.pointer_id, event.position)
    }

    /// Document-wide pointer-move during a resize.
    pub fn pointer_move(&mut self, event: PointerEvent) -> PointerResponse {
        let transition = self
            .gestures
            .update(GestureClass::Resize, event.pointer_id, event.position);
        let applied = match &transition.to {
            GestureState::Active {
                gesture,
                origin,
                current,
                ..
            } if !transition.is_noop() => self.apply_resize(gesture, *origin, *current),
            _ => None,
        };
        PointerResponse {
            transition,
            applied,
        }
    }

    /// Document-wide pointer-up: ends the resize wherever it is released.
    pub fn pointer_up(&mut self, event: PointerEvent) -> PointerResponse {
        PointerResponse {
            transition: self
                .gestures
                .end(GestureClass::Resize, event.pointer_id, event.position),
            applied: None,
        }
    }

    /// Dispatch a raw pointer event to move/up. Pointer-down needs a target
    /// and goes through the `begin_*` methods instead.
    pub fn pointer_event(&mut self, event: PointerEvent) -> PointerResponse {
        match event.kind {
            PointerEventKind::Move => self.pointer_move(event),
            PointerEventKind::Up => self.pointer_up(event),
            PointerEventKind::Down => PointerResponse {
                transition: self.gestures.noop(GestureNoopReason::UnknownTarget),
                applied: None,
            },
        }
    }

    /// Window focus lost: cancel any active gesture.
    pub fn blur(&mut self) -> GestureTransition {
        self.gestures.blur()
    }

    /// Reset the session after a missed release.
    pub fn force_cancel(&mut self) -> Option<GestureTransition> {
        self.gestures.force_cancel()
    }

    fn apply_resize(&mut self, gesture: &ActiveGesture, origin: Point, current: Point) -> Option<ResizeApplied> {
        let scale = self.viewer.scale();
        let result = match *gesture {
            ActiveGesture::BoxResize { field, start_size } => {
                let kind = self.registry.get(field)?.kind();
                let size = box_resize(kind, start_size, origin, current, scale);
                self.registry
                    .resize(field, size)
                    .map(|size| ResizeApplied::Box { id: field, size })
            }
            ActiveGesture::CellResize {
                field,
                axis,
                start_extent,
            } => {
                let extent = cell_resize(axis, start_extent, origin, current, scale);
                match axis {
                    CellResizeAxis::Horizontal { col } => self.registry.resize_column(field, col, extent),
                    CellResizeAxis::Vertical { row } => self.registry.resize_row(field, row, extent),
                }
                .map(|extent| ResizeApplied::Cell {
                    id: field,
                    axis,
                    extent,
                })
            }
            ActiveGesture::Drag { .. } => return None,
        };
        match result {
            Ok(applied) => Some(applied),
            Err(err) => {
                debug!(target: "pagefield.editor", error = %err, "resize frame ignored");
                None
            }
        }
    }

    // --- selection -----------------------------------------------------------

    /// Click on a field's box.
    pub fn click_field(&mut self, id: FieldId) -> Result<(), FieldModelError> {
        self.registry.select_field(Some(id))
    }

    /// Click outside any field.
    pub fn click_background(&mut self) {
        self.registry.clear_selection();
    }

    /// Click on a table cell: selects the table and makes `key` its active
    /// cell. Nothing changes if either step would fail.
    pub fn click_cell(&mut self, id: FieldId, key: CellKey) -> Result<(), FieldModelError> {
        let field = self.registry.get(id).ok_or(FieldModelError::UnknownField { id })?;
        let grid = field.grid().ok_or(FieldModelError::NotATable {
            id,
            kind: field.kind(),
        })?;
        if grid.cell(key).is_none() {
            return Err(GridError::CellOutOfRange {
                key,
                rows: grid.rows(),
                columns: grid.columns(),
            }
            .into());
        }
        self.registry.select_field(Some(id))?;
        self.registry.select_cell(id, key)
    }

    // --- settings surface ----------------------------------------------------

    pub fn set_title(&mut self, id: FieldId, title: impl Into<String>) -> Result<(), FieldModelError> {
        self.registry.update_title(id, title)
    }

    pub fn update_settings(&mut self, id: FieldId, patch: &SettingsPatch) -> Result<(), FieldModelError> {
        self.registry.update_settings(id, patch)
    }

    pub fn set_cell_title(&mut self, id: FieldId, key: CellKey, title: impl Into<String>) -> Result<(), FieldModelError> {
        self.registry.update_cell_title(id, key, title)
    }

    pub fn set_cell_type(&mut self, id: FieldId, key: CellKey, cell_type: CellType) -> Result<(), FieldModelError> {
        self.registry.update_cell_type(id, key, cell_type)
    }

    /// Remove a field outside of a drag (e.g. a keyboard shortcut).
    pub fn delete_field(&mut self, id: FieldId) -> Result<(), FieldModelError> {
        self.registry.delete(id).map(|_| ())
    }

    // --- export --------------------------------------------------------------

    #[must_use]
    pub const fn exporter(&self) -> LayoutExporter {
        self.exporter
    }

    #[must_use]
    pub fn export(&self) -> LayoutDocument {
        self.exporter.export(&self.document_name, &self.registry)
    }

    /// Export using an explicit exporter (e.g. full fidelity on demand).
    #[must_use]
    pub fn export_with(&self, exporter: LayoutExporter) -> LayoutDocument {
        exporter.export(&self.document_name, &self.registry)
    }

    /// Exported JSON, pretty-printed when configured.
    pub fn export_json(&self) -> Result<String, ExportError> {
        let doc = self.export();
        if self.pretty {
            doc.to_json_pretty()
        } else {
            doc.to_json()
        }
    }

    /// Write the exported JSON to `writer`.
    pub fn write_export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        self.export().write_json(writer, self.pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{GestureEffect, ListenerDirective};
    use pagefield_core::PageStack;
    use pagefield_layout::FieldKind;

    fn pages() -> PageStack {
        PageStack::vertical(3, 600.0, 800.0, 10.0)
    }

    fn editor_with(kind: FieldKind) -> (Editor, FieldId) {
        let mut editor = Editor::default();
        editor.open_document("form.pdf");
        editor.content_ready(3);
        let response = editor.drop(&pages(), DropTarget::Document, Point::new(60.0, 80.0), Some(DragPayload::palette(kind)));
        let DropOutcome::Created { id, .. } = response.outcome else {
            panic!("expected create, got {:?}", response.outcome);
        };
        (editor, id)
    }

    #[test]
    fn full_drag_gesture_creates_field() {
        let mut editor = Editor::default();
        let start = editor.drag_start(DragPayload::palette(FieldKind::Text), Point::new(-50.0, 10.0));
        assert_eq!(start.listeners, ListenerDirective::Attach);
        editor.drag_move(Point::new(100.0, 100.0));
        assert_eq!(editor.registry().len(), 0);
        let response = editor.drop(&pages(), DropTarget::Document, Point::new(300.0, 400.0), None);
        assert_eq!(response.transition.unwrap().listeners, ListenerDirective::Detach);
        assert!(matches!(response.outcome, DropOutcome::Created { .. }));
        assert_eq!(editor.registry().len(), 1);
    }

    #[test]
    fn drop_during_resize_is_ignored() {
        let (mut editor, id) = editor_with(FieldKind::Text);
        editor.begin_box_resize(id, PointerEvent::down(200.0, 200.0));
        let response = editor.drop(&pages(), DropTarget::DeleteZone, Point::ORIGIN, Some(DragPayload::existing(id)));
        assert_eq!(
            response.outcome,
            DropOutcome::Ignored {
                reason: DropIgnoredReason::GestureInProgress
            }
        );
        assert!(editor.registry().contains(id));
        assert!(editor.gesture_state().is_active());
    }

    #[test]
    fn box_resize_tracks_pointer_and_floors() {
        let (mut editor, id) = editor_with(FieldKind::Signature);
        editor.begin_box_resize(id, PointerEvent::down(500.0, 500.0));
        let grow = editor.pointer_move(PointerEvent::moved(520.0, 510.0));
        assert_eq!(
            grow.applied,
            Some(ResizeApplied::Box {
                id,
                size: FieldSize::new(170.0, 160.0)
            })
        );
        let shrink = editor.pointer_move(PointerEvent::moved(-500.0, -500.0));
        assert_eq!(
            shrink.applied,
            Some(ResizeApplied::Box {
                id,
                size: FieldSize::new(60.0, 60.0)
            })
        );
        let up = editor.pointer_up(PointerEvent::up(9_999.0, 9_999.0));
        assert_eq!(up.transition.listeners, ListenerDirective::Detach);
        assert_eq!(editor.registry().get(id).unwrap().size(), FieldSize::new(60.0, 60.0));
    }

    #[test]
    fn cell_resize_changes_one_column() {
        let (mut editor, id) = editor_with(FieldKind::Table);
        let axis = CellResizeAxis::Horizontal { col: 2 };
        editor.begin_cell_resize(id, axis, PointerEvent::down(300.0, 300.0));
        let frame = editor.pointer_move(PointerEvent::moved(100.0, 300.0));
        assert_eq!(frame.applied, Some(ResizeApplied::Cell { id, axis, extent: 30 }));
        editor.pointer_up(PointerEvent::up(100.0, 300.0));
        let grid = editor.registry().get(id).unwrap().grid().unwrap();
        assert_eq!(grid.cell_widths(), &[100, 100, 30, 100]);
    }

    #[test]
    fn cell_resize_on_missing_column_is_noop() {
        let (mut editor, id) = editor_with(FieldKind::Table);
        let t = editor.begin_cell_resize(id, CellResizeAxis::Vertical { row: 9 }, PointerEvent::down(0.0, 0.0));
        assert_eq!(t.effect, GestureEffect::Noop { reason: GestureNoopReason::UnknownTarget });
        assert!(!editor.gesture_state().is_active());
    }

    #[test]
    fn blur_cancels_and_detaches() {
        let (mut editor, id) = editor_with(FieldKind::Text);
        editor.begin_box_resize(id, PointerEvent::down(0.0, 0.0));
        let t = editor.blur();
        assert_eq!(t.listeners, ListenerDirective::Detach);
        let after = editor.pointer_move(PointerEvent::moved(400.0, 400.0));
        assert!(after.transition.is_noop());
        assert_eq!(after.applied, None);
    }

    #[test]
    fn zoomed_resize_uses_reference_pixels() {
        let (mut editor, id) = editor_with(FieldKind::Text);
        for _ in 0..10 {
            editor.zoom_in();
        }
        assert_eq!(editor.viewer().scale(), 2.0);
        editor.begin_box_resize(id, PointerEvent::down(0.0, 0.0));
        let frame = editor.pointer_move(PointerEvent::moved(100.0, 20.0));
        assert_eq!(
            frame.applied,
            Some(ResizeApplied::Box {
                id,
                size: FieldSize::new(200.0, 40.0)
            })
        );
    }

    #[test]
    fn click_cell_selects_table_and_cell() {
        let (mut editor, table) = editor_with(FieldKind::Table);
        editor.click_background();
        editor.click_cell(table, CellKey::new(1, 2)).unwrap();
        let view = editor.registry().selected().unwrap();
        assert_eq!(view.field.id(), table);
        assert_eq!(view.cell, Some(CellKey::new(1, 2)));

        editor.click_background();
        assert!(editor.click_cell(table, CellKey::new(8, 8)).is_err());
        assert_eq!(editor.registry().selected_field_id(), None);
    }

    #[test]
    fn export_json_is_pretty_by_default() {
        let (editor, _) = editor_with(FieldKind::Number);
        let json = editor.export_json().unwrap();
        assert!(json.starts_with("{\n  \"documentName\": \"form.pdf\""));
        assert!(json.contains("\"kind\": \"number\""));
    }
}
