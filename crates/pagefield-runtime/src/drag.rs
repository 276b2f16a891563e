//! Drop handling for palette and move gestures.
//!
//! Nothing changes while a drag is in flight; intermediate positions belong
//! to the host's drag layer. On drop the payload shape picks the command:
//! an existing field id moves, a palette `(kind, label)` creates.

use pagefield_core::{GeometryMapper, PageSurfaces, Point, resolve_page};
use pagefield_layout::{FieldId, FieldKind, FieldModelError, FieldPosition, FieldRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum DragPayload {
    /// A placed field. `grab_offset` is the pointer position inside the
    /// field's box at drag start, in viewport pixels.
    Existing {
        id: FieldId,
        #[serde(default)]
        grab_offset: Point,
    },
    /// A palette item that becomes a new field on drop.
    Palette { kind: FieldKind, label: String },
}

impl DragPayload {
    /// Move payload grabbed at the box origin.
    #[must_use]
    pub const fn existing(id: FieldId) -> Self {
        Self::Existing {
            id,
            grab_offset: Point::ORIGIN,
        }
    }

    /// Palette payload labelled with the kind's default label.
    #[must_use]
    pub fn palette(kind: FieldKind) -> Self {
        Self::Palette {
            kind,
            label: kind.spec().label.to_owned(),
        }
    }
}

/// Where a drag was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    /// The rendered document.
    #[default]
    Document,
    /// The delete area; only placed fields are accepted.
    DeleteZone,
}

/// Why a drop changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropIgnoredReason {
    /// No rendered page contains the pointer, or its surface is degenerate.
    NoPageUnderPointer,
    /// The dragged field no longer exists.
    UnknownField,
    /// Palette items cannot be deleted.
    PaletteOnDeleteZone,
    /// A resize gesture owns the pointer.
    GestureInProgress,
    /// The registry refused the command for another reason.
    Rejected,
}

/// Result of one drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Moved { id: FieldId, position: FieldPosition },
    Created { id: FieldId, kind: FieldKind, position: FieldPosition },
    Deleted { id: FieldId },
    Ignored { reason: DropIgnoredReason },
}

impl DropOutcome {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    const fn ignored(reason: DropIgnoredReason) -> Self {
        Self::Ignored { reason }
    }
}

/// Apply one drop to `registry`.
///
/// Page surfaces are queried here, at drop time. `scale` is the viewer zoom,
/// used only by the pixel coordinate space.
pub fn apply_drop(
    registry: &mut FieldRegistry,
    surfaces: &dyn PageSurfaces,
    mapper: GeometryMapper,
    scale: f64,
    payload: &DragPayload,
    target: DropTarget,
    point: Point,
) -> DropOutcome {
    let outcome = match (payload, target) {
        (DragPayload::Existing { id, .. }, DropTarget::DeleteZone) => match registry.delete(*id) {
            Ok(_) => DropOutcome::Deleted { id: *id },
            Err(err) => rejected(err),
        },
        (DragPayload::Palette { .. }, DropTarget::DeleteZone) => {
            DropOutcome::ignored(DropIgnoredReason::PaletteOnDeleteZone)
        }
        (payload, DropTarget::Document) => match locate(surfaces, mapper, scale, payload, point) {
            None => DropOutcome::ignored(DropIgnoredReason::NoPageUnderPointer),
            Some(position) => match payload {
                DragPayload::Existing { id, .. } => match registry.move_to(*id, position) {
                    Ok(()) => DropOutcome::Moved {
                        id: *id,
                        // Report what the registry stored, after its position policy.
                        position: registry.get(*id).map_or(position, |f| f.position()),
                    },
                    Err(err) => rejected(err),
                },
                DragPayload::Palette { kind, label } => {
                    match registry.create(*kind, label.clone(), position) {
                        Ok(id) => DropOutcome::Created {
                            id,
                            kind: *kind,
                            position: registry.get(id).map_or(position, |f| f.position()),
                        },
                        Err(err) => rejected(err),
                    }
                }
            },
        },
    };
    debug!(
        target: "pagefield.drag",
        ?payload,
        ?target,
        x = point.x,
        y = point.y,
        ?outcome,
        "drop handled"
    );
    outcome
}

/// Map the drop point to a field position on the page under the pointer.
fn locate(
    surfaces: &dyn PageSurfaces,
    mapper: GeometryMapper,
    scale: f64,
    payload: &DragPayload,
    point: Point,
) -> Option<FieldPosition> {
    let hit = resolve_page(surfaces, point)?;
    let anchor = match payload {
        DragPayload::Existing { grab_offset, .. } => point.offset(-grab_offset.x, -grab_offset.y),
        DragPayload::Palette { .. } => point,
    };
    let relative = mapper.project(anchor, hit.surface, scale)?;
    Some(FieldPosition::on_page(hit.page, relative))
}

fn rejected(err: FieldModelError) -> DropOutcome {
    debug!(target: "pagefield.drag", error = %err, "drop rejected by registry");
    match err {
        FieldModelError::UnknownField { .. } => DropOutcome::ignored(DropIgnoredReason::UnknownField),
        _ => DropOutcome::ignored(DropIgnoredReason::Rejected),
    }
}
