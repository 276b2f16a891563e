#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Resize gestures consume raw pointer-down/move/up events delivered by the
//! host's pointer source. Drag-and-drop gestures arrive separately through the
//! drag layer with a typed payload and are not modelled here.
//!
//! # Design Notes
//!
//! - Coordinates are viewport pixels, the same space as page surface rects.
//! - `pointer_id` distinguishes concurrent pointers (touch, pen); mouse hosts
//!   can always pass `0`.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Phase of a raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    /// Button pressed.
    Down,
    /// Pointer moved while tracked.
    Move,
    /// Button released, anywhere in the document.
    Up,
}

/// A raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// The event phase.
    pub kind: PointerEventKind,
    /// Viewport position.
    pub position: Point,
    /// Identifier of the pointer that produced the event.
    #[serde(default)]
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Create a new pointer event for pointer `0`.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            pointer_id: 0,
        }
    }

    /// Pointer-down shorthand.
    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y)
    }

    /// Pointer-move shorthand.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    /// Pointer-up shorthand.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    /// Attach a pointer identifier.
    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind_and_position() {
        let down = PointerEvent::down(3.0, 4.0);
        assert_eq!(down.kind, PointerEventKind::Down);
        assert_eq!(down.position, Point::new(3.0, 4.0));
        assert_eq!(down.pointer_id, 0);
        assert_eq!(PointerEvent::moved(0.0, 0.0).kind, PointerEventKind::Move);
        assert_eq!(PointerEvent::up(0.0, 0.0).kind, PointerEventKind::Up);
    }

    #[test]
    fn pointer_id_builder() {
        let ev = PointerEvent::up(1.0, 1.0).with_pointer_id(7);
        assert_eq!(ev.pointer_id, 7);
    }

    #[test]
    fn pointer_id_defaults_when_missing_in_json() {
        let ev: PointerEvent =
            serde_json::from_str(r#"{"kind":"move","position":{"x":1.0,"y":2.0}}"#).unwrap();
        assert_eq!(ev, PointerEvent::moved(1.0, 2.0));
    }
}
