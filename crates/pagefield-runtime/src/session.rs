#![forbid(unsafe_code)]

//! Single-gesture session state machine.
//!
//! ```text
//! Idle --begin--> Active --end/cancel/blur/force_cancel--> Idle
//! ```
//!
//! At most one gesture (box resize, cell resize, or drag) is active. Every
//! step yields a [`GestureTransition`] with a monotonically increasing
//! `transition_id` and a [`ListenerDirective`]: hosts attach their
//! document-wide pointer listeners on `Attach` and remove them on `Detach`.
//! `Detach` is reported on *every* path out of `Active`, including blur and
//! [`GestureMachine::force_cancel`], so listeners cannot leak when a release
//! is missed.

use pagefield_core::Point;
use pagefield_layout::{FieldId, FieldSize};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::drag::DragPayload;
use crate::resize::CellResizeAxis;

/// The gesture owning the pointer, with the values captured at its start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum ActiveGesture {
    BoxResize {
        field: FieldId,
        start_size: FieldSize,
    },
    CellResize {
        field: FieldId,
        axis: CellResizeAxis,
        start_extent: u32,
    },
    Drag {
        payload: DragPayload,
    },
}

impl ActiveGesture {
    #[must_use]
    pub const fn class(&self) -> GestureClass {
        match self {
            Self::BoxResize { .. } | Self::CellResize { .. } => GestureClass::Resize,
            Self::Drag { .. } => GestureClass::Drag,
        }
    }
}

/// Which event stream drives a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureClass {
    /// Raw pointer down/move/up.
    Resize,
    /// Drag-layer start/move/drop.
    Drag,
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    Active {
        gesture: ActiveGesture,
        pointer_id: u32,
        origin: Point,
        current: Point,
    },
}

impl GestureState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub const fn gesture(&self) -> Option<&ActiveGesture> {
        match self {
            Self::Idle => None,
            Self::Active { gesture, .. } => Some(gesture),
        }
    }
}

/// Why an active gesture ended without committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureCancelReason {
    /// The window lost focus.
    Blur,
    /// The drag layer ended the drag without a drop.
    DragAborted,
    /// Host-requested reset.
    Programmatic,
}

/// Events that were safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureNoopReason {
    IdleWithoutActiveGesture,
    GestureAlreadyActive,
    PointerMismatch,
    /// A resize event arrived during a drag, or the reverse.
    GestureClassMismatch,
    /// The field or cell the gesture would act on does not exist.
    UnknownTarget,
}

/// Effect emitted by one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum GestureEffect {
    Began {
        gesture: ActiveGesture,
        pointer_id: u32,
        origin: Point,
    },
    Updated {
        gesture: ActiveGesture,
        origin: Point,
        current: Point,
    },
    Committed {
        gesture: ActiveGesture,
        origin: Point,
        end: Point,
    },
    Canceled {
        gesture: Option<ActiveGesture>,
        reason: GestureCancelReason,
    },
    Noop {
        reason: GestureNoopReason,
    },
}

/// What the host should do with its document-wide pointer listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerDirective {
    Attach,
    Detach,
    Unchanged,
}

impl ListenerDirective {
    fn between(from: &GestureState, to: &GestureState) -> Self {
        match (from.is_active(), to.is_active()) {
            (false, true) => Self::Attach,
            (true, false) => Self::Detach,
            _ => Self::Unchanged,
        }
    }
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTransition {
    pub transition_id: u64,
    pub from: GestureState,
    pub to: GestureState,
    pub effect: GestureEffect,
    pub listeners: ListenerDirective,
}

impl GestureTransition {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.effect, GestureEffect::Noop { .. })
    }
}

/// Owner of the single gesture session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureMachine {
    state: GestureState,
    transition_counter: u64,
}

impl GestureMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> &GestureState {
        &self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Transitions emitted so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Start `gesture`. Rejected while another gesture is active.
    pub fn begin(&mut self, gesture: ActiveGesture, pointer_id: u32, origin: Point) -> GestureTransition {
        if self.state.is_active() {
            return self.noop(GestureNoopReason::GestureAlreadyActive);
        }
        let effect = GestureEffect::Began {
            gesture: gesture.clone(),
            pointer_id,
            origin,
        };
        self.step(
            GestureState::Active {
                gesture,
                pointer_id,
                origin,
                current: origin,
            },
            effect,
        )
    }

    /// Track the pointer of the active `class` gesture.
    pub fn update(&mut self, class: GestureClass, pointer_id: u32, position: Point) -> GestureTransition {
        let (gesture, origin) = match self.check(class, pointer_id) {
            Ok(active) => active,
            Err(reason) => return self.noop(reason),
        };
        self.step(
            GestureState::Active {
                gesture: gesture.clone(),
                pointer_id,
                origin,
                current: position,
            },
            GestureEffect::Updated {
                gesture,
                origin,
                current: position,
            },
        )
    }

    /// Finish the active `class` gesture at `position`.
    pub fn end(&mut self, class: GestureClass, pointer_id: u32, position: Point) -> GestureTransition {
        let (gesture, origin) = match self.check(class, pointer_id) {
            Ok(active) => active,
            Err(reason) => return self.noop(reason),
        };
        self.step(
            GestureState::Idle,
            GestureEffect::Committed {
                gesture,
                origin,
                end: position,
            },
        )
    }

    /// Abandon the active gesture, whatever its class or pointer.
    pub fn cancel(&mut self, reason: GestureCancelReason) -> GestureTransition {
        match self.state.gesture().cloned() {
            None => self.noop(GestureNoopReason::IdleWithoutActiveGesture),
            Some(gesture) => self.step(
                GestureState::Idle,
                GestureEffect::Canceled {
                    gesture: Some(gesture),
                    reason,
                },
            ),
        }
    }

    /// Focus loss ends the gesture.
    pub fn blur(&mut self) -> GestureTransition {
        self.cancel(GestureCancelReason::Blur)
    }

    /// Unconditionally return to `Idle`.
    ///
    /// Safety valve for cleanup paths where no pointer event is available.
    /// Returns `None` when already idle.
    pub fn force_cancel(&mut self) -> Option<GestureTransition> {
        self.state
            .is_active()
            .then(|| self.cancel(GestureCancelReason::Programmatic))
    }

    /// Record an event that was ignored before reaching the machine.
    pub fn noop(&mut self, reason: GestureNoopReason) -> GestureTransition {
        let current = self.state.clone();
        self.step(current, GestureEffect::Noop { reason })
    }

    fn check(&self, class: GestureClass, pointer_id: u32) -> Result<(ActiveGesture, Point), GestureNoopReason> {
        match &self.state {
            GestureState::Idle => Err(GestureNoopReason::IdleWithoutActiveGesture),
            GestureState::Active { gesture, .. } if gesture.class() != class => {
                Err(GestureNoopReason::GestureClassMismatch)
            }
            GestureState::Active {
                pointer_id: owner, ..
            } if *owner != pointer_id => Err(GestureNoopReason::PointerMismatch),
            GestureState::Active {
                gesture, origin, ..
            } => Ok((gesture.clone(), *origin)),
        }
    }

    fn step(&mut self, to: GestureState, effect: GestureEffect) -> GestureTransition {
        let from = std::mem::replace(&mut self.state, to.clone());
        self.transition_counter = self.transition_counter.saturating_add(1);
        let listeners = ListenerDirective::between(&from, &to);
        if !matches!(effect, GestureEffect::Updated { .. }) {
            debug!(
                target: "pagefield.gesture",
                transition_id = self.transition_counter,
                ?effect,
                ?listeners,
                "gesture transition"
            );
        }
        GestureTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effect,
            listeners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_gesture() -> ActiveGesture {
        ActiveGesture::BoxResize {
            field: FieldId::MIN,
            start_size: FieldSize::new(150.0, 30.0),
        }
    }

    #[test]
    fn begin_update_end_round_trip() {
        let mut m = GestureMachine::new();
        let began = m.begin(box_gesture(), 1, Point::new(10.0, 10.0));
        assert_eq!(began.listeners, ListenerDirective::Attach);
        assert_eq!(began.transition_id, 1);

        let moved = m.update(GestureClass::Resize, 1, Point::new(20.0, 30.0));
        assert_eq!(moved.listeners, ListenerDirective::Unchanged);
        assert!(matches!(moved.effect, GestureEffect::Updated { current, .. } if current == Point::new(20.0, 30.0)));

        let ended = m.end(GestureClass::Resize, 1, Point::new(25.0, 35.0));
        assert_eq!(ended.listeners, ListenerDirective::Detach);
        assert!(matches!(ended.effect, GestureEffect::Committed { .. }));
        assert!(!m.is_active());
        assert_eq!(m.transition_count(), 3);
    }

    #[test]
    fn second_begin_is_rejected() {
        let mut m = GestureMachine::new();
        m.begin(box_gesture(), 0, Point::ORIGIN);
        let again = m.begin(ActiveGesture::Drag { payload: crate::drag::DragPayload::existing(FieldId::MIN) }, 0, Point::ORIGIN);
        assert_eq!(
            again.effect,
            GestureEffect::Noop {
                reason: GestureNoopReason::GestureAlreadyActive
            }
        );
        assert_eq!(again.listeners, ListenerDirective::Unchanged);
        assert_eq!(m.state().gesture(), Some(&box_gesture()));
    }

    #[test]
    fn mismatched_pointer_and_class_are_noops() {
        let mut m = GestureMachine::new();
        m.begin(box_gesture(), 4, Point::ORIGIN);
        let wrong_pointer = m.update(GestureClass::Resize, 5, Point::ORIGIN);
        assert_eq!(wrong_pointer.effect, GestureEffect::Noop { reason: GestureNoopReason::PointerMismatch });
        let wrong_class = m.end(GestureClass::Drag, 4, Point::ORIGIN);
        assert_eq!(wrong_class.effect, GestureEffect::Noop { reason: GestureNoopReason::GestureClassMismatch });
        assert!(m.is_active());
    }

    #[test]
    fn idle_events_are_noops() {
        let mut m = GestureMachine::new();
        for t in [
            m.update(GestureClass::Resize, 0, Point::ORIGIN),
            m.end(GestureClass::Resize, 0, Point::ORIGIN),
            m.blur(),
        ] {
            assert_eq!(t.effect, GestureEffect::Noop { reason: GestureNoopReason::IdleWithoutActiveGesture });
            assert_eq!(t.listeners, ListenerDirective::Unchanged);
        }
        assert!(m.force_cancel().is_none());
    }

    #[test]
    fn every_exit_detaches() {
        let exits: [fn(&mut GestureMachine) -> Option<GestureTransition>; 4] = [
            |m| Some(m.end(GestureClass::Resize, 0, Point::ORIGIN)),
            |m| Some(m.blur()),
            |m| Some(m.cancel(GestureCancelReason::DragAborted)),
            GestureMachine::force_cancel,
        ];
        for exit in exits {
            let mut m = GestureMachine::new();
            m.begin(box_gesture(), 0, Point::ORIGIN);
            let t = exit(&mut m).unwrap();
            assert_eq!(t.listeners, ListenerDirective::Detach);
            assert_eq!(t.to, GestureState::Idle);
        }
    }

    #[test]
    fn state_serializes_tagged() {
        let mut m = GestureMachine::new();
        m.begin(box_gesture(), 0, Point::new(1.0, 2.0));
        let json = serde_json::to_value(m.state()).unwrap();
        assert_eq!(json["state"], "active");
        assert_eq!(json["gesture"]["gesture"], "box_resize");
    }
}
