//! Resize arithmetic for box handles and table cell boundaries.
//!
//! Every frame recomputes the new extent from the values captured when the
//! gesture began, never from the previous frame, so a fast pointer cannot
//! accumulate rounding drift.
//!
//! Field sizes and cell extents are stored at reference scale (zoom 1.0),
//! while pointer deltas arrive in viewport pixels. Deltas are therefore
//! divided by the viewer scale before they are added, so a handle tracks
//! the pointer at any zoom. At scale 1.0 this is exactly
//! `start + (pointer - start_pointer)`.

use pagefield_core::Point;
use pagefield_layout::{FieldKind, FieldSize, MIN_CELL_HEIGHT, MIN_CELL_WIDTH};
use serde::{Deserialize, Serialize};

/// Which table boundary a cell resize drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum CellResizeAxis {
    /// Right edge of column `col`; changes that column's width.
    Horizontal { col: u32 },
    /// Bottom edge of row `row`; changes that row's height.
    Vertical { row: u32 },
}

impl CellResizeAxis {
    /// Floor for the extent this axis controls.
    #[must_use]
    pub const fn min_extent(self) -> u32 {
        match self {
            Self::Horizontal { .. } => MIN_CELL_WIDTH,
            Self::Vertical { .. } => MIN_CELL_HEIGHT,
        }
    }
}

fn scaled_delta(origin: Point, current: Point, scale: f64) -> (f64, f64) {
    let (dx, dy) = current.delta_from(origin);
    if scale.is_finite() && scale > 0.0 {
        (dx / scale, dy / scale)
    } else {
        (dx, dy)
    }
}

/// Size of a box being dragged by its corner handle.
///
/// `max(kind minimum, start + delta)` per axis.
#[must_use]
pub fn box_resize(kind: FieldKind, start: FieldSize, origin: Point, current: Point, scale: f64) -> FieldSize {
    let (dx, dy) = scaled_delta(origin, current, scale);
    FieldSize::new(start.width + dx, start.height + dy).at_least(kind.spec().min_size())
}

/// Extent of the one column or row under a cell-boundary drag.
///
/// The delta is rounded to whole pixels; the result is
/// `max(axis floor, start + delta)`.
#[must_use]
pub fn cell_resize(axis: CellResizeAxis, start_extent: u32, origin: Point, current: Point, scale: f64) -> u32 {
    let (dx, dy) = scaled_delta(origin, current, scale);
    let delta = match axis {
        CellResizeAxis::Horizontal { .. } => dx,
        CellResizeAxis::Vertical { .. } => dy,
    };
    let delta = if delta.is_finite() { delta.round() } else { 0.0 };
    let raw = f64::from(start_extent) + delta;
    let floor = axis.min_extent();
    if raw <= f64::from(floor) {
        floor
    } else if raw >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        // In range: floor < raw < u32::MAX and raw is integral.
        raw as u32
    }
}
