#![forbid(unsafe_code)]

//! Geometric primitives and the page-relative coordinate mapper.
//!
//! Pointer positions arrive in viewport pixels. Persisted field positions are
//! relative to one rendered page surface so they stay valid when the viewer
//! zooms or scrolls. [`to_relative`] and [`to_absolute`] are the two halves of
//! that mapping; [`GeometryMapper`] selects the stored [`CoordinateSpace`].
//!
//! # Invariants
//!
//! 1. `to_absolute(to_relative(p, r)?, r) == p` up to floating-point error for
//!    every non-degenerate `r`.
//! 2. A degenerate surface (zero, negative, or non-finite extent) never maps;
//!    callers treat `None` as "abort the gesture without mutating state".

use serde::{Deserialize, Serialize};

/// A pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin of the viewport.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Translate by the given offsets.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// The on-screen bounding rectangle of one rendered page surface.
///
/// Changes with zoom and scroll, so it must be queried fresh for every
/// gesture frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceRect {
    /// Left edge in viewport pixels.
    pub left: f64,
    /// Top edge in viewport pixels.
    pub top: f64,
    /// Rendered width in pixels.
    pub width: f64,
    /// Rendered height in pixels.
    pub height: f64,
}

impl SurfaceRect {
    /// Create a new surface rectangle.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the rectangle cannot be used for coordinate mapping.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    ///
    /// Half-open on the right and bottom edges so that two stacked pages
    /// never both claim the shared boundary.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        !self.is_degenerate()
            && point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }
}

/// A position relative to one page surface.
///
/// Under [`CoordinateSpace::Percentage`] both axes are percentages of the
/// page's rendered width/height (`0..=100` when on the page). Under
/// [`CoordinateSpace::Pixel`] they are reference-scale pixels from the page's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelativePoint {
    pub x: f64,
    pub y: f64,
}

impl RelativePoint {
    /// Create a new relative point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into the on-page percentage range `[0, 100]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.x.clamp(0.0, 100.0), self.y.clamp(0.0, 100.0))
    }

    /// Whether both axes lie within `[0, 100]`.
    #[must_use]
    pub fn is_on_page(self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

/// Convert a viewport point into percentages of `rect`.
///
/// Returns `None` for a degenerate rectangle or a non-finite point.
#[must_use]
pub fn to_relative(point: Point, rect: SurfaceRect) -> Option<RelativePoint> {
    if rect.is_degenerate() || !point.is_finite() {
        return None;
    }
    Some(RelativePoint::new(
        (point.x - rect.left) / rect.width * 100.0,
        (point.y - rect.top) / rect.height * 100.0,
    ))
}

/// Inverse of [`to_relative`]. Used for rendering only; persisted state is
/// always relative.
#[must_use]
pub fn to_absolute(relative: RelativePoint, rect: SurfaceRect) -> Point {
    Point::new(
        rect.left + relative.x / 100.0 * rect.width,
        rect.top + relative.y / 100.0 * rect.height,
    )
}

/// Which coordinate space stored field positions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Percentages of the rendered page (canonical; survives zoom and page
    /// size changes).
    #[default]
    Percentage,
    /// Reference-scale pixels from the page origin (survives zoom only).
    Pixel,
}

impl CoordinateSpace {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Pixel => "pixel",
        }
    }
}

/// Pixel ⇄ page-relative mapping under one [`CoordinateSpace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeometryMapper {
    space: CoordinateSpace,
}

impl GeometryMapper {
    /// Create a mapper for the given space.
    #[must_use]
    pub const fn new(space: CoordinateSpace) -> Self {
        Self { space }
    }

    /// The space this mapper produces.
    #[must_use]
    pub const fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Map a viewport point onto `rect`.
    ///
    /// `scale` is the viewer zoom factor; it only affects the pixel space,
    /// where offsets are divided by it to obtain reference-scale pixels.
    #[must_use]
    pub fn project(&self, point: Point, rect: SurfaceRect, scale: f64) -> Option<RelativePoint> {
        match self.space {
            CoordinateSpace::Percentage => to_relative(point, rect),
            CoordinateSpace::Pixel => {
                if rect.is_degenerate() || !point.is_finite() || !(scale.is_finite() && scale > 0.0)
                {
                    return None;
                }
                let (dx, dy) = point.delta_from(Point::new(rect.left, rect.top));
                Some(RelativePoint::new(dx / scale, dy / scale))
            }
        }
    }

    /// Inverse of [`project`](Self::project).
    #[must_use]
    pub fn unproject(&self, relative: RelativePoint, rect: SurfaceRect, scale: f64) -> Point {
        match self.space {
            CoordinateSpace::Percentage => to_absolute(relative, rect),
            CoordinateSpace::Pixel => {
                Point::new(rect.left + relative.x * scale, rect.top + relative.y * scale)
            }
        }
    }
}
