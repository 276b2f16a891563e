//! Viewer zoom and page-count state.
//!
//! The renderer reports the page count once the document content is ready;
//! the toolbar steps the zoom scale. Field sizes are stored at the reference
//! scale (1.0) and multiplied by the current scale for display.

use pagefield_core::{GeometryMapper, SurfaceRect};
use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Zoom stepping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub initial_scale: f64,
    pub step: f64,
    pub min_scale: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            step: 0.1,
            min_scale: 0.1,
        }
    }
}

/// Decimal places kept when stepping, so repeated steps do not drift.
const SCALE_PRECISION: f64 = 1e4;

fn round_scale(scale: f64) -> f64 {
    (scale * SCALE_PRECISION).round() / SCALE_PRECISION
}

/// Current page count and zoom.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    zoom: ZoomSettings,
    scale: f64,
    page_count: u32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ZoomSettings::default())
    }
}

impl ViewerState {
    #[must_use]
    pub fn new(zoom: ZoomSettings) -> Self {
        Self {
            zoom,
            scale: zoom.initial_scale.max(zoom.min_scale),
            page_count: 0,
        }
    }

    /// Content-ready signal from the renderer.
    pub fn content_ready(&mut self, page_count: u32) {
        tracing::debug!(target: "pagefield.viewer", page_count, "content ready");
        self.page_count = page_count;
    }

    /// Pages reported by the renderer; `0` before content is ready.
    #[must_use]
    pub const fn page_count(&self) -> u32 {
        self.page_count
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub const fn zoom_settings(&self) -> ZoomSettings {
        self.zoom
    }

    /// Step the scale up. Returns the new scale.
    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.scale + self.zoom.step)
    }

    /// Step the scale down, never below the minimum. Returns the new scale.
    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.scale - self.zoom.step)
    }

    /// Set the scale directly, floored to the minimum. Non-finite input is
    /// ignored.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if scale.is_finite() {
            self.scale = round_scale(scale).max(self.zoom.min_scale);
            tracing::debug!(target: "pagefield.viewer", scale = self.scale, "zoom changed");
        }
        self.scale
    }

    /// On-screen rectangle of `field` drawn on `surface`.
    #[must_use]
    pub fn field_bounds(&self, field: &Field, surface: SurfaceRect, mapper: GeometryMapper) -> SurfaceRect {
        let origin = mapper.unproject(field.position().relative(), surface, self.scale);
        let size = field.size();
        SurfaceRect::new(
            origin.x,
            origin.y,
            size.width * self.scale,
            size.height * self.scale,
        )
    }
}
