//! Rendered page surfaces and pointer-to-page resolution.
//!
//! The document renderer is a collaborator: it exposes one bounding rectangle
//! per rendered page through [`PageSurfaces`]. The engine asks for those
//! rectangles at the moment it needs them and never keeps them across
//! gestures, because zoom and scroll move them.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, SurfaceRect};

/// 1-based page number.
///
/// `0` is reserved/invalid so page indices are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageIndex(NonZeroU32);

impl PageIndex {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Create a page index, rejecting 0.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Get the raw 1-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collaborator surface: the rendered pages of the open document.
pub trait PageSurfaces {
    /// Total number of rendered pages.
    fn page_count(&self) -> u32;

    /// Current on-screen rectangle of one page, if it is rendered.
    fn surface(&self, page: PageIndex) -> Option<SurfaceRect>;
}

impl<T: PageSurfaces + ?Sized> PageSurfaces for &T {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn surface(&self, page: PageIndex) -> Option<SurfaceRect> {
        (**self).surface(page)
    }
}

/// The page a pointer resolved to, with the rectangle used for mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPage {
    pub page: PageIndex,
    pub surface: SurfaceRect,
}

/// Find the page whose surface contains `point`.
///
/// Pages are scanned in order and the first match wins. Returns `None` when
/// no rendered page is under the pointer.
#[must_use]
pub fn resolve_page(surfaces: &dyn PageSurfaces, point: Point) -> Option<ResolvedPage> {
    (1..=surfaces.page_count())
        .filter_map(PageIndex::new)
        .find_map(|page| {
            let surface = surfaces.surface(page)?;
            surface
                .contains(point)
                .then_some(ResolvedPage { page, surface })
        })
}

/// A plain list of page rectangles, page 1 first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageStack {
    pages: Vec<SurfaceRect>,
}

impl PageStack {
    /// Wrap an explicit list of rectangles.
    #[must_use]
    pub fn new(pages: Vec<SurfaceRect>) -> Self {
        Self { pages }
    }

    /// A vertical column of equally sized pages separated by `gap` pixels,
    /// starting at the viewport origin.
    #[must_use]
    pub fn vertical(count: u32, width: f64, height: f64, gap: f64) -> Self {
        let pages = (0..count)
            .map(|i| SurfaceRect::new(0.0, f64::from(i) * (height + gap), width, height))
            .collect();
        Self { pages }
    }

    /// Shift every page by the given offsets (scrolling).
    #[must_use]
    pub fn scrolled(&self, dx: f64, dy: f64) -> Self {
        let pages = self
            .pages
            .iter()
            .map(|r| SurfaceRect::new(r.left - dx, r.top - dy, r.width, r.height))
            .collect();
        Self { pages }
    }

    /// Scale every page about the viewport origin (zooming).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let pages = self
            .pages
            .iter()
            .map(|r| {
                SurfaceRect::new(
                    r.left * factor,
                    r.top * factor,
                    r.width * factor,
                    r.height * factor,
                )
            })
            .collect();
        Self { pages }
    }

    /// Rectangles in page order.
    #[must_use]
    pub fn rects(&self) -> &[SurfaceRect] {
        &self.pages
    }
}

impl PageSurfaces for PageStack {
    fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    fn surface(&self, page: PageIndex) -> Option<SurfaceRect> {
        let idx = usize::try_from(page.get() - 1).ok()?;
        self.pages.get(idx).copied()
    }
}
