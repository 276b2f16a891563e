#![forbid(unsafe_code)]

//! Core: page-relative geometry, page surface resolution, and pointer events.
//!
//! # Role in PageField
//! `pagefield-core` is the geometry layer. It converts pointer pixels into
//! coordinates relative to a rendered document page and back, and it decides
//! which rendered page sits under a pointer.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Point`], [`SurfaceRect`], and the pixel/percentage
//!   [`GeometryMapper`].
//! - **Pages**: the [`PageSurfaces`] collaborator trait and [`resolve_page`].
//! - **Events**: canonical [`PointerEvent`] values for resize gestures.
//!
//! # How it fits in the system
//! `pagefield-layout` stores the coordinates produced here, and
//! `pagefield-runtime` queries page surfaces fresh on every gesture frame.
//! Nothing in this crate holds state across gestures.

pub mod event;
pub mod geometry;
pub mod pages;

pub use event::{PointerEvent, PointerEventKind};
pub use geometry::{
    CoordinateSpace, GeometryMapper, Point, RelativePoint, SurfaceRect, to_absolute, to_relative,
};
pub use pages::{PageIndex, PageStack, PageSurfaces, ResolvedPage, resolve_page};
