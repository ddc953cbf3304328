// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=registra_overlay --heading-base-level=0

//! Registra Overlay: per-cell annotation overlays kept in step with the viewer.
//!
//! Each grid cell that shows an image gets a drawing surface for annotations.
//! This crate keeps every surface aligned with the image underneath it:
//! - [`OverlayManager`]: owns the cell → surface bindings and is the only
//!   writer of the transform each surface renders with.
//! - [`CellSync`]: turns viewer [`NavigationEvent`](registra_view::NavigationEvent)s
//!   and [`UiChange`] notifications into engine recomputes, bindings, and
//!   transform pushes.
//! - [`CoordinateBridge`]: screen ↔ image conversion for tool code, so stored
//!   [`AnnotationGeometry`] is always in image pixels.
//! - [`ToolInteraction`]: pointer handling for the rectangle, polygon, point,
//!   and select tools.
//! - [`UiState`] / [`UiStateRead`]: the UI state the wiring reads.
//!
//! Rendering is delegated to a host-provided [`DrawingSurface`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Affine, Point, Size};
//! use registra_overlay::{CellSync, DrawingSurface, GridSize, ImageId, SyncConfig};
//! use registra_view::{CellIndex, CellViewportState, NavigationEvent, NavigationKind};
//!
//! #[derive(Default)]
//! struct Canvas {
//!     transform: Affine,
//! }
//!
//! impl DrawingSurface for Canvas {
//!     type DisposeError = core::convert::Infallible;
//!     fn set_transform(&mut self, transform: Affine) {
//!         self.transform = transform;
//!     }
//!     fn dispose(&mut self) -> Result<(), Self::DisposeError> {
//!         Ok(())
//!     }
//! }
//!
//! let cell = CellIndex(0);
//! let mut sync = CellSync::new(GridSize::new(1, 2), SyncConfig::default());
//! sync.on_assignment(cell, &ImageId::new("slide-01.svs"), |_| Canvas::default()).unwrap();
//!
//! let state = CellViewportState::new(cell, Size::new(1000.0, 800.0), Size::new(500.0, 400.0))
//!     .with_zoom(2.0)
//!     .with_pan_offset(Point::new(100.0, 50.0));
//! sync.on_navigation(&NavigationEvent::new(NavigationKind::Zoom, state)).unwrap();
//!
//! // Pointer input maps back to image pixels.
//! let bridge = sync.bridge();
//! assert_eq!(bridge.screen_to_image(cell, Point::new(250.0, 200.0)), Ok(Point::new(100.0, 50.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bridge;
mod error;
pub mod geometry;
mod grid;
pub mod interaction;
mod manager;
mod surface;
mod sync;
pub mod ui_state;

pub use bridge::CoordinateBridge;
pub use error::{OverlayError, SyncError};
pub use geometry::{Annotation, AnnotationGeometry, AnnotationId, ScreenGeometry, Shape};
pub use grid::{GridChange, GridSize};
pub use interaction::{Interaction, ToolInteraction};
pub use manager::{OverlayBinding, OverlayManager};
pub use surface::DrawingSurface;
pub use sync::{CellSync, SyncConfig};
pub use ui_state::{ImageId, SubscriptionId, Tool, UiChange, UiState, UiStateRead};
