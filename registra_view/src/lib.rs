// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=registra_view --heading-base-level=0

//! Registra View: per-cell image viewport transforms.
//!
//! This crate computes the mapping between **image space** (pixels of the
//! native image shown in a grid cell) and **screen space** (cell-local canvas
//! pixels) from the navigation state a deep-zoom viewer reports. It provides:
//! - [`affine`]: pure transform math over [`kurbo::Affine`] (composition,
//!   checked inversion, point/rect mapping).
//! - [`CellViewportState`] / [`NavigationEvent`]: the viewer's per-cell state.
//! - [`ViewportTransformEngine`]: derives and caches the image ↔ screen
//!   transforms for one cell, keeping the last known good pair when an
//!   update is rejected.
//! - [`AnchorMode`]: which viewport position the pan offset is anchored to.
//!
//! It does **not** render anything or own drawing surfaces. The
//! `registra_overlay` crate applies these transforms to per-cell overlays.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use registra_view::{AnchorMode, CellIndex, CellViewportState, ViewportTransformEngine};
//!
//! let state = CellViewportState::new(
//!     CellIndex(0),
//!     Size::new(1000.0, 800.0),
//!     Size::new(500.0, 400.0),
//! )
//! .with_zoom(2.0)
//! .with_pan_offset(Point::new(100.0, 50.0));
//!
//! let mut engine = ViewportTransformEngine::new(AnchorMode::Center);
//! engine.recompute(&state).unwrap();
//!
//! // The pan offset is displayed at the viewport centre.
//! assert_eq!(engine.image_to_screen(Point::new(100.0, 50.0)), Point::new(250.0, 200.0));
//! assert_eq!(engine.screen_to_image(Point::new(250.0, 200.0)), Point::new(100.0, 50.0));
//! ```
//!
//! ## Rejected updates
//!
//! Zero or negative zoom and empty viewports would produce a degenerate
//! transform. [`ViewportTransformEngine::recompute`] rejects them and keeps
//! the previous transform:
//!
//! ```rust
//! use kurbo::Size;
//! use registra_view::{CellIndex, CellViewportState, ViewportError, ViewportTransformEngine};
//!
//! let state = CellViewportState::new(CellIndex(0), Size::new(64.0, 64.0), Size::new(64.0, 64.0));
//! let mut engine = ViewportTransformEngine::default();
//! let good = engine.recompute(&state).unwrap();
//!
//! let err = engine.recompute(&state.with_zoom(0.0)).unwrap_err();
//! assert!(matches!(err, ViewportError::InvalidState(_)));
//! assert_eq!(engine.transform(), good);
//! ```
//!
//! ## Design notes
//!
//! - Zoom is uniform and the viewport is axis-aligned; rotation is not
//!   modelled by the engine, although [`affine`] handles general transforms.
//! - The engine never clamps zoom or pan. The viewer owns navigation limits;
//!   clamping here would break registration with the rendered image.
//! - All arithmetic is `f64`.
//!
//! This crate is `no_std`.

#![no_std]

pub mod affine;
mod engine;
mod modes;
mod state;

pub use affine::SingularTransformError;
pub use engine::{ViewportDebugInfo, ViewportError, ViewportTransformEngine};
pub use modes::AnchorMode;
pub use state::{
    CellIndex, CellViewportState, InvalidViewportReason, InvalidViewportStateError,
    NavigationEvent, NavigationKind,
};
