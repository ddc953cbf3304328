// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewer-reported state for a single grid cell.

use core::fmt;

use kurbo::{Point, Size};

/// Index of a cell in the viewer grid.
///
/// Indices are 0-based and dense: a grid of `rows × cols` cells uses exactly
/// `0..rows * cols`. The index does not encode a row/column position; the
/// host's layout decides where each index is placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CellIndex(pub u32);

impl CellIndex {
    /// Returns the index as a `usize`, for indexing into per-cell storage.
    #[must_use]
    #[inline]
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for CellIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell {}", self.0)
    }
}

/// Snapshot of a deep-zoom viewer's navigation state for one cell.
///
/// Produced by the viewer on every pan, zoom, resize, or image swap and
/// treated as read-only input by the transform engine.
///
/// - `zoom` is screen pixels per image pixel.
/// - `pan_offset` is an image-space point, in image pixels, anchored
///   according to the engine's [`AnchorMode`](crate::AnchorMode).
/// - `image_size` is the native size of the displayed image.
/// - `viewport_size` is the size of the cell canvas in screen pixels. Screen
///   coordinates are cell-local, with `(0, 0)` at the canvas' top-left.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellViewportState {
    /// Cell this state belongs to.
    pub cell: CellIndex,
    /// Uniform zoom factor (screen pixels per image pixel).
    pub zoom: f64,
    /// Pan offset in image pixels.
    pub pan_offset: Point,
    /// Native image size in pixels.
    pub image_size: Size,
    /// Cell viewport size in screen pixels.
    pub viewport_size: Size,
}

impl CellViewportState {
    /// Creates a state at zoom `1.0` with the pan offset at the image origin.
    #[must_use]
    pub fn new(cell: CellIndex, image_size: Size, viewport_size: Size) -> Self {
        Self {
            cell,
            zoom: 1.0,
            pan_offset: Point::ORIGIN,
            image_size,
            viewport_size,
        }
    }

    /// Returns a copy with the given zoom.
    #[must_use]
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Returns a copy with the given pan offset.
    #[must_use]
    pub fn with_pan_offset(mut self, pan_offset: Point) -> Self {
        self.pan_offset = pan_offset;
        self
    }

    /// Returns a copy with the given viewport size.
    #[must_use]
    pub fn with_viewport_size(mut self, viewport_size: Size) -> Self {
        self.viewport_size = viewport_size;
        self
    }

    /// Checks that the state can produce a non-degenerate transform.
    pub fn validate(&self) -> Result<(), InvalidViewportStateError> {
        let reason = if !self.zoom.is_finite() || self.zoom <= 0.0 {
            Some(InvalidViewportReason::Zoom(self.zoom))
        } else if !positive_size(self.viewport_size) {
            Some(InvalidViewportReason::ViewportSize(self.viewport_size))
        } else if !positive_size(self.image_size) {
            Some(InvalidViewportReason::ImageSize(self.image_size))
        } else if !self.pan_offset.is_finite() {
            Some(InvalidViewportReason::PanOffset(self.pan_offset))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InvalidViewportStateError {
                cell: self.cell,
                reason,
            }),
            None => Ok(()),
        }
    }
}

fn positive_size(size: Size) -> bool {
    size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
}

/// What prompted a navigation event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NavigationKind {
    /// The view was panned.
    Pan,
    /// The zoom level changed.
    Zoom,
    /// The cell viewport was resized.
    Resize,
    /// A different image was loaded into the cell.
    ImageSwap,
}

/// A navigation notification from the viewer for one cell.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationEvent {
    /// What changed.
    pub kind: NavigationKind,
    /// The viewer state after the change.
    pub state: CellViewportState,
}

impl NavigationEvent {
    /// Creates a navigation event.
    #[must_use]
    pub fn new(kind: NavigationKind, state: CellViewportState) -> Self {
        Self { kind, state }
    }

    /// Cell the event targets.
    #[must_use]
    pub fn cell(&self) -> CellIndex {
        self.state.cell
    }
}

/// Why a [`CellViewportState`] was rejected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InvalidViewportReason {
    /// Zoom was zero, negative, or not finite.
    Zoom(f64),
    /// A viewport dimension was zero, negative, or not finite.
    ViewportSize(Size),
    /// An image dimension was zero, negative, or not finite.
    ImageSize(Size),
    /// The pan offset was not finite.
    PanOffset(Point),
}

/// Error returned when viewer state would produce a degenerate transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InvalidViewportStateError {
    /// Cell whose state was rejected.
    pub cell: CellIndex,
    /// What was wrong with it.
    pub reason: InvalidViewportReason,
}

impl fmt::Display for InvalidViewportStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            InvalidViewportReason::Zoom(zoom) => {
                write!(f, "{}: zoom must be positive and finite, got {zoom}", self.cell)
            }
            InvalidViewportReason::ViewportSize(size) => write!(
                f,
                "{}: viewport size must be positive, got {}x{}",
                self.cell, size.width, size.height
            ),
            InvalidViewportReason::ImageSize(size) => write!(
                f,
                "{}: image size must be positive, got {}x{}",
                self.cell, size.width, size.height
            ),
            InvalidViewportReason::PanOffset(pan) => {
                write!(f, "{}: pan offset must be finite, got {pan:?}", self.cell)
            }
        }
    }
}

impl core::error::Error for InvalidViewportStateError {}
