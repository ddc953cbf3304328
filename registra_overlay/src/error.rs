// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for overlay bindings and event wiring.

use core::fmt;

use registra_view::{CellIndex, SingularTransformError, ViewportError};

use crate::grid::GridSize;

/// Error returned by [`OverlayManager`](crate::OverlayManager) and
/// [`CoordinateBridge`](crate::CoordinateBridge) operations.
///
/// Lifecycle errors (`DuplicateCell`, `UnknownCell`, `CellOutsideGrid`) are
/// programming errors on the caller's side and are never retried.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayError {
    /// A binding already exists for the cell.
    DuplicateCell(CellIndex),
    /// No binding exists for the cell.
    UnknownCell(CellIndex),
    /// The cell index is not part of the current grid.
    CellOutsideGrid {
        /// The rejected cell.
        cell: CellIndex,
        /// The grid at the time of the call.
        grid: GridSize,
    },
    /// The transform offered for the cell is degenerate.
    Singular {
        /// The cell whose update was rejected.
        cell: CellIndex,
        /// The inversion failure.
        source: SingularTransformError,
    },
}

impl OverlayError {
    /// The cell the error refers to.
    #[must_use]
    pub fn cell(&self) -> CellIndex {
        match *self {
            Self::DuplicateCell(cell)
            | Self::UnknownCell(cell)
            | Self::CellOutsideGrid { cell, .. }
            | Self::Singular { cell, .. } => cell,
        }
    }
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCell(cell) => write!(f, "{cell} already has an overlay binding"),
            Self::UnknownCell(cell) => write!(f, "{cell} has no overlay binding"),
            Self::CellOutsideGrid { cell, grid } => {
                write!(f, "{cell} is outside the {grid} grid")
            }
            Self::Singular { cell, source } => write!(f, "{cell}: {source}"),
        }
    }
}

impl core::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Singular { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Error returned by [`CellSync::on_navigation`](crate::CellSync::on_navigation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncError {
    /// The engine rejected the viewer state; the last good transform stays.
    Viewport(ViewportError),
    /// The overlay binding rejected the update.
    Overlay(OverlayError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewport(err) => err.fmt(f),
            Self::Overlay(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Viewport(err) => Some(err),
            Self::Overlay(err) => Some(err),
        }
    }
}

impl From<ViewportError> for SyncError {
    fn from(err: ViewportError) -> Self {
        Self::Viewport(err)
    }
}

impl From<OverlayError> for SyncError {
    fn from(err: OverlayError) -> Self {
        Self::Overlay(err)
    }
}
