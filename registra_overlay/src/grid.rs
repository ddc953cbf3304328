// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use registra_view::CellIndex;

/// Dimensions of the viewer grid.
///
/// Both dimensions are at least `1`. Cells are addressed by a dense
/// [`CellIndex`] in `0..rows * cols`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSize {
    rows: u32,
    cols: u32,
}

impl Default for GridSize {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl GridSize {
    /// A 1×1 grid.
    pub const SINGLE: Self = Self { rows: 1, cols: 1 };

    /// Creates a grid size. Dimensions below `1` are raised to `1`.
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows: if rows == 0 { 1 } else { rows },
            cols: if cols == 0 { 1 } else { cols },
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(self) -> u32 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(self) -> u32 {
        self.cols
    }

    /// Number of cells, `rows * cols`.
    #[must_use]
    pub const fn cell_count(self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    /// Returns `true` if `cell` is part of this grid.
    #[must_use]
    pub const fn contains(self, cell: CellIndex) -> bool {
        cell.0 < self.cell_count()
    }

    /// Iterates over every cell index of the grid.
    pub fn cells(self) -> impl Iterator<Item = CellIndex> {
        (0..self.cell_count()).map(CellIndex)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Summary of an [`OverlayManager::resize_grid`](crate::OverlayManager::resize_grid) call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridChange {
    /// Grid before the resize.
    pub old: GridSize,
    /// Grid after the resize.
    pub new: GridSize,
    /// Bound cells whose bindings were disposed, in ascending order.
    pub removed: Vec<CellIndex>,
    /// Cell indices that became part of the grid. They start unbound.
    pub added: Range<u32>,
}

impl GridChange {
    /// Returns `true` if the resize neither added nor removed cells.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
            && self.added.is_empty()
            && self.old.cell_count() == self.new.cell_count()
    }
}
