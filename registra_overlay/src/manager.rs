// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use kurbo::Affine;
use registra_view::{CellIndex, affine};

use crate::bridge::CoordinateBridge;
use crate::error::OverlayError;
use crate::grid::{GridChange, GridSize};
use crate::surface::DrawingSurface;

/// A live cell's overlay: its drawing surface and the transform it renders with.
///
/// Bindings are created and destroyed only by [`OverlayManager`]. The recorded
/// transform is read-only to everyone else.
#[derive(Debug)]
pub struct OverlayBinding<S> {
    cell: CellIndex,
    surface: S,
    transform: Affine,
    inverse: Affine,
    revision: u64,
}

impl<S> OverlayBinding<S> {
    /// The bound cell.
    #[must_use]
    pub fn cell(&self) -> CellIndex {
        self.cell
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The image → screen transform last applied to the surface.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// The screen → image transform matching [`transform`](Self::transform).
    #[must_use]
    pub fn inverse(&self) -> Affine {
        self.inverse
    }

    /// Number of transform updates applied since the binding was created.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Owns one [`OverlayBinding`] per live grid cell.
///
/// The manager is an arena indexed by [`CellIndex`]. It is the single writer
/// of recorded transforms: [`sync_transform`](Self::sync_transform) is the
/// only path that changes one, and [`register_cell`] /
/// [`unregister_cell`] are the only operations that create or destroy
/// bindings. Engines and the [`CoordinateBridge`] read through the accessors.
///
/// Cells start unbound. A cell is registered once the host assigns an image to
/// it, and unregistered when the image is cleared or the grid shrinks past it.
/// Removing a binding disposes its surface exactly once; dropping the manager
/// disposes all surfaces that remain.
///
/// [`register_cell`]: Self::register_cell
/// [`unregister_cell`]: Self::unregister_cell
#[derive(Debug)]
pub struct OverlayManager<S: DrawingSurface> {
    grid: GridSize,
    bindings: Vec<Option<OverlayBinding<S>>>,
    len: usize,
}

impl<S: DrawingSurface> OverlayManager<S> {
    /// Creates a manager for `grid` with no bindings.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            bindings: Vec::new(),
            len: 0,
        }
    }

    /// The current grid.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Number of bound cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no cell is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Creates a binding for `cell` with a surface built by `factory`.
    ///
    /// The binding starts with the identity transform, which is pushed to the
    /// new surface, until the first [`sync_transform`](Self::sync_transform).
    pub fn register_cell<F>(
        &mut self,
        cell: CellIndex,
        factory: F,
    ) -> Result<&OverlayBinding<S>, OverlayError>
    where
        F: FnOnce(CellIndex) -> S,
    {
        if !self.grid.contains(cell) {
            return Err(OverlayError::CellOutsideGrid {
                cell,
                grid: self.grid,
            });
        }
        let slot = cell.get();
        if self.bindings.len() <= slot {
            self.bindings.resize_with(slot + 1, || None);
        }
        if self.bindings[slot].is_some() {
            return Err(OverlayError::DuplicateCell(cell));
        }

        let mut surface = factory(cell);
        surface.set_transform(Affine::IDENTITY);
        self.len += 1;
        log::debug!("registered overlay for {cell}");
        let binding = self.bindings[slot].insert(OverlayBinding {
            cell,
            surface,
            transform: Affine::IDENTITY,
            inverse: Affine::IDENTITY,
            revision: 0,
        });
        Ok(&*binding)
    }

    /// Removes the binding for `cell` and disposes its surface.
    ///
    /// Returns `false` if the cell was not bound; removal is idempotent.
    pub fn unregister_cell(&mut self, cell: CellIndex) -> bool {
        let Some(binding) = self.bindings.get_mut(cell.get()).and_then(Option::take) else {
            return false;
        };
        self.len -= 1;
        dispose(binding);
        log::debug!("unregistered overlay for {cell}");
        true
    }

    /// Applies `transform` to the surface bound to `cell`.
    ///
    /// Degenerate transforms are rejected and the binding keeps its last good
    /// transform. Re-syncing an unchanged transform does not touch the
    /// surface.
    pub fn sync_transform(
        &mut self,
        cell: CellIndex,
        transform: Affine,
    ) -> Result<(), OverlayError> {
        let binding = self
            .bindings
            .get_mut(cell.get())
            .and_then(Option::as_mut)
            .ok_or(OverlayError::UnknownCell(cell))?;
        if binding.revision > 0 && binding.transform == transform {
            return Ok(());
        }
        let inverse =
            affine::invert(transform).map_err(|source| OverlayError::Singular { cell, source })?;
        binding.transform = transform;
        binding.inverse = inverse;
        binding.revision += 1;
        binding.surface.set_transform(transform);
        log::trace!("{cell}: overlay transform {:?}", transform.as_coeffs());
        Ok(())
    }

    /// Changes the grid to `grid`.
    ///
    /// Cells present in both grids keep their bindings and transforms. Cells
    /// that no longer exist are unregistered, disposing their surfaces. New
    /// cells start unbound until a collaborator calls
    /// [`register_cell`](Self::register_cell).
    pub fn resize_grid(&mut self, grid: GridSize) -> GridChange {
        let old = self.grid;
        self.grid = grid;
        let old_count = old.cell_count();
        let new_count = grid.cell_count();

        let mut removed = Vec::new();
        let keep = new_count as usize;
        if self.bindings.len() > keep {
            for binding in self.bindings.drain(keep..).flatten() {
                removed.push(binding.cell);
                dispose(binding);
            }
            self.len -= removed.len();
        }
        if !removed.is_empty() || old_count != new_count {
            log::debug!(
                "grid resized {old} -> {grid}, released {} overlay(s)",
                removed.len()
            );
        }

        GridChange {
            old,
            new: grid,
            removed,
            added: old_count.min(new_count)..new_count,
        }
    }

    /// Removes every binding, disposing each surface.
    pub fn clear(&mut self) {
        for binding in self.bindings.drain(..).flatten() {
            dispose(binding);
        }
        self.len = 0;
    }

    /// Returns the binding for `cell`, if bound.
    #[must_use]
    pub fn binding(&self, cell: CellIndex) -> Option<&OverlayBinding<S>> {
        self.bindings.get(cell.get()).and_then(Option::as_ref)
    }

    /// Returns `true` if `cell` has a binding.
    #[must_use]
    pub fn is_bound(&self, cell: CellIndex) -> bool {
        self.binding(cell).is_some()
    }

    /// The image → screen transform recorded for `cell`.
    #[must_use]
    pub fn transform(&self, cell: CellIndex) -> Option<Affine> {
        self.binding(cell).map(OverlayBinding::transform)
    }

    /// The screen → image transform recorded for `cell`.
    #[must_use]
    pub fn inverse(&self, cell: CellIndex) -> Option<Affine> {
        self.binding(cell).map(OverlayBinding::inverse)
    }

    /// The surface bound to `cell`.
    #[must_use]
    pub fn surface(&self, cell: CellIndex) -> Option<&S> {
        self.binding(cell).map(OverlayBinding::surface)
    }

    /// Iterates over bound cells in ascending index order.
    pub fn bound_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.bindings.iter().flatten().map(|b| b.cell)
    }

    /// A coordinate bridge reading this manager's transforms.
    #[must_use]
    pub fn bridge(&self) -> CoordinateBridge<'_, S> {
        CoordinateBridge::new(self)
    }
}

impl<S: DrawingSurface> Drop for OverlayManager<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn dispose<S: DrawingSurface>(mut binding: OverlayBinding<S>) {
    if let Err(err) = binding.surface.dispose() {
        log::warn!("failed to dispose overlay surface for {}: {err}", binding.cell);
    }
}
