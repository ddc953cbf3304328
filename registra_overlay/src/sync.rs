// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring from viewer navigation and UI changes to overlay transforms.

use alloc::vec::Vec;

use kurbo::Affine;
use registra_view::{AnchorMode, CellIndex, NavigationEvent, ViewportTransformEngine};

use crate::bridge::CoordinateBridge;
use crate::error::{OverlayError, SyncError};
use crate::grid::{GridChange, GridSize};
use crate::manager::OverlayManager;
use crate::surface::DrawingSurface;
use crate::ui_state::{ImageId, UiChange, UiStateRead};

/// Configuration for [`CellSync`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncConfig {
    /// Anchor convention for every cell's engine.
    pub anchor: AnchorMode,
}

impl SyncConfig {
    /// Sets the anchor convention.
    #[must_use]
    pub fn with_anchor(mut self, anchor: AnchorMode) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Keeps every bound cell's overlay in step with its viewer.
///
/// `CellSync` owns the [`OverlayManager`] and one [`ViewportTransformEngine`]
/// per bound cell. Hosts forward each [`NavigationEvent`] to
/// [`on_navigation`](Self::on_navigation), which recomputes the cell's
/// transform and pushes it to the overlay before returning, and forward UI
/// state notifications to [`apply_change`](Self::apply_change).
#[derive(Debug)]
pub struct CellSync<S: DrawingSurface> {
    config: SyncConfig,
    overlays: OverlayManager<S>,
    engines: Vec<Option<ViewportTransformEngine>>,
}

impl<S: DrawingSurface> CellSync<S> {
    /// Creates a wiring for `grid` with no bound cells.
    #[must_use]
    pub fn new(grid: GridSize, config: SyncConfig) -> Self {
        Self {
            config,
            overlays: OverlayManager::new(grid),
            engines: Vec::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> SyncConfig {
        self.config
    }

    /// Switches every engine to `anchor` and re-syncs cells that have
    /// already seen a navigation event.
    pub fn set_anchor(&mut self, anchor: AnchorMode) {
        self.config.anchor = anchor;
        for engine in self.engines.iter_mut().flatten() {
            engine.set_anchor(anchor);
            let Some(cell) = engine.cell() else {
                continue;
            };
            if let Err(err) = self.overlays.sync_transform(cell, engine.transform()) {
                log::warn!("{cell}: anchor change rejected: {err}");
            }
        }
    }

    /// Handles a navigation update for one cell.
    ///
    /// Returns the transform now applied to the cell's overlay. A rejected
    /// update leaves both the engine and the overlay on their last good
    /// transform.
    pub fn on_navigation(&mut self, event: &NavigationEvent) -> Result<Affine, SyncError> {
        let cell = event.cell();
        let Some(engine) = self.engines.get_mut(cell.get()).and_then(Option::as_mut) else {
            log::debug!("dropping {:?} event for unbound {cell}", event.kind);
            return Err(OverlayError::UnknownCell(cell).into());
        };
        let transform = engine.recompute(&event.state).inspect_err(|err| {
            log::warn!("{cell}: rejected {:?} update: {err}", event.kind);
        })?;
        self.overlays.sync_transform(cell, transform).inspect_err(|err| {
            log::warn!("{cell}: overlay rejected {:?} update: {err}", event.kind);
        })?;
        Ok(transform)
    }

    /// Reacts to `image` being assigned to `cell`.
    ///
    /// A non-empty id binds the cell if it is not bound yet; an empty id
    /// unbinds it. Returns `true` if a binding was created or removed.
    pub fn on_assignment<F>(
        &mut self,
        cell: CellIndex,
        image: &ImageId,
        factory: F,
    ) -> Result<bool, OverlayError>
    where
        F: FnOnce(CellIndex) -> S,
    {
        if image.is_unassigned() {
            let removed = self.overlays.unregister_cell(cell);
            if let Some(slot) = self.engines.get_mut(cell.get()) {
                *slot = None;
            }
            return Ok(removed);
        }
        if self.overlays.is_bound(cell) {
            // The viewer reports the new image with an image-swap event.
            log::debug!("{cell}: now showing {image}, keeping overlay");
            return Ok(false);
        }
        self.overlays.register_cell(cell, factory)?;
        let slot = cell.get();
        if self.engines.len() <= slot {
            self.engines.resize_with(slot + 1, || None);
        }
        self.engines[slot] = Some(ViewportTransformEngine::new(self.config.anchor));
        Ok(true)
    }

    /// Reacts to a grid change; see [`OverlayManager::resize_grid`].
    pub fn on_grid_resized(&mut self, grid: GridSize) -> GridChange {
        let change = self.overlays.resize_grid(grid);
        self.engines.truncate(grid.cell_count() as usize);
        change
    }

    /// Applies one UI state notification.
    ///
    /// `factory` is only called when the change binds a new cell.
    pub fn apply_change<F>(&mut self, change: &UiChange, factory: F) -> Result<(), OverlayError>
    where
        F: FnOnce(CellIndex) -> S,
    {
        match change {
            UiChange::GridSize { new, .. } => {
                self.on_grid_resized(*new);
            }
            UiChange::Assignment { cell, new, .. } => {
                self.on_assignment(*cell, new, factory)?;
            }
            UiChange::ActiveCell { .. }
            | UiChange::ActiveTool { .. }
            | UiChange::Selection { .. } => {}
        }
        Ok(())
    }

    /// Brings bindings in line with a full UI state snapshot.
    ///
    /// Used at start-up, or after notifications may have been missed.
    pub fn sync_with<U, F>(&mut self, ui: &U, mut factory: F) -> Result<(), OverlayError>
    where
        U: UiStateRead + ?Sized,
        F: FnMut(CellIndex) -> S,
    {
        let grid = ui.grid_size();
        if grid != self.overlays.grid() {
            self.on_grid_resized(grid);
        }
        let unassigned = ImageId::unassigned();
        for cell in grid.cells() {
            let image = ui.assignment(cell).unwrap_or(&unassigned);
            self.on_assignment(cell, image, &mut factory)?;
        }
        Ok(())
    }

    /// The overlay manager.
    #[must_use]
    pub fn manager(&self) -> &OverlayManager<S> {
        &self.overlays
    }

    /// A coordinate bridge over the current transforms.
    #[must_use]
    pub fn bridge(&self) -> CoordinateBridge<'_, S> {
        self.overlays.bridge()
    }

    /// The engine of a bound cell.
    #[must_use]
    pub fn engine(&self, cell: CellIndex) -> Option<&ViewportTransformEngine> {
        self.engines.get(cell.get()).and_then(Option::as_ref)
    }

    /// The surface bound to `cell`.
    #[must_use]
    pub fn surface(&self, cell: CellIndex) -> Option<&S> {
        self.overlays.surface(cell)
    }
}
