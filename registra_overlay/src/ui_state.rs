// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The slice of application UI state the overlay layer reads.
//!
//! The host's state container is external. Overlay code depends only on the
//! narrow [`UiStateRead`] interface plus [`UiChange`] notifications.
//! [`UiState`] is a plain observable struct implementing both, usable
//! directly by simple hosts and as a synthetic input in tests.
//!
//! ## Minimal example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use registra_overlay::{GridSize, ImageId, UiChange, UiState, UiStateRead};
//! use registra_view::CellIndex;
//!
//! let mut ui = UiState::new(GridSize::new(1, 2));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! ui.subscribe(move |change: &UiChange| sink.borrow_mut().push(change.clone()));
//!
//! ui.set_assignment(CellIndex(1), ImageId::new("slide-7"));
//! assert_eq!(ui.assignment(CellIndex(1)).map(ImageId::as_str), Some("slide-7"));
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use registra_view::CellIndex;

use crate::geometry::AnnotationId;
use crate::grid::GridSize;

/// Annotation tool selected in the toolbar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tool {
    /// Select and drag existing annotations.
    Select,
    /// Draw axis-aligned rectangles.
    Rectangle,
    /// Draw polygons vertex by vertex.
    Polygon,
    /// Place points.
    Point,
}

/// Opaque identifier of the image assigned to a cell.
///
/// The empty string means "no image assigned".
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImageId(String);

impl ImageId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The "no image assigned" identifier.
    #[must_use]
    pub const fn unassigned() -> Self {
        Self(String::new())
    }

    /// Returns `true` for the empty identifier.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to the UI state the overlay layer depends on.
pub trait UiStateRead {
    /// The cell receiving tool input.
    fn active_cell(&self) -> CellIndex;
    /// The selected tool, if any.
    fn active_tool(&self) -> Option<Tool>;
    /// Grid dimensions.
    fn grid_size(&self) -> GridSize;
    /// Image assigned to `cell`, or `None` when the cell is unassigned.
    fn assignment(&self, cell: CellIndex) -> Option<&ImageId>;
    /// The selected annotation, if any.
    fn selected_annotation(&self) -> Option<AnnotationId>;
}

/// A field-level change to [`UiState`].
#[derive(Clone, Debug, PartialEq)]
pub enum UiChange {
    /// The active cell changed.
    ActiveCell {
        /// Previous value.
        old: CellIndex,
        /// New value.
        new: CellIndex,
    },
    /// The active tool changed.
    ActiveTool {
        /// Previous value.
        old: Option<Tool>,
        /// New value.
        new: Option<Tool>,
    },
    /// The grid dimensions changed.
    GridSize {
        /// Previous value.
        old: GridSize,
        /// New value.
        new: GridSize,
    },
    /// A cell's image assignment changed.
    Assignment {
        /// Affected cell.
        cell: CellIndex,
        /// Previous image (empty when it was unassigned).
        old: ImageId,
        /// New image (empty when it is now unassigned).
        new: ImageId,
    },
    /// The selected annotation changed.
    Selection {
        /// Previous value.
        old: Option<AnnotationId>,
        /// New value.
        new: Option<AnnotationId>,
    },
}

/// Handle returned by [`UiState::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&UiChange)>;

/// A plain observable UI state struct.
///
/// Setters that change a field notify every subscriber with a [`UiChange`]
/// describing it. Setting a field to its current value notifies no one.
pub struct UiState {
    active_cell: CellIndex,
    active_tool: Option<Tool>,
    grid: GridSize,
    assignments: Vec<ImageId>,
    selected: Option<AnnotationId>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for UiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiState")
            .field("active_cell", &self.active_cell)
            .field("active_tool", &self.active_tool)
            .field("grid", &self.grid)
            .field("assignments", &self.assignments)
            .field("selected", &self.selected)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(GridSize::SINGLE)
    }
}

impl UiState {
    /// Creates a state with the given grid, cell 0 active, no tool, no
    /// assignments, and no selection.
    #[must_use]
    pub fn new(grid: GridSize) -> Self {
        Self {
            active_cell: CellIndex(0),
            active_tool: None,
            grid,
            assignments: Vec::new(),
            selected: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Registers a callback for every subsequent change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&UiChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Makes `cell` the active cell. Cells outside the grid are ignored.
    pub fn set_active_cell(&mut self, cell: CellIndex) -> bool {
        if cell == self.active_cell || !self.grid.contains(cell) {
            return false;
        }
        let old = core::mem::replace(&mut self.active_cell, cell);
        self.notify(&UiChange::ActiveCell { old, new: cell });
        true
    }

    /// Selects a tool, or clears the tool with `None`.
    pub fn set_active_tool(&mut self, tool: Option<Tool>) -> bool {
        if tool == self.active_tool {
            return false;
        }
        let old = core::mem::replace(&mut self.active_tool, tool);
        self.notify(&UiChange::ActiveTool { old, new: tool });
        true
    }

    /// Changes the grid dimensions.
    ///
    /// Emits [`UiChange::GridSize`] first. Assignments of cells that fall
    /// outside the new grid are then cleared, each with its own
    /// [`UiChange::Assignment`], and an active cell outside the grid resets to
    /// cell 0.
    pub fn set_grid_size(&mut self, grid: GridSize) -> bool {
        if grid == self.grid {
            return false;
        }
        let old = core::mem::replace(&mut self.grid, grid);
        self.notify(&UiChange::GridSize { old, new: grid });

        let first_dropped = grid.cell_count();
        let keep = first_dropped as usize;
        if self.assignments.len() > keep {
            let dropped: Vec<_> = self.assignments.drain(keep..).collect();
            for (cell, image) in (first_dropped..).map(CellIndex).zip(dropped) {
                if image.is_unassigned() {
                    continue;
                }
                self.notify(&UiChange::Assignment {
                    cell,
                    old: image,
                    new: ImageId::unassigned(),
                });
            }
        }
        if !grid.contains(self.active_cell) {
            let old = core::mem::replace(&mut self.active_cell, CellIndex(0));
            self.notify(&UiChange::ActiveCell {
                old,
                new: CellIndex(0),
            });
        }
        true
    }

    /// Assigns an image to `cell`; an empty id clears the assignment.
    ///
    /// Returns `false` for cells outside the grid and unchanged values.
    pub fn set_assignment(&mut self, cell: CellIndex, image: ImageId) -> bool {
        if !self.grid.contains(cell) {
            return false;
        }
        let slot = cell.get();
        if self.assignments.len() <= slot {
            if image.is_unassigned() {
                return false;
            }
            self.assignments.resize(slot + 1, ImageId::unassigned());
        }
        if self.assignments[slot] == image {
            return false;
        }
        let old = core::mem::replace(&mut self.assignments[slot], image.clone());
        self.notify(&UiChange::Assignment {
            cell,
            old,
            new: image,
        });
        true
    }

    /// Selects an annotation, or clears the selection with `None`.
    pub fn select(&mut self, annotation: Option<AnnotationId>) -> bool {
        if annotation == self.selected {
            return false;
        }
        let old = core::mem::replace(&mut self.selected, annotation);
        self.notify(&UiChange::Selection {
            old,
            new: annotation,
        });
        true
    }

    /// Iterates over assigned cells and their images.
    pub fn assignments(&self) -> impl Iterator<Item = (CellIndex, &ImageId)> + '_ {
        (0..)
            .map(CellIndex)
            .zip(&self.assignments)
            .filter(|(_, image)| !image.is_unassigned())
    }

    fn notify(&mut self, change: &UiChange) {
        log::trace!("ui state change: {change:?}");
        for (_, subscriber) in &mut self.subscribers {
            subscriber(change);
        }
    }
}

impl UiStateRead for UiState {
    fn active_cell(&self) -> CellIndex {
        self.active_cell
    }

    fn active_tool(&self) -> Option<Tool> {
        self.active_tool
    }

    fn grid_size(&self) -> GridSize {
        self.grid
    }

    fn assignment(&self, cell: CellIndex) -> Option<&ImageId> {
        self.assignments
            .get(cell.get())
            .filter(|image| !image.is_unassigned())
    }

    fn selected_annotation(&self) -> Option<AnnotationId> {
        self.selected
    }
}
