// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-driven annotation tools: draw, select, and drag.
//!
//! ## Usage
//!
//! 1) On pointer down in a cell, call [`ToolInteraction::pointer_down`] with the
//!    active tool and the raw cell-local screen position.
//! 2) On pointer move, call [`ToolInteraction::pointer_move`]. The cell of the
//!    press keeps the pointer until release.
//! 3) On pointer up, call [`ToolInteraction::pointer_up`].
//! 4) For polygons, call [`ToolInteraction::finish_polygon`] (for example on
//!    double click or Enter) or [`ToolInteraction::cancel`].
//!
//! Screen positions are converted to image space through the
//! [`CoordinateBridge`] as they arrive; everything the interaction produces or
//! mutates is image-space geometry.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Affine, Point, Rect};
//! use registra_overlay::{
//!     DrawingSurface, GridSize, Interaction, OverlayManager, Tool, ToolInteraction,
//! };
//! use registra_view::CellIndex;
//!
//! struct Canvas;
//! impl DrawingSurface for Canvas {
//!     type DisposeError = core::convert::Infallible;
//!     fn set_transform(&mut self, _: Affine) {}
//!     fn dispose(&mut self) -> Result<(), Self::DisposeError> { Ok(()) }
//! }
//!
//! let mut overlays = OverlayManager::new(GridSize::SINGLE);
//! overlays.register_cell(CellIndex(0), |_| Canvas).unwrap();
//! overlays.sync_transform(CellIndex(0), Affine::scale(2.0)).unwrap();
//!
//! let mut tools = ToolInteraction::new();
//! let bridge = overlays.bridge();
//! let press = Point::new(10.0, 10.0);
//! tools.pointer_down(&bridge, CellIndex(0), Some(Tool::Rectangle), press, &[]).unwrap();
//! tools.pointer_move(&bridge, Point::new(30.0, 50.0), &mut []).unwrap();
//! let done = tools.pointer_up(&bridge, Point::new(30.0, 50.0)).unwrap();
//!
//! let Interaction::Created { geometry, .. } = done else { panic!() };
//! assert_eq!(geometry.bounds(), Rect::new(5.0, 5.0, 15.0, 25.0));
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Rect, Vec2};
use registra_view::CellIndex;

use crate::bridge::CoordinateBridge;
use crate::error::OverlayError;
use crate::geometry::{self, Annotation, AnnotationGeometry, AnnotationId};
use crate::surface::DrawingSurface;
use crate::ui_state::Tool;

/// Default hit tolerance for selection, in screen pixels.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 6.0;

/// What a pointer event did.
#[derive(Clone, Debug, PartialEq)]
pub enum Interaction {
    /// Nothing happened (no tool, or an event outside any gesture).
    None,
    /// A drawing gesture is in progress; see [`ToolInteraction::preview`].
    Drawing,
    /// A new annotation shape was completed.
    Created {
        /// Cell the shape was drawn in.
        cell: CellIndex,
        /// The shape, in image space.
        geometry: AnnotationGeometry,
    },
    /// The selection changed as the result of a click.
    Selected(Option<AnnotationId>),
    /// The selected annotation was moved by an image-space delta.
    Moved {
        /// The moved annotation.
        id: AnnotationId,
        /// Movement since the previous event, in image pixels.
        delta: Vec2,
    },
    /// A move gesture ended.
    MoveFinished {
        /// The moved annotation.
        id: AnnotationId,
        /// Total movement over the gesture, in image pixels.
        total: Vec2,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    Rect {
        cell: CellIndex,
        start: Point,
        current: Point,
    },
    Polygon {
        cell: CellIndex,
        vertices: Vec<Point>,
    },
    /// Positions are in image space.
    Move {
        cell: CellIndex,
        id: AnnotationId,
        start: Point,
        last: Point,
    },
}

/// State machine turning pointer events into annotation edits.
#[derive(Clone, Debug)]
pub struct ToolInteraction {
    gesture: Gesture,
    hit_tolerance_px: f64,
}

impl Default for ToolInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolInteraction {
    /// Creates an idle interaction with the default hit tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
        }
    }

    /// Sets the selection hit tolerance in screen pixels.
    #[must_use]
    pub fn with_hit_tolerance(mut self, px: f64) -> Self {
        self.hit_tolerance_px = px.max(0.0);
        self
    }

    /// Returns `true` while a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// The cell owning the current gesture.
    #[must_use]
    pub fn cell(&self) -> Option<CellIndex> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Rect { cell, .. }
            | Gesture::Polygon { cell, .. }
            | Gesture::Move { cell, .. } => Some(cell),
        }
    }

    /// The in-progress shape, in image space, for rubber-band rendering.
    #[must_use]
    pub fn preview(&self) -> Option<AnnotationGeometry> {
        match &self.gesture {
            Gesture::Rect { start, current, .. } => {
                Some(AnnotationGeometry::rect(Rect::from_points(*start, *current)))
            }
            Gesture::Polygon { vertices, .. } => {
                Some(AnnotationGeometry::polygon(vertices.iter().copied()))
            }
            Gesture::Idle | Gesture::Move { .. } => None,
        }
    }

    /// Handles a pointer press at a cell-local screen position.
    ///
    /// `annotations` are the cell's annotations, used for selection hit
    /// testing.
    pub fn pointer_down<S: DrawingSurface>(
        &mut self,
        bridge: &CoordinateBridge<'_, S>,
        cell: CellIndex,
        tool: Option<Tool>,
        screen: Point,
        annotations: &[Annotation],
    ) -> Result<Interaction, OverlayError> {
        let Some(tool) = tool else {
            return Ok(Interaction::None);
        };
        let pt = bridge.screen_to_image(cell, screen)?;
        match tool {
            Tool::Point => {
                self.cancel();
                Ok(Interaction::Created {
                    cell,
                    geometry: AnnotationGeometry::point(pt),
                })
            }
            Tool::Rectangle => {
                self.gesture = Gesture::Rect {
                    cell,
                    start: pt,
                    current: pt,
                };
                Ok(Interaction::Drawing)
            }
            Tool::Polygon => {
                match &mut self.gesture {
                    Gesture::Polygon {
                        cell: active,
                        vertices,
                    } if *active == cell => vertices.push(pt),
                    gesture => {
                        *gesture = Gesture::Polygon {
                            cell,
                            vertices: alloc::vec![pt],
                        };
                    }
                }
                Ok(Interaction::Drawing)
            }
            Tool::Select => {
                let tolerance = bridge.screen_len_to_image(cell, self.hit_tolerance_px)?;
                let hit = geometry::hit_test(annotations, pt, tolerance);
                self.cancel();
                if let Some(id) = hit {
                    self.gesture = Gesture::Move {
                        cell,
                        id,
                        start: pt,
                        last: pt,
                    };
                }
                Ok(Interaction::Selected(hit))
            }
        }
    }

    /// Handles pointer movement.
    ///
    /// While moving a selection, the matching entry of `annotations` is
    /// translated in place.
    pub fn pointer_move<S: DrawingSurface>(
        &mut self,
        bridge: &CoordinateBridge<'_, S>,
        screen: Point,
        annotations: &mut [Annotation],
    ) -> Result<Interaction, OverlayError> {
        match &mut self.gesture {
            Gesture::Idle | Gesture::Polygon { .. } => Ok(Interaction::None),
            Gesture::Rect { cell, current, .. } => {
                *current = bridge.screen_to_image(*cell, screen)?;
                Ok(Interaction::Drawing)
            }
            Gesture::Move { cell, id, last, .. } => {
                let pt = bridge.screen_to_image(*cell, screen)?;
                let delta = pt - *last;
                *last = pt;
                let id = *id;
                if let Some(annotation) = annotations.iter_mut().find(|a| a.id == id) {
                    annotation.geometry.translate(delta);
                }
                Ok(Interaction::Moved { id, delta })
            }
        }
    }

    /// Handles a pointer release.
    pub fn pointer_up<S: DrawingSurface>(
        &mut self,
        bridge: &CoordinateBridge<'_, S>,
        screen: Point,
    ) -> Result<Interaction, OverlayError> {
        match core::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Ok(Interaction::None),
            // Polygons are completed explicitly.
            gesture @ Gesture::Polygon { .. } => {
                self.gesture = gesture;
                Ok(Interaction::Drawing)
            }
            Gesture::Rect { cell, start, .. } => {
                let end = bridge.screen_to_image(cell, screen)?;
                let rect = Rect::from_points(start, end);
                if rect.area() <= 0.0 {
                    return Ok(Interaction::None);
                }
                Ok(Interaction::Created {
                    cell,
                    geometry: AnnotationGeometry::rect(rect),
                })
            }
            Gesture::Move { id, start, last, .. } => {
                // Geometry has only been moved up to the last move event.
                Ok(Interaction::MoveFinished {
                    id,
                    total: last - start,
                })
            }
        }
    }

    /// Completes the polygon in progress.
    ///
    /// Returns `None` (and discards the vertices) when fewer than three were
    /// placed.
    pub fn finish_polygon(&mut self) -> Option<Interaction> {
        let Gesture::Polygon { cell, vertices } =
            core::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return None;
        };
        (vertices.len() >= 3).then(|| Interaction::Created {
            cell,
            geometry: AnnotationGeometry::polygon(vertices),
        })
    }

    /// Abandons any gesture in progress.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Affine, Point, Rect, Vec2};
    use registra_view::CellIndex;

    use super::*;
    use crate::grid::GridSize;
    use crate::manager::OverlayManager;

    #[derive(Debug)]
    struct Null;

    impl DrawingSurface for Null {
        type DisposeError = core::convert::Infallible;

        fn set_transform(&mut self, _transform: Affine) {}

        fn dispose(&mut self) -> Result<(), Self::DisposeError> {
            Ok(())
        }
    }

    const CELL: CellIndex = CellIndex(0);

    fn overlays(zoom: f64) -> OverlayManager<Null> {
        let mut overlays = OverlayManager::new(GridSize::SINGLE);
        overlays.register_cell(CELL, |_| Null).unwrap();
        overlays.sync_transform(CELL, Affine::scale(zoom)).unwrap();
        overlays
    }

    #[test]
    fn no_tool_does_nothing() {
        let overlays = overlays(1.0);
        let mut tools = ToolInteraction::new();
        let out = tools
            .pointer_down(&overlays.bridge(), CELL, None, Point::ORIGIN, &[])
            .unwrap();
        assert_eq!(out, Interaction::None);
        assert!(!tools.is_active());
    }

    #[test]
    fn point_tool_creates_image_space_point() {
        let overlays = overlays(4.0);
        let mut tools = ToolInteraction::new();
        let out = tools
            .pointer_down(&overlays.bridge(), CELL, Some(Tool::Point), Point::new(40.0, 8.0), &[])
            .unwrap();
        assert_eq!(
            out,
            Interaction::Created {
                cell: CELL,
                geometry: AnnotationGeometry::point(Point::new(10.0, 2.0))
            }
        );
    }

    #[test]
    fn zero_area_rectangle_is_discarded() {
        let overlays = overlays(1.0);
        let bridge = overlays.bridge();
        let mut tools = ToolInteraction::new();
        tools
            .pointer_down(&bridge, CELL, Some(Tool::Rectangle), Point::new(3.0, 3.0), &[])
            .unwrap();
        let out = tools.pointer_up(&bridge, Point::new(3.0, 9.0)).unwrap();
        assert_eq!(out, Interaction::None);
        assert!(!tools.is_active());
    }

    #[test]
    fn rectangle_preview_follows_pointer() {
        let overlays = overlays(2.0);
        let bridge = overlays.bridge();
        let mut tools = ToolInteraction::new();
        tools
            .pointer_down(&bridge, CELL, Some(Tool::Rectangle), Point::new(20.0, 20.0), &[])
            .unwrap();
        tools.pointer_move(&bridge, Point::new(0.0, 40.0), &mut []).unwrap();
        assert_eq!(
            tools.preview().map(|g| g.bounds()),
            Some(Rect::new(0.0, 10.0, 10.0, 20.0))
        );
        assert_eq!(tools.cell(), Some(CELL));
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let overlays = overlays(1.0);
        let bridge = overlays.bridge();
        let mut tools = ToolInteraction::new();
        for p in [Point::new(0.0, 0.0), Point::new(10.0, 0.0)] {
            tools
                .pointer_down(&bridge, CELL, Some(Tool::Polygon), p, &[])
                .unwrap();
            assert_eq!(tools.pointer_up(&bridge, p).unwrap(), Interaction::Drawing);
        }
        assert_eq!(tools.finish_polygon(), None);
        assert!(!tools.is_active());

        for p in [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)] {
            tools
                .pointer_down(&bridge, CELL, Some(Tool::Polygon), p, &[])
                .unwrap();
        }
        let Some(Interaction::Created { geometry, .. }) = tools.finish_polygon() else {
            panic!("expected polygon");
        };
        assert_eq!(geometry.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn select_and_drag_moves_in_image_space() {
        let overlays = overlays(2.0);
        let bridge = overlays.bridge();
        let mut annotations = vec![Annotation::new(
            AnnotationId(7),
            AnnotationGeometry::rect(Rect::new(10.0, 10.0, 20.0, 20.0)),
        )];
        let mut tools = ToolInteraction::new();

        // Screen (30, 30) is image (15, 15), inside the rect.
        let out = tools
            .pointer_down(&bridge, CELL, Some(Tool::Select), Point::new(30.0, 30.0), &annotations)
            .unwrap();
        assert_eq!(out, Interaction::Selected(Some(AnnotationId(7))));

        // 10 screen pixels is 5 image pixels at zoom 2.
        let out = tools
            .pointer_move(&bridge, Point::new(40.0, 30.0), &mut annotations)
            .unwrap();
        assert_eq!(
            out,
            Interaction::Moved {
                id: AnnotationId(7),
                delta: Vec2::new(5.0, 0.0)
            }
        );
        assert_eq!(annotations[0].geometry.bounds(), Rect::new(15.0, 10.0, 25.0, 20.0));

        // Each move reports the step since the previous one.
        let out = tools
            .pointer_move(&bridge, Point::new(46.0, 38.0), &mut annotations)
            .unwrap();
        assert_eq!(
            out,
            Interaction::Moved {
                id: AnnotationId(7),
                delta: Vec2::new(3.0, 4.0)
            }
        );
        assert_eq!(annotations[0].geometry.bounds(), Rect::new(18.0, 14.0, 28.0, 24.0));

        // The release position is ignored; the total runs to the last move.
        let out = tools.pointer_up(&bridge, Point::new(90.0, 90.0)).unwrap();
        assert_eq!(
            out,
            Interaction::MoveFinished {
                id: AnnotationId(7),
                total: Vec2::new(8.0, 4.0)
            }
        );
        assert!(!tools.is_active());
        let out = tools
            .pointer_move(&bridge, Point::new(60.0, 60.0), &mut annotations)
            .unwrap();
        assert_eq!(out, Interaction::None);
        assert_eq!(annotations[0].geometry.bounds(), Rect::new(18.0, 14.0, 28.0, 24.0));
    }

    #[test]
    fn select_hit_tolerance_is_in_screen_pixels() {
        let annotations = vec![Annotation::new(
            AnnotationId(1),
            AnnotationGeometry::point(Point::new(10.0, 10.0)),
        )];
        let mut tools = ToolInteraction::new().with_hit_tolerance(4.0);

        // Zoomed in 4x: 4 screen px is one image pixel.
        let zoomed = overlays(4.0);
        let bridge = zoomed.bridge();
        let out = tools
            .pointer_down(&bridge, CELL, Some(Tool::Select), Point::new(43.0, 40.0), &annotations)
            .unwrap();
        assert_eq!(out, Interaction::Selected(Some(AnnotationId(1))));
        let out = tools
            .pointer_down(&bridge, CELL, Some(Tool::Select), Point::new(46.0, 40.0), &annotations)
            .unwrap();
        assert_eq!(out, Interaction::Selected(None));
    }

    #[test]
    fn unbound_cell_is_an_error() {
        let overlays = overlays(1.0);
        let mut tools = ToolInteraction::new();
        let err = tools
            .pointer_down(&overlays.bridge(), CellIndex(3), Some(Tool::Point), Point::ORIGIN, &[])
            .unwrap_err();
        assert_eq!(err, OverlayError::UnknownCell(CellIndex(3)));
    }
}
