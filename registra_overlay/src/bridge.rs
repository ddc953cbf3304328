// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Vec2};
use registra_view::{CellIndex, affine};

use crate::error::OverlayError;
use crate::geometry::{AnnotationGeometry, ScreenGeometry};
use crate::manager::{OverlayBinding, OverlayManager};
use crate::surface::DrawingSurface;

/// Screen ↔ image coordinate conversion for tool-interaction code.
///
/// The bridge reads the transforms recorded by an [`OverlayManager`]; it never
/// changes them. Every pointer position that ends up in annotation geometry
/// should pass through [`screen_to_image`](Self::screen_to_image) (or one of
/// its shape variants) exactly once.
///
/// Conversions fail with [`OverlayError::UnknownCell`] for cells that have no
/// binding.
#[derive(Debug)]
pub struct CoordinateBridge<'a, S: DrawingSurface> {
    overlays: &'a OverlayManager<S>,
}

impl<S: DrawingSurface> Clone for CoordinateBridge<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: DrawingSurface> Copy for CoordinateBridge<'_, S> {}

impl<'a, S: DrawingSurface> CoordinateBridge<'a, S> {
    /// Creates a bridge over `overlays`.
    #[must_use]
    pub fn new(overlays: &'a OverlayManager<S>) -> Self {
        Self { overlays }
    }

    fn binding(&self, cell: CellIndex) -> Result<&'a OverlayBinding<S>, OverlayError> {
        self.overlays
            .binding(cell)
            .ok_or(OverlayError::UnknownCell(cell))
    }

    /// Maps a cell-local screen point into image space.
    pub fn screen_to_image(&self, cell: CellIndex, pt: Point) -> Result<Point, OverlayError> {
        Ok(affine::map_point(self.binding(cell)?.inverse(), pt))
    }

    /// Maps an image-space point into cell-local screen space.
    pub fn image_to_screen(&self, cell: CellIndex, pt: Point) -> Result<Point, OverlayError> {
        Ok(affine::map_point(self.binding(cell)?.transform(), pt))
    }

    /// Maps a screen rectangle into image space.
    pub fn screen_rect_to_image(&self, cell: CellIndex, rect: Rect) -> Result<Rect, OverlayError> {
        Ok(affine::map_rect(self.binding(cell)?.inverse(), rect))
    }

    /// Maps an image rectangle into screen space.
    pub fn image_rect_to_screen(&self, cell: CellIndex, rect: Rect) -> Result<Rect, OverlayError> {
        Ok(affine::map_rect(self.binding(cell)?.transform(), rect))
    }

    /// Converts a screen-pixel length (a hit tolerance, a handle radius) into
    /// image pixels.
    pub fn screen_len_to_image(&self, cell: CellIndex, len: f64) -> Result<f64, OverlayError> {
        let inverse = self.binding(cell)?.inverse();
        let v = affine::map_point(inverse, Point::new(len, 0.0))
            - affine::map_point(inverse, Point::ORIGIN);
        Ok(v.hypot())
    }

    /// Converts a screen-space delta (a drag step) into an image-space delta.
    pub fn screen_delta_to_image(
        &self,
        cell: CellIndex,
        delta: Vec2,
    ) -> Result<Vec2, OverlayError> {
        let inverse = self.binding(cell)?.inverse();
        Ok(affine::map_point(inverse, delta.to_point()) - affine::map_point(inverse, Point::ORIGIN))
    }

    /// Converts screen-space input geometry into storable image-space geometry.
    pub fn geometry_from_screen(
        &self,
        cell: CellIndex,
        geometry: ScreenGeometry,
    ) -> Result<AnnotationGeometry, OverlayError> {
        let inverse = self.binding(cell)?.inverse();
        Ok(AnnotationGeometry::from_image_shape(
            geometry.into_shape().transformed(inverse),
        ))
    }

    /// Converts image-space geometry into screen space for rendering without
    /// transform support.
    pub fn geometry_to_screen(
        &self,
        cell: CellIndex,
        geometry: &AnnotationGeometry,
    ) -> Result<ScreenGeometry, OverlayError> {
        let transform = self.binding(cell)?.transform();
        Ok(ScreenGeometry::new(geometry.shape().transformed(transform)))
    }
}
