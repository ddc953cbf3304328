// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::affine::{self, SingularTransformError};
use crate::modes::AnchorMode;
use crate::state::{CellIndex, CellViewportState, InvalidViewportStateError};

/// Error returned by [`ViewportTransformEngine::recompute`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportError {
    /// The viewer state was rejected before any transform was built.
    InvalidState(InvalidViewportStateError),
    /// The transform built from the state could not be inverted.
    Singular(SingularTransformError),
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(err) => write!(f, "invalid viewport state: {err}"),
            Self::Singular(err) => write!(f, "viewport transform rejected: {err}"),
        }
    }
}

impl core::error::Error for ViewportError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidState(err) => Some(err),
            Self::Singular(err) => Some(err),
        }
    }
}

impl From<InvalidViewportStateError> for ViewportError {
    fn from(err: InvalidViewportStateError) -> Self {
        Self::InvalidState(err)
    }
}

impl From<SingularTransformError> for ViewportError {
    fn from(err: SingularTransformError) -> Self {
        Self::Singular(err)
    }
}

/// Derives a cell's image ↔ screen transforms from viewer state.
///
/// One engine exists per bound grid cell. Each navigation event is fed to
/// [`recompute`](Self::recompute), which validates the state, builds the
/// image → screen transform, checks that it inverts, and records both
/// directions plus the accepted state. A rejected update leaves the last
/// known good transforms in place.
///
/// The transform is built in a fixed order:
///
/// 1. translate by `-pan_offset` (image pixels),
/// 2. scale by `zoom`,
/// 3. translate to the anchor chosen by [`AnchorMode`].
///
/// Pan correction comes before scaling so that the pan offset stays in
/// pre-zoom image pixels.
#[derive(Clone, Debug)]
pub struct ViewportTransformEngine {
    anchor: AnchorMode,
    last_state: Option<CellViewportState>,
    image_to_screen: Affine,
    screen_to_image: Affine,
    revision: u64,
}

impl Default for ViewportTransformEngine {
    fn default() -> Self {
        Self::new(AnchorMode::default())
    }
}

impl ViewportTransformEngine {
    /// Creates an engine with identity transforms and no recorded state.
    #[must_use]
    pub const fn new(anchor: AnchorMode) -> Self {
        Self {
            anchor,
            last_state: None,
            image_to_screen: Affine::IDENTITY,
            screen_to_image: Affine::IDENTITY,
            revision: 0,
        }
    }

    /// Builds the image → screen transform for `state` without recording it.
    ///
    /// This is a pure function of its inputs: identical inputs produce
    /// bit-identical output.
    pub fn transform_for(
        anchor: AnchorMode,
        state: &CellViewportState,
    ) -> Result<Affine, ViewportError> {
        state.validate()?;
        let pan = Affine::translate(-state.pan_offset.to_vec2());
        let zoom = Affine::scale(state.zoom);
        let to_anchor = Affine::translate(anchor.anchor_in(state.viewport_size));
        Ok(affine::compose(affine::compose(pan, zoom), to_anchor))
    }

    /// Recomputes the transforms for `state` and records them on success.
    ///
    /// On error the previously recorded transforms, state, and revision are
    /// left untouched.
    pub fn recompute(&mut self, state: &CellViewportState) -> Result<Affine, ViewportError> {
        let forward = Self::transform_for(self.anchor, state)?;
        let inverse = affine::invert(forward)?;
        self.image_to_screen = forward;
        self.screen_to_image = inverse;
        self.last_state = Some(*state);
        self.revision += 1;
        Ok(forward)
    }

    /// Returns the last good image → screen transform.
    ///
    /// Before the first successful [`recompute`](Self::recompute) this is the
    /// identity.
    #[must_use]
    pub fn transform(&self) -> Affine {
        self.image_to_screen
    }

    /// Returns the last good screen → image transform.
    #[must_use]
    pub fn inverse(&self) -> Affine {
        self.screen_to_image
    }

    /// Returns the last accepted viewer state, if any.
    #[must_use]
    pub fn last_state(&self) -> Option<&CellViewportState> {
        self.last_state.as_ref()
    }

    /// Returns the cell of the last accepted state.
    #[must_use]
    pub fn cell(&self) -> Option<CellIndex> {
        self.last_state.map(|s| s.cell)
    }

    /// Returns the number of accepted recomputes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the anchor mode.
    #[must_use]
    pub fn anchor(&self) -> AnchorMode {
        self.anchor
    }

    /// Sets the anchor mode, rebuilding the transforms from the last state.
    pub fn set_anchor(&mut self, anchor: AnchorMode) {
        if self.anchor == anchor {
            return;
        }
        self.anchor = anchor;
        if let Some(state) = self.last_state {
            // The state was accepted before; only the anchor translation differs.
            if let Err(err) = self.recompute(&state) {
                debug_assert!(false, "previously accepted state rejected: {err}");
            }
        }
    }

    /// Maps an image-space point into screen space.
    #[must_use]
    pub fn image_to_screen(&self, pt: Point) -> Point {
        self.image_to_screen * pt
    }

    /// Maps a screen-space point into image space.
    #[must_use]
    pub fn screen_to_image(&self, pt: Point) -> Point {
        self.screen_to_image * pt
    }

    /// Returns the image-space rectangle currently visible in the viewport.
    #[must_use]
    pub fn visible_image_rect(&self) -> Option<Rect> {
        let state = self.last_state?;
        let view = Rect::from_origin_size(Point::ORIGIN, state.viewport_size);
        Some(affine::map_rect(self.screen_to_image, view))
    }

    /// Returns image pixels per screen pixel (`1 / zoom`).
    ///
    /// Useful for converting screen-space hit tolerances and stroke widths
    /// into image units.
    #[must_use]
    pub fn image_units_per_pixel(&self) -> Option<f64> {
        self.last_state.map(|s| 1.0 / s.zoom)
    }

    /// Largest zoom at which the whole image fits inside the viewport.
    #[must_use]
    pub fn fit_zoom(image_size: Size, viewport_size: Size) -> f64 {
        let sx = viewport_size.width / image_size.width.max(f64::MIN_POSITIVE);
        let sy = viewport_size.height / image_size.height.max(f64::MIN_POSITIVE);
        sx.min(sy)
    }

    /// Builds a state that shows the whole image centred in the viewport.
    ///
    /// The pan offset is chosen for this engine's anchor mode.
    #[must_use]
    pub fn fit_state(
        &self,
        cell: CellIndex,
        image_size: Size,
        viewport_size: Size,
    ) -> CellViewportState {
        let zoom = Self::fit_zoom(image_size, viewport_size);
        let image_center = Point::new(image_size.width * 0.5, image_size.height * 0.5);
        let pan_offset = match self.anchor {
            AnchorMode::Center => image_center,
            AnchorMode::TopLeft => {
                let half_view = Vec2::new(viewport_size.width * 0.5, viewport_size.height * 0.5);
                image_center - half_view / zoom
            }
        };
        CellViewportState {
            cell,
            zoom,
            pan_offset,
            image_size,
            viewport_size,
        }
    }

    /// Snapshot of the engine for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> ViewportDebugInfo {
        ViewportDebugInfo {
            anchor: self.anchor,
            state: self.last_state,
            image_to_screen: self.image_to_screen,
            screen_to_image: self.screen_to_image,
            visible_image_rect: self.visible_image_rect(),
            revision: self.revision,
        }
    }
}

/// Debug snapshot of a [`ViewportTransformEngine`].
#[derive(Clone, Copy, Debug)]
pub struct ViewportDebugInfo {
    /// Anchor mode in effect.
    pub anchor: AnchorMode,
    /// Last accepted viewer state.
    pub state: Option<CellViewportState>,
    /// Last good image → screen transform.
    pub image_to_screen: Affine,
    /// Last good screen → image transform.
    pub screen_to_image: Affine,
    /// Image-space rectangle visible through the viewport.
    pub visible_image_rect: Option<Rect>,
    /// Number of accepted recomputes.
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Rect, Size};

    use super::{AnchorMode, ViewportError, ViewportTransformEngine};
    use crate::state::{CellIndex, CellViewportState};

    fn scenario() -> CellViewportState {
        CellViewportState {
            cell: CellIndex(0),
            zoom: 2.0,
            pan_offset: Point::new(100.0, 50.0),
            image_size: Size::new(1000.0, 800.0),
            viewport_size: Size::new(500.0, 400.0),
        }
    }

    #[test]
    fn starts_at_identity() {
        let engine = ViewportTransformEngine::default();
        assert_eq!(engine.transform(), Affine::IDENTITY);
        assert_eq!(engine.inverse(), Affine::IDENTITY);
        assert_eq!(engine.revision(), 0);
        assert!(engine.last_state().is_none());
        assert!(engine.visible_image_rect().is_none());
    }

    #[test]
    fn center_anchor_places_pan_offset_at_viewport_center() {
        let mut engine = ViewportTransformEngine::new(AnchorMode::Center);
        engine.recompute(&scenario()).unwrap();
        assert_eq!(engine.image_to_screen(Point::new(100.0, 50.0)), Point::new(250.0, 200.0));
        // One image pixel right of the anchor is two screen pixels right at zoom 2.
        assert_eq!(engine.image_to_screen(Point::new(101.0, 50.0)), Point::new(252.0, 200.0));
    }

    #[test]
    fn top_left_anchor_places_pan_offset_at_origin() {
        let mut engine = ViewportTransformEngine::new(AnchorMode::TopLeft);
        engine.recompute(&scenario()).unwrap();
        assert_eq!(engine.image_to_screen(Point::new(100.0, 50.0)), Point::ORIGIN);
        assert_eq!(engine.screen_to_image(Point::new(500.0, 400.0)), Point::new(350.0, 250.0));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut engine = ViewportTransformEngine::default();
        let first = engine.recompute(&scenario()).unwrap();
        let second = engine.recompute(&scenario()).unwrap();
        let a = first.as_coeffs().map(f64::to_bits);
        let b = second.as_coeffs().map(f64::to_bits);
        assert_eq!(a, b);
        assert_eq!(engine.revision(), 2);
    }

    #[test]
    fn rejected_state_keeps_last_good_transform() {
        let mut engine = ViewportTransformEngine::default();
        let good = engine.recompute(&scenario()).unwrap();

        let err = engine.recompute(&scenario().with_zoom(0.0)).unwrap_err();
        assert!(matches!(err, ViewportError::InvalidState(_)));
        assert_eq!(engine.transform(), good);
        assert_eq!(engine.revision(), 1);
        assert_eq!(engine.last_state(), Some(&scenario()));
    }

    #[test]
    fn pan_is_in_pre_zoom_image_pixels() {
        let mut engine = ViewportTransformEngine::new(AnchorMode::TopLeft);
        for zoom in [0.25, 1.0, 3.0] {
            engine.recompute(&scenario().with_zoom(zoom)).unwrap();
            // Whatever the zoom, the pan offset lands on the anchor.
            let p = engine.image_to_screen(Point::new(100.0, 50.0));
            assert!(p.x.abs() < 1e-12 && p.y.abs() < 1e-12);
        }
    }

    #[test]
    fn visible_rect_and_units_per_pixel() {
        let mut engine = ViewportTransformEngine::new(AnchorMode::Center);
        engine.recompute(&scenario()).unwrap();
        assert_eq!(engine.visible_image_rect(), Some(Rect::new(-25.0, -50.0, 225.0, 150.0)));
        assert_eq!(engine.image_units_per_pixel(), Some(0.5));
    }

    #[test]
    fn set_anchor_rebuilds_from_last_state() {
        let mut engine = ViewportTransformEngine::new(AnchorMode::Center);
        engine.recompute(&scenario()).unwrap();
        engine.set_anchor(AnchorMode::TopLeft);
        assert_eq!(engine.image_to_screen(Point::new(100.0, 50.0)), Point::ORIGIN);
    }

    #[test]
    fn fit_state_shows_whole_image() {
        for anchor in [AnchorMode::Center, AnchorMode::TopLeft] {
            let mut engine = ViewportTransformEngine::new(anchor);
            let state =
                engine.fit_state(CellIndex(1), Size::new(1000.0, 800.0), Size::new(500.0, 200.0));
            assert_eq!(state.zoom, 0.25);
            engine.recompute(&state).unwrap();
            let visible = engine.visible_image_rect().unwrap();
            assert!(visible.x0 <= 1e-9 && visible.y0 <= 1e-9);
            assert!(visible.x1 >= 1000.0 - 1e-9 && visible.y1 >= 800.0 - 1e-9);
            // The image is centred horizontally.
            let center = engine.image_to_screen(Point::new(500.0, 400.0));
            assert!((center.x - 250.0).abs() < 1e-9);
            assert!((center.y - 100.0).abs() < 1e-9);
        }
    }
}
