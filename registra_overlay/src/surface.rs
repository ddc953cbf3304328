// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between overlay bindings and a drawing-surface library.

use core::fmt;

use kurbo::Affine;

/// A vector drawing surface layered over one grid cell.
///
/// Implement this for the canvas or scene type of whatever drawing library
/// renders annotation shapes. Shapes are added to the surface in image
/// coordinates; the surface renders them through the transform most recently
/// passed to [`set_transform`](Self::set_transform), so they track the image
/// without being re-expressed in screen space.
///
/// Surfaces are owned exclusively by an [`OverlayManager`](crate::OverlayManager)
/// binding, which is the only caller of `set_transform` and `dispose`. The
/// manager only lends out shared references, so hosts add shapes through a
/// handle of their own (a shared scene or DOM node) rather than through the
/// bound surface.
pub trait DrawingSurface {
    /// Error reported when releasing the surface's resources fails.
    type DisposeError: fmt::Debug + fmt::Display;

    /// Replaces the image → screen rendering transform.
    fn set_transform(&mut self, transform: Affine);

    /// Releases canvas/DOM/GPU resources held by the surface.
    ///
    /// Called exactly once, when the binding is removed or its manager is
    /// dropped. Failures are logged and the binding is removed regardless.
    fn dispose(&mut self) -> Result<(), Self::DisposeError>;
}
