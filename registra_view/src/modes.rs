// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Size, Vec2};

/// Where in the viewport the viewer's pan offset is anchored.
///
/// The pan offset reported by the viewer is an image-space point. The anchor
/// mode decides which screen position that point is displayed at, and so is
/// observable in every image ↔ screen conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorMode {
    /// The pan offset is the image point shown at the centre of the viewport.
    #[default]
    Center,
    /// The pan offset is the image point shown at the viewport origin
    /// (top-left corner).
    TopLeft,
}

impl AnchorMode {
    /// Screen-space position of the pan anchor for a viewport of `size`.
    #[must_use]
    pub fn anchor_in(self, size: Size) -> Vec2 {
        match self {
            Self::Center => Vec2::new(size.width * 0.5, size.height * 0.5),
            Self::TopLeft => Vec2::ZERO,
        }
    }
}
