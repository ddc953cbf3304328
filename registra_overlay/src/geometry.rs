// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Annotation shapes and image-space hit testing.
//!
//! A [`Shape`] carries no coordinate space of its own. It is wrapped either as
//! [`AnnotationGeometry`] (image space, the only form that is stored) or as
//! [`ScreenGeometry`] (cell-local screen space, for rendering or raw pointer
//! input). Converting between the two goes through
//! [`CoordinateBridge`](crate::CoordinateBridge), so a screen-space shape cannot
//! be stored by accident.

use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect, Vec2};
use registra_view::affine;

/// A rectangle, polygon, or point.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// A single point.
    Point(Point),
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A closed polygon given by its vertices.
    Polygon(Vec<Point>),
}

impl Shape {
    /// Maps the shape through `t`.
    ///
    /// Rectangles map to the bounding box of their transformed corners,
    /// which is exact for the axis-aligned viewport transforms.
    #[must_use]
    pub fn transformed(&self, t: Affine) -> Self {
        match self {
            Self::Point(p) => Self::Point(affine::map_point(t, *p)),
            Self::Rect(r) => Self::Rect(affine::map_rect(t, *r)),
            Self::Polygon(vertices) => {
                Self::Polygon(vertices.iter().map(|p| affine::map_point(t, *p)).collect())
            }
        }
    }

    /// Axis-aligned bounds. Empty polygons have zero-sized bounds at the origin.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Point(p) => Rect::from_points(*p, *p),
            Self::Rect(r) => r.abs(),
            Self::Polygon(vertices) => match vertices.split_first() {
                Some((first, rest)) => rest
                    .iter()
                    .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p)),
                None => Rect::ZERO,
            },
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            Self::Point(p) => *p += delta,
            Self::Rect(r) => *r = *r + delta,
            Self::Polygon(vertices) => {
                for p in vertices {
                    *p += delta;
                }
            }
        }
    }
}

/// Annotation geometry in image space.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AnnotationGeometry(Shape);

impl AnnotationGeometry {
    /// Wraps a shape whose coordinates are already in image pixels.
    ///
    /// Shapes built from pointer input must come from
    /// [`CoordinateBridge::geometry_from_screen`](crate::CoordinateBridge::geometry_from_screen)
    /// instead.
    #[must_use]
    pub fn from_image_shape(shape: Shape) -> Self {
        Self(shape)
    }

    /// An image-space point.
    #[must_use]
    pub fn point(p: Point) -> Self {
        Self(Shape::Point(p))
    }

    /// An image-space rectangle.
    #[must_use]
    pub fn rect(r: Rect) -> Self {
        Self(Shape::Rect(r))
    }

    /// An image-space polygon.
    #[must_use]
    pub fn polygon(vertices: impl IntoIterator<Item = Point>) -> Self {
        Self(Shape::Polygon(vertices.into_iter().collect()))
    }

    /// The underlying shape, in image coordinates.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.0
    }

    /// Image-space bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.0.bounds()
    }

    /// Moves the geometry by an image-space delta.
    pub fn translate(&mut self, delta: Vec2) {
        self.0.translate(delta);
    }

    /// Returns `true` if `pt` hits the geometry within `tolerance` image
    /// pixels.
    ///
    /// Points and polygon edges are hit within `tolerance`; rectangles and
    /// polygon interiors (even-odd rule) are hit anywhere inside.
    #[must_use]
    pub fn hit_test(&self, pt: Point, tolerance: f64) -> bool {
        match &self.0 {
            Shape::Point(p) => (pt - *p).hypot() <= tolerance,
            Shape::Rect(r) => r.abs().inflate(tolerance, tolerance).contains(pt),
            Shape::Polygon(vertices) => {
                polygon_contains(vertices, pt)
                    || edges(vertices).any(|(a, b)| segment_distance(a, b, pt) <= tolerance)
            }
        }
    }
}

/// Geometry in cell-local screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenGeometry(Shape);

impl ScreenGeometry {
    /// Wraps a screen-space shape.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self(shape)
    }

    /// The underlying shape, in screen coordinates.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.0
    }

    /// Unwraps the shape.
    #[must_use]
    pub fn into_shape(self) -> Shape {
        self.0
    }
}

/// Opaque identifier of an annotation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AnnotationId(pub u64);

/// An annotation: identity plus image-space geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    /// Identifier.
    pub id: AnnotationId,
    /// Image-space geometry.
    pub geometry: AnnotationGeometry,
}

impl Annotation {
    /// Creates an annotation.
    #[must_use]
    pub fn new(id: AnnotationId, geometry: AnnotationGeometry) -> Self {
        Self { id, geometry }
    }
}

/// Returns the topmost annotation hit by `pt`.
///
/// Later entries are drawn above earlier ones, so the search runs back to
/// front. `tolerance` is in image pixels.
#[must_use]
pub fn hit_test(annotations: &[Annotation], pt: Point, tolerance: f64) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .find(|a| a.geometry.hit_test(pt, tolerance))
        .map(|a| a.id)
}

fn edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let closing = match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if vertices.len() > 2 => Some((*last, *first)),
        _ => None,
    };
    vertices
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing)
}

fn polygon_contains(vertices: &[Point], pt: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    for (a, b) in edges(vertices) {
        if (a.y > pt.y) != (b.y > pt.y) {
            let x = a.x + (pt.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if pt.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn segment_distance(a: Point, b: Point, pt: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (pt - a).hypot();
    }
    let t = ((pt - a).dot(ab) / len2).clamp(0.0, 1.0);
    (pt - (a + ab * t)).hypot()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::{Affine, Point, Rect, Vec2};

    use super::*;

    fn triangle() -> AnnotationGeometry {
        AnnotationGeometry::polygon([
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ])
    }

    #[test]
    fn point_hit_uses_tolerance() {
        let g = AnnotationGeometry::point(Point::new(5.0, 5.0));
        assert!(g.hit_test(Point::new(6.0, 5.0), 1.5));
        assert!(!g.hit_test(Point::new(8.0, 5.0), 1.5));
    }

    #[test]
    fn rect_hit_includes_interior_and_margin() {
        let g = AnnotationGeometry::rect(Rect::new(0.0, 0.0, 10.0, 5.0));
        assert!(g.hit_test(Point::new(5.0, 2.0), 0.0));
        assert!(g.hit_test(Point::new(10.5, 2.0), 1.0));
        assert!(!g.hit_test(Point::new(12.0, 2.0), 1.0));
    }

    #[test]
    fn polygon_hit_interior_and_edges() {
        let g = triangle();
        assert!(g.hit_test(Point::new(2.0, 2.0), 0.0));
        assert!(!g.hit_test(Point::new(8.0, 8.0), 0.0));
        // Just outside the hypotenuse, within tolerance.
        assert!(g.hit_test(Point::new(5.5, 5.5), 1.0));
        assert!(!g.hit_test(Point::new(-3.0, 5.0), 1.0));
    }

    #[test]
    fn topmost_annotation_wins() {
        let rect = |id, r| Annotation::new(AnnotationId(id), AnnotationGeometry::rect(r));
        let annotations = vec![
            rect(1, Rect::new(0.0, 0.0, 10.0, 10.0)),
            rect(2, Rect::new(5.0, 5.0, 15.0, 15.0)),
        ];
        assert_eq!(hit_test(&annotations, Point::new(7.0, 7.0), 0.0), Some(AnnotationId(2)));
        assert_eq!(hit_test(&annotations, Point::new(2.0, 2.0), 0.0), Some(AnnotationId(1)));
        assert_eq!(hit_test(&annotations, Point::new(20.0, 2.0), 0.0), None);
    }

    #[test]
    fn translate_moves_every_vertex() {
        let mut g = triangle();
        g.translate(Vec2::new(1.0, -1.0));
        assert_eq!(g.bounds(), Rect::new(1.0, -1.0, 11.0, 9.0));
    }

    #[test]
    fn transformed_shape_maps_vertices() {
        let shape = Shape::Rect(Rect::new(1.0, 1.0, 2.0, 3.0));
        let mapped = shape.transformed(Affine::scale(2.0));
        assert_eq!(mapped, Shape::Rect(Rect::new(2.0, 2.0, 4.0, 6.0)));
        assert_eq!(Shape::Polygon(vec![]).bounds(), Rect::ZERO);
    }
}
