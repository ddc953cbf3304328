// Copyright 2025 the Registra Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transform helpers: composition, checked inversion, and point/rect mapping.
//!
//! All functions operate on [`kurbo::Affine`] and are pure. Composition is
//! written in application order: `compose(t1, t2)` applies `t1` first and
//! then `t2`, which is the opposite operand order from `t2 * t1` in Kurbo.
//!
//! Inversion is checked. Kurbo's [`Affine::inverse`] happily divides by a
//! vanishing determinant and yields infinities; [`invert`] instead reports a
//! [`SingularTransformError`] so a degenerate transform never reaches a
//! drawing surface.
//!
//! ```
//! use kurbo::{Affine, Point, Vec2};
//! use registra_view::affine;
//!
//! let t = affine::compose(Affine::translate(Vec2::new(-10.0, -5.0)), Affine::scale(2.0));
//! let p = affine::map_point(t, Point::new(10.0, 5.0));
//! assert_eq!(p, Point::ORIGIN);
//!
//! let back = affine::inverse_map_point(t, p).unwrap();
//! assert_eq!(back, Point::new(10.0, 5.0));
//! ```

use core::fmt;

use kurbo::{Affine, Point, Rect};

/// Relative tolerance used by [`is_singular`].
///
/// A transform is singular when the determinant of its linear part, divided by
/// `s²`, is at most `SINGULAR_EPSILON` in magnitude. Here `s` is the largest
/// magnitude among the linear coefficients `a`, `b`, `c`, `d`.
pub const SINGULAR_EPSILON: f64 = 1e-9;

/// Error returned when a transform cannot be inverted.
#[derive(Clone, Copy, PartialEq)]
pub struct SingularTransformError {
    /// The offending transform.
    pub transform: Affine,
}

impl fmt::Debug for SingularTransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SingularTransformError {{ coeffs: {:?} }}",
            self.transform.as_coeffs()
        )
    }
}

impl fmt::Display for SingularTransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, _, _] = self.transform.as_coeffs();
        write!(
            f,
            "transform [{a}, {b}, {c}, {d}] is singular (determinant {})",
            a * d - b * c
        )
    }
}

impl core::error::Error for SingularTransformError {}

/// Returns the transform that applies `first` and then `second`.
#[must_use]
#[inline]
pub fn compose(first: Affine, second: Affine) -> Affine {
    second * first
}

/// Splits the linear part of `t` into its largest magnitude `s` and the
/// normalized coefficients `[a, b, c, d] / s`, with their determinant.
///
/// Returns `None` for singular transforms. Working on normalized values keeps
/// the determinant out of the subnormal range for very small or large scales.
fn conditioned(t: Affine) -> Option<(f64, [f64; 4], f64)> {
    let coeffs = t.as_coeffs();
    if coeffs.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let [a, b, c, d, _, _] = coeffs;
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 {
        return None;
    }
    let [a, b, c, d] = [a / scale, b / scale, c / scale, d / scale];
    let det = a * d - b * c;
    (det.abs() > SINGULAR_EPSILON).then_some((scale, [a, b, c, d], det))
}

/// Returns `true` if `t` is degenerate or contains non-finite coefficients.
#[must_use]
pub fn is_singular(t: Affine) -> bool {
    conditioned(t).is_none()
}

/// Inverts `t`, failing when it is singular.
pub fn invert(t: Affine) -> Result<Affine, SingularTransformError> {
    let err = SingularTransformError { transform: t };
    let (scale, [a, b, c, d], det) = conditioned(t).ok_or(err)?;
    let [.., e, f] = t.as_coeffs();
    // (s·N)⁻¹ = N⁻¹ / s
    let k = 1.0 / (det * scale);
    let (ia, ib, ic, id) = (d * k, -b * k, -c * k, a * k);
    let inv = Affine::new([ia, ib, ic, id, -(ia * e + ic * f), -(ib * e + id * f)]);
    // The inverse itself can still overflow or collapse at extreme scales.
    if is_singular(inv) {
        return Err(err);
    }
    Ok(inv)
}

/// Maps a point through `t`.
#[must_use]
#[inline]
pub fn map_point(t: Affine, p: Point) -> Point {
    t * p
}

/// Maps a rectangle through `t`, returning the bounding box of its corners.
///
/// For the axis-aligned, uniform-zoom transforms produced by the viewport
/// engine this is exact; under rotation or skew it is conservative.
#[must_use]
pub fn map_rect(t: Affine, r: Rect) -> Rect {
    let corners = [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x0, r.y1),
        Point::new(r.x1, r.y1),
    ];
    let first = t * corners[0];
    let mut out = Rect::from_points(first, first);
    for corner in &corners[1..] {
        let q = t * *corner;
        out = out.union_pt(q);
    }
    out
}

/// Maps a point through the inverse of `t`.
pub fn inverse_map_point(t: Affine, p: Point) -> Result<Point, SingularTransformError> {
    Ok(invert(t)? * p)
}

/// Maps a rectangle through the inverse of `t`.
pub fn inverse_map_rect(t: Affine, r: Rect) -> Result<Rect, SingularTransformError> {
    Ok(map_rect(invert(t)?, r))
}

/// Returns `true` if two transforms agree within `tolerance` relative to
/// their largest coefficient magnitude (with a floor of `1.0`).
#[must_use]
pub fn approx_eq(lhs: Affine, rhs: Affine, tolerance: f64) -> bool {
    let l = lhs.as_coeffs();
    let r = rhs.as_coeffs();
    let magnitude = l
        .iter()
        .chain(r.iter())
        .fold(1.0_f64, |acc, c| acc.max(c.abs()));
    l.iter()
        .zip(r.iter())
        .all(|(a, b)| (a - b).abs() <= tolerance * magnitude)
}
