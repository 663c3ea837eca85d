// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle and affine-transform helpers shared by the repaint passes.
//!
//! All rectangles are [`kurbo::Rect`] and all transforms are
//! [`kurbo::Affine`]. A rectangle with zero or negative area is *empty*;
//! empty rectangles never intersect or contain anything.

use kurbo::{Affine, Point, Rect};

/// Returns whether `r` has zero or negative area.
#[inline]
#[must_use]
pub fn rect_is_empty(r: &Rect) -> bool {
    r.width() <= 0.0 || r.height() <= 0.0
}

/// Returns whether `a` and `b` overlap with positive area.
#[must_use]
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    !rect_is_empty(a)
        && !rect_is_empty(b)
        && a.x0 < b.x1
        && b.x0 < a.x1
        && a.y0 < b.y1
        && b.y0 < a.y1
}

/// Returns whether `outer` fully contains `inner` (edges may touch).
#[must_use]
pub fn rect_contains_rect(outer: &Rect, inner: &Rect) -> bool {
    !rect_is_empty(outer)
        && !rect_is_empty(inner)
        && inner.x0 >= outer.x0
        && inner.y0 >= outer.y0
        && inner.x1 <= outer.x1
        && inner.y1 <= outer.y1
}

/// Intersects `a` and `b`, returning `None` when the overlap is empty.
#[must_use]
pub fn rect_intersection(a: &Rect, b: &Rect) -> Option<Rect> {
    let r = Rect::new(
        a.x0.max(b.x0),
        a.y0.max(b.y0),
        a.x1.min(b.x1),
        a.y1.min(b.y1),
    );
    if rect_is_empty(&r) { None } else { Some(r) }
}

/// Returns whether `t` maps axis-aligned rectangles to axis-aligned
/// rectangles (no rotation or shear component).
#[inline]
#[must_use]
pub fn is_axis_aligned(t: &Affine) -> bool {
    let [_, b, c, _, _, _] = t.as_coeffs();
    b == 0.0 && c == 0.0
}

/// Returns whether the image of `region` under `tx` fully contains `inner`.
///
/// Exact for axis-aligned transforms. For rotated or sheared transforms the
/// four mapped corners of `region` form a convex quadrilateral and each
/// corner of `inner` is tested against it, so containment stays exact rather
/// than falling back to a bounding-box overestimate.
#[must_use]
pub fn mapped_rect_contains(tx: Affine, region: &Rect, inner: &Rect) -> bool {
    if rect_is_empty(region) || rect_is_empty(inner) {
        return false;
    }
    if is_axis_aligned(&tx) {
        return rect_contains_rect(&tx.transform_rect_bbox(*region), inner);
    }
    let quad = [
        tx * Point::new(region.x0, region.y0),
        tx * Point::new(region.x1, region.y0),
        tx * Point::new(region.x1, region.y1),
        tx * Point::new(region.x0, region.y1),
    ];
    point_in_convex_quad(&quad, inner.x0, inner.y0)
        && point_in_convex_quad(&quad, inner.x1, inner.y0)
        && point_in_convex_quad(&quad, inner.x1, inner.y1)
        && point_in_convex_quad(&quad, inner.x0, inner.y1)
}

/// Tests a point against a convex quadrilateral by checking that it falls on
/// the same side of all four edges. Points on an edge count as inside.
fn point_in_convex_quad(quad: &[Point; 4], x: f64, y: f64) -> bool {
    let mut pos = false;
    let mut neg = false;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
        if cross > 0.0 {
            pos = true;
        } else if cross < 0.0 {
            neg = true;
        }
    }
    !(pos && neg)
}
