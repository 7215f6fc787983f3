// Copyright 2025 the Glade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Size, Vec2};

/// Bounds reported for an overlap whose anchor cannot be resolved.
pub(crate) const UNRESOLVED_BOUNDS: Rect = Rect::new(-1.0, -1.0, -1.0, -1.0);

/// Open-interval overlap: rectangles that only share an edge do not overlap.
#[inline]
pub(crate) fn overlaps_strict(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Closed-interval containment: points on the boundary are contained.
///
/// `kurbo::Rect::contains` is half-open, which is why this exists.
#[inline]
pub(crate) fn contains_closed(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// Rectangle of `size` centered on the origin.
#[inline]
pub(crate) fn centered(size: Size) -> Rect {
    Rect::new(
        -size.width / 2.0,
        -size.height / 2.0,
        size.width / 2.0,
        size.height / 2.0,
    )
}

/// `rect` moved by `offset`, without normalizing its corners.
#[inline]
pub(crate) fn offset(rect: Rect, offset: Vec2) -> Rect {
    Rect::new(
        rect.x0 + offset.x,
        rect.y0 + offset.y,
        rect.x1 + offset.x,
        rect.y1 + offset.y,
    )
}
