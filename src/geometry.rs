//! Pure rectangle math shared by placement, drag and resize

use crate::types::{Point, Rect, Size};

/// True iff the open interiors of `a` and `b` intersect.
/// Rectangles that share only an edge or a corner do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Translate `rect` so it lies inside `[0, container.w] x [0, container.h]`.
///
/// Never resizes: when `rect` is larger than the container on an axis it is
/// pinned to 0 on that axis.
pub fn clamp_rect(rect: Rect, container: Size) -> Rect {
    Rect {
        x: clamp_axis(rect.x, rect.width, container.w),
        y: clamp_axis(rect.y, rect.height, container.h),
        ..rect
    }
}

fn clamp_axis(start: f64, extent: f64, limit: f64) -> f64 {
    let max_start = limit - extent;
    if max_start <= 0.0 || start.is_nan() {
        0.0
    } else {
        start.clamp(0.0, max_start)
    }
}

/// Half-open point containment: left/top edges inside, right/bottom outside
pub fn contains(rect: &Rect, point: Point) -> bool {
    point.x >= rect.x && point.x < rect.right() && point.y >= rect.y && point.y < rect.bottom()
}

/// The square grab region at the bottom-right corner of `rect`.
/// Shrinks with fields smaller than the handle.
pub fn resize_handle(rect: &Rect, handle: f64) -> Rect {
    let w = handle.min(rect.width);
    let h = handle.min(rect.height);
    Rect::new(rect.right() - w, rect.bottom() - h, w, h)
}
