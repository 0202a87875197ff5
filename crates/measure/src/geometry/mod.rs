//! Geometry kernel: arc fitting, polygon metrics and view-rectangle helpers.
//!
//! Everything here is pure and cheap enough to run every frame.

mod arc;
mod polygon;
mod view_rect;

pub use arc::{arc_from_center, fit_circular_arc, CircularArc};
pub use polygon::{is_valid_polygon, polygon_metrics, PolygonMetrics, ProjectionPlane};
pub use view_rect::{
    closest_intersection_with_view_rect_edges, trim_arc_to_view, visible_segment_midpoint, Ray2d,
};

use glam::DVec3;

/// Small metric distance used for point equality and collinearity
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Points closer than `tol` are the same point
pub fn is_almost_equal(a: DVec3, b: DVec3, tol: f64) -> bool {
    a.distance_squared(b) <= tol * tol
}

/// Drop consecutive duplicates (within `tol`)
pub fn dedup_points(points: &[DVec3], tol: f64) -> Vec<DVec3> {
    let mut out: Vec<DVec3> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|&last| !is_almost_equal(last, p, tol)) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_almost_equal_within_tolerance() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        assert!(is_almost_equal(a, a + DVec3::splat(1e-8), DEFAULT_TOLERANCE));
        assert!(!is_almost_equal(a, a + DVec3::X * 1e-3, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_dedup_points_removes_consecutive_only() {
        let pts = [
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::X,
            DVec3::ZERO,
        ];
        let out = dedup_points(&pts, DEFAULT_TOLERANCE);
        assert_eq!(out, vec![DVec3::ZERO, DVec3::X, DVec3::ZERO]);
    }
}
