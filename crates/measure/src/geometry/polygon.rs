use glam::DVec3;

use super::{dedup_points, is_almost_equal, DEFAULT_TOLERANCE};

/// Plane a 3D polygon is projected onto before measuring its area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionPlane {
    /// Plane of the Newell normal
    #[default]
    BestFit,
    /// World XY plane
    Xy,
}

/// Area, perimeter and centroid of a point sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMetrics {
    /// Signed area in the requested projection plane
    pub area: f64,
    /// Signed area of the XY projection
    pub area_xy: f64,
    /// Sum of consecutive segment lengths (includes the closing edge when closed)
    pub perimeter: f64,
    /// Vertex average, closing point excluded
    pub centroid: DVec3,
    /// First and last points coincide
    pub is_closed: bool,
}

/// Newell area vector of a ring (no repeated closing point).
/// Its length is the planar area and its direction the polygon normal.
fn area_vector(ring: &[DVec3]) -> DVec3 {
    if ring.len() < 3 {
        return DVec3::ZERO;
    }
    let origin = ring[0];
    let mut sum = DVec3::ZERO;
    for i in 1..ring.len() - 1 {
        sum += (ring[i] - origin).cross(ring[i + 1] - origin);
    }
    sum * 0.5
}

/// Signed magnitude: the sign follows the dominant coordinate axis of the
/// area vector, so reversing the point order negates the result.
fn signed_best_fit_area(n: DVec3) -> f64 {
    let magnitude = n.length();
    let abs = n.abs();
    let dominant = if abs.z >= abs.x && abs.z >= abs.y {
        n.z
    } else if abs.y >= abs.x {
        n.y
    } else {
        n.x
    };
    if dominant < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

fn ring_of(points: &[DVec3]) -> (&[DVec3], bool) {
    let closed = points.len() >= 2
        && is_almost_equal(points[0], points[points.len() - 1], DEFAULT_TOLERANCE);
    if closed {
        (&points[..points.len() - 1], true)
    } else {
        (points, false)
    }
}

/// Measure a polygon given as an ordered point sequence.
///
/// The sequence may be open or explicitly closed (last point repeating the
/// first). Degenerate input is not an error: fewer than three points yields
/// zero area.
pub fn polygon_metrics(points: &[DVec3], plane: ProjectionPlane) -> PolygonMetrics {
    let (ring, is_closed) = ring_of(points);

    let perimeter = points.windows(2).map(|w| w[0].distance(w[1])).sum();

    let n = area_vector(ring);
    let area_xy = n.z;
    let area = match plane {
        ProjectionPlane::BestFit => signed_best_fit_area(n),
        ProjectionPlane::Xy => area_xy,
    };

    let centroid = if ring.is_empty() {
        DVec3::ZERO
    } else {
        ring.iter().copied().sum::<DVec3>() / ring.len() as f64
    };

    PolygonMetrics {
        area,
        area_xy,
        perimeter,
        centroid,
        is_closed,
    }
}

/// At least three distinct points and a non-zero area
pub fn is_valid_polygon(points: &[DVec3], tol: f64) -> bool {
    let (ring, _) = ring_of(points);
    let distinct = dedup_points(ring, tol);
    if distinct.len() < 3 {
        return false;
    }
    area_vector(&distinct).length() > tol * tol
}
