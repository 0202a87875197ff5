//! Keeping labels and arcs on screen when their true anchor is not.

use kurbo::{Point, Rect, Vec2};

use super::CircularArc;
use crate::viewport::Viewport;

const PARALLEL_EPS: f64 = 1e-12;

/// Ray in view (pixel) space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2d {
    pub origin: Point,
    pub direction: Vec2,
}

impl Ray2d {
    pub fn new(origin: Point, direction: Vec2) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }
}

/// Nearest forward parameter at which the ray crosses `lo` or `hi` on one axis
fn forward_hit(origin: f64, direction: f64, lo: f64, hi: f64) -> Option<f64> {
    if direction.abs() < PARALLEL_EPS {
        return None;
    }
    [(lo - origin) / direction, (hi - origin) / direction]
        .into_iter()
        .filter(|t| *t > PARALLEL_EPS)
        .min_by(|a, b| a.total_cmp(b))
}

/// Where a view-space ray meets the edges of `rect`.
///
/// For each axis the nearest forward crossing of that axis' bounding lines is
/// found. Of the two candidates, the one lying closer to the rectangle's
/// center along the *other* axis wins. `None` when the ray is parallel to
/// both axes or never crosses an edge going forward.
pub fn closest_intersection_with_view_rect_edges(rect: Rect, ray: &Ray2d) -> Option<Point> {
    let center = rect.center();
    let hit_x = forward_hit(ray.origin.x, ray.direction.x, rect.x0, rect.x1).map(|t| ray.at(t));
    let hit_y = forward_hit(ray.origin.y, ray.direction.y, rect.y0, rect.y1).map(|t| ray.at(t));

    match (hit_x, hit_y) {
        (Some(px), Some(py)) => {
            if (px.y - center.y).abs() <= (py.x - center.x).abs() {
                Some(px)
            } else {
                Some(py)
            }
        }
        (Some(p), None) | (None, Some(p)) => Some(p),
        (None, None) => None,
    }
}

/// Label anchor for a view-space segment: its midpoint when both ends are
/// on screen, otherwise the midpoint of the on-screen part.
///
/// `None` when neither end is on screen.
pub fn visible_segment_midpoint(rect: Rect, a: Point, b: Point) -> Option<Point> {
    match (rect.contains(a), rect.contains(b)) {
        (true, true) => Some(a.midpoint(b)),
        (true, false) => {
            let exit = closest_intersection_with_view_rect_edges(rect, &Ray2d::new(a, b - a))?;
            Some(a.midpoint(exit))
        }
        (false, true) => {
            let exit = closest_intersection_with_view_rect_edges(rect, &Ray2d::new(b, a - b))?;
            Some(b.midpoint(exit))
        }
        (false, false) => None,
    }
}

/// Secondary arc for an arc whose center is off screen while both ends are
/// on screen.
///
/// Each arm (end point toward center) is followed until it leaves the view;
/// the arc is shrunk to the radius at which the shorter visible arm leaves,
/// pushed back outward by `1 + outward_offset`, and clamped to the original
/// radius. Callers draw it with leader lines to the real end points.
///
/// `None` when the center is visible (draw the full arc), when an end is off
/// screen, or when a projection or intersection cannot be computed.
pub fn trim_arc_to_view(
    arc: &CircularArc,
    viewport: &Viewport,
    outward_offset: f64,
) -> Option<CircularArc> {
    let rect = viewport.view_rect;
    let center = viewport.world_to_view(arc.center)?;
    if rect.contains(center) {
        return None;
    }
    let start = viewport.world_to_view(arc.start)?;
    let end = viewport.world_to_view(arc.end)?;
    if !rect.contains(start) || !rect.contains(end) {
        return None;
    }

    // Fraction of the arm (measured from its end point) that stays on screen
    let visible_fraction = |p: Point| -> Option<f64> {
        let toward_center = center - p;
        let full = toward_center.hypot();
        if full < PARALLEL_EPS {
            return None;
        }
        let edge = closest_intersection_with_view_rect_edges(rect, &Ray2d::new(p, toward_center))?;
        Some(((edge - p).hypot() / full).clamp(0.0, 1.0))
    };

    let shorter = visible_fraction(start)?.min(visible_fraction(end)?);
    let factor = ((1.0 - shorter) * (1.0 + outward_offset)).min(1.0);
    if factor <= 0.0 {
        return None;
    }
    Some(arc.scaled_about_center(factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{arc_from_center, DEFAULT_TOLERANCE};
    use glam::DVec3;
    use shared::ViewType;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_ray_from_center_exits_right_edge() {
        let ray = Ray2d::new(Point::new(50.0, 50.0), Vec2::new(1.0, 0.2));
        let p = closest_intersection_with_view_rect_edges(rect(), &ray).unwrap();
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_ray_from_center_exits_top_edge() {
        let ray = Ray2d::new(Point::new(50.0, 50.0), Vec2::new(0.1, -1.0));
        let p = closest_intersection_with_view_rect_edges(rect(), &ray).unwrap();
        assert!(p.y.abs() < 1e-9);
        assert!((p.x - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_parallel_ray() {
        let ray = Ray2d::new(Point::new(20.0, 30.0), Vec2::new(0.0, 2.0));
        let p = closest_intersection_with_view_rect_edges(rect(), &ray).unwrap();
        assert_eq!(p, Point::new(20.0, 100.0));
    }

    #[test]
    fn test_zero_direction_has_no_intersection() {
        let ray = Ray2d::new(Point::new(20.0, 30.0), Vec2::ZERO);
        assert!(closest_intersection_with_view_rect_edges(rect(), &ray).is_none());
    }

    #[test]
    fn test_ray_pointing_away_from_outside_rect() {
        let ray = Ray2d::new(Point::new(150.0, 150.0), Vec2::new(1.0, 1.0));
        assert!(closest_intersection_with_view_rect_edges(rect(), &ray).is_none());
    }

    #[test]
    fn test_visible_segment_midpoint_clips_offscreen_end() {
        let mid = visible_segment_midpoint(rect(), Point::new(20.0, 50.0), Point::new(220.0, 50.0))
            .unwrap();
        assert!((mid.x - 60.0).abs() < 1e-9);
        assert!((mid.y - 50.0).abs() < 1e-9);

        let both = visible_segment_midpoint(rect(), Point::new(20.0, 50.0), Point::new(40.0, 50.0));
        assert_eq!(both, Some(Point::new(30.0, 50.0)));

        let across =
            visible_segment_midpoint(rect(), Point::new(-5.0, 0.0), Point::new(200.0, 0.0));
        assert!(across.is_none());
    }

    fn viewport() -> Viewport {
        // 100x100 px showing world [-5, 5] x [-5, 5]
        Viewport::orthographic_top(1, ViewType::Spatial, rect(), DVec3::ZERO, 10.0)
    }

    #[test]
    fn test_trim_none_when_center_visible() {
        let start = DVec3::new(4.0, 0.0, 0.0);
        let end = DVec3::new(0.0, 4.0, 0.0);
        let arc = arc_from_center(DVec3::ZERO, start, end, DEFAULT_TOLERANCE).unwrap();
        assert!(trim_arc_to_view(&arc, &viewport(), 0.1).is_none());
    }

    #[test]
    fn test_trim_shrinks_arc_with_offscreen_center() {
        // Vertex at (-8, 0) is off screen; arm ends at (2, 0) and roughly (0.66, 4.5)
        let center = DVec3::new(-8.0, 0.0, 0.0);
        let start = DVec3::new(2.0, 0.0, 0.0);
        let a = 30f64.to_radians();
        let end = center + DVec3::new(a.cos(), a.sin() * 0.9, 0.0) * 10.0;
        let arc = arc_from_center(center, start, end, DEFAULT_TOLERANCE).unwrap();
        let trimmed = trim_arc_to_view(&arc, &viewport(), 0.1).unwrap();
        assert!(trimmed.radius < arc.radius);
        assert!(trimmed.radius > 3.0);
        assert!((trimmed.center - arc.center).length() < 1e-12);
    }

    #[test]
    fn test_trim_none_when_end_offscreen() {
        let center = DVec3::new(-8.0, 0.0, 0.0);
        let start = DVec3::new(20.0, 0.0, 0.0);
        let end = DVec3::new(-8.0, 20.0, 0.0);
        let arc = arc_from_center(center, start, end, DEFAULT_TOLERANCE).unwrap();
        assert!(trim_arc_to_view(&arc, &viewport(), 0.1).is_none());
    }
}
