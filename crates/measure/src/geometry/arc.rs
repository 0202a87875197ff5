use std::f64::consts::TAU;

use glam::DVec3;

/// Circular arc in 3D.
///
/// The arc sweeps counter-clockwise about `normal` from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub center: DVec3,
    pub radius: f64,
    /// Unit normal of the arc plane
    pub normal: DVec3,
    pub start: DVec3,
    pub end: DVec3,
    /// Sweep angle in radians, in (0, 2π]
    pub sweep: f64,
}

impl CircularArc {
    /// Point at fraction `f` of the sweep (0 = start, 1 = end)
    pub fn point_at_fraction(&self, f: f64) -> DVec3 {
        let u = (self.start - self.center).normalize_or_zero();
        let v = self.normal.cross(u);
        let a = self.sweep * f;
        self.center + (u * a.cos() + v * a.sin()) * self.radius
    }

    pub fn mid_point(&self) -> DVec3 {
        self.point_at_fraction(0.5)
    }

    /// Arc length
    pub fn length(&self) -> f64 {
        self.radius * self.sweep
    }

    /// Length of the full circle
    pub fn circumference(&self) -> f64 {
        TAU * self.radius
    }

    /// Polyline approximation with `segments` chords
    pub fn stroke(&self, segments: usize) -> Vec<DVec3> {
        let n = segments.max(1);
        (0..=n)
            .map(|i| self.point_at_fraction(i as f64 / n as f64))
            .collect()
    }

    /// Polyline approximation with roughly one chord per 5 degrees
    pub fn stroke_adaptive(&self) -> Vec<DVec3> {
        let segments = (self.sweep / 5f64.to_radians()).ceil() as usize;
        self.stroke(segments.clamp(4, 128))
    }

    /// Same sweep and plane, radius multiplied by `factor`
    pub fn scaled_about_center(&self, factor: f64) -> CircularArc {
        CircularArc {
            center: self.center,
            radius: self.radius * factor,
            normal: self.normal,
            start: self.center + (self.start - self.center) * factor,
            end: self.center + (self.end - self.center) * factor,
            sweep: self.sweep,
        }
    }
}

/// Angle from `a` to `b` about `normal`, mapped to (0, 2π]
fn sweep_about(a: DVec3, b: DVec3, normal: DVec3) -> f64 {
    let angle = a.cross(b).dot(normal).atan2(a.dot(b));
    if angle <= 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// The unique circle through three points, as an arc from `start` through
/// `mid` to `end`.
///
/// Returns `None` when any two points coincide or the three are collinear
/// within `tol`. Callers treat that as "no radius yet".
pub fn fit_circular_arc(start: DVec3, mid: DVec3, end: DVec3, tol: f64) -> Option<CircularArc> {
    let u = mid - start;
    let v = end - start;
    if u.length() <= tol || v.length() <= tol || (end - mid).length() <= tol {
        return None;
    }

    let w = u.cross(v);
    let w_len2 = w.length_squared();
    // sin(angle at start) below tolerance: collinear
    let limit = tol * u.length() * v.length();
    if w_len2 <= limit * limit {
        return None;
    }

    let center = start
        + (v.cross(w) * u.length_squared() + w.cross(u) * v.length_squared()) / (2.0 * w_len2);
    let normal = w / w_len2.sqrt();
    let radius = start.distance(center);
    if !radius.is_finite() {
        return None;
    }

    Some(CircularArc {
        center,
        radius,
        normal,
        start,
        end,
        sweep: sweep_about(start - center, end - center, normal),
    })
}

/// Arc around an angle vertex, drawn at the length of the shorter arm.
///
/// Returns `None` when either arm is degenerate or the arms are collinear
/// (the plane of the angle is undefined).
pub fn arc_from_center(center: DVec3, start: DVec3, end: DVec3, tol: f64) -> Option<CircularArc> {
    let a = start - center;
    let b = end - center;
    let (la, lb) = (a.length(), b.length());
    if la <= tol || lb <= tol {
        return None;
    }

    let n = a.cross(b);
    if n.length() <= tol * la * lb {
        return None;
    }
    let normal = n.normalize();
    let radius = la.min(lb);

    Some(CircularArc {
        center,
        radius,
        normal,
        start: center + a / la * radius,
        end: center + b / lb * radius,
        sweep: sweep_about(a, b, normal),
    })
}
