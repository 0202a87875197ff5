use glam::DVec3;
use kurbo::Point;
use shared::{AreaFormatting, FormatterSpecRef};

use super::label::ValueFormatter;
use super::{DecorationGeometry, MeasurementProperty, MeasurementVariant, POINT_SIZE};
use crate::geometry::{
    is_almost_equal, is_valid_polygon, polygon_metrics, PolygonMetrics, ProjectionPlane,
    DEFAULT_TOLERANCE,
};
use crate::i18n::t;
use crate::render::{GraphicBuilder, GraphicStyle, StyleTheme};
use crate::viewport::Viewport;

/// Outcome of adding a vertex to a polygon under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddPointResult {
    Added,
    /// The point snapped to the first vertex and closed a valid polygon
    Closed,
    /// Duplicate of the previous vertex, premature closure, a degenerate
    /// closure or an already closed polygon
    Rejected,
}

/// Polygon area. Points may be open or explicitly closed (last == first).
#[derive(Debug, Clone, PartialEq)]
pub struct AreaMeasurement {
    points: Vec<DVec3>,
    /// Rubber-band point following the cursor while under construction
    dynamic_point: Option<DVec3>,
    pub formatting: AreaFormatting,
}

impl AreaMeasurement {
    pub fn new(points: Vec<DVec3>) -> Self {
        Self {
            points,
            dynamic_point: None,
            formatting: AreaFormatting::default(),
        }
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<DVec3>) {
        self.points = points;
    }

    pub fn dynamic_point(&self) -> Option<DVec3> {
        self.dynamic_point
    }

    pub fn set_dynamic_point(&mut self, point: Option<DVec3>) {
        self.dynamic_point = point;
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(&first), Some(&last)) if self.points.len() >= 4 => {
                is_almost_equal(first, last, DEFAULT_TOLERANCE)
            }
            _ => false,
        }
    }

    pub fn is_valid_polygon(&self) -> bool {
        is_valid_polygon(&self.points, DEFAULT_TOLERANCE)
    }

    pub fn metrics(&self) -> PolygonMetrics {
        polygon_metrics(&self.points, ProjectionPlane::BestFit)
    }

    /// Best-fit plane area; `None` while the polygon is degenerate
    pub fn area(&self) -> Option<f64> {
        self.is_valid_polygon().then(|| self.metrics().area.abs())
    }

    pub fn area_xy(&self) -> Option<f64> {
        self.is_valid_polygon().then(|| self.metrics().area_xy.abs())
    }

    pub fn perimeter(&self) -> f64 {
        self.metrics().perimeter
    }

    /// Vertex average, closing repeat excluded
    pub fn centroid(&self) -> DVec3 {
        self.metrics().centroid
    }

    /// Append a vertex while drawing. A point within `tol` of the first
    /// vertex closes the polygon once it has at least three vertices.
    pub fn add_point_to_dynamic_polygon(&mut self, point: DVec3, tol: f64) -> AddPointResult {
        if self.is_closed() {
            return AddPointResult::Rejected;
        }
        if self
            .points
            .last()
            .is_some_and(|&last| is_almost_equal(last, point, tol))
        {
            return AddPointResult::Rejected;
        }
        let snaps_to_first = self
            .points
            .first()
            .is_some_and(|&first| is_almost_equal(first, point, tol));
        if snaps_to_first {
            if self.points.len() < 3 {
                return AddPointResult::Rejected;
            }
            self.points.push(self.points[0]);
            if is_valid_polygon(&self.points, DEFAULT_TOLERANCE) {
                self.dynamic_point = None;
                return AddPointResult::Closed;
            }
            self.points.pop();
            return AddPointResult::Rejected;
        }
        self.points.push(point);
        AddPointResult::Added
    }

    /// Explicitly close an open polygon of at least three vertices
    pub fn close(&mut self) -> bool {
        if self.is_closed() || self.points.len() < 3 {
            return false;
        }
        self.points.push(self.points[0]);
        if is_valid_polygon(&self.points, DEFAULT_TOLERANCE) {
            self.dynamic_point = None;
            true
        } else {
            self.points.pop();
            false
        }
    }

    /// Distinct vertices, not counting the closing repeat
    pub fn vertex_count(&self) -> usize {
        if self.is_closed() {
            self.points.len() - 1
        } else {
            self.points.len()
        }
    }

    /// Vertices plus the rubber-band point, as drawn while constructing
    fn drawn_points(&self) -> Vec<DVec3> {
        let mut pts = self.points.clone();
        if let Some(p) = self.dynamic_point {
            pts.push(p);
        }
        pts
    }

    pub fn equals(&self, other: &AreaMeasurement, tol: f64) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(&other.points)
                .all(|(a, b)| is_almost_equal(*a, *b, tol))
            && self.formatting == other.formatting
    }
}

impl MeasurementVariant for AreaMeasurement {
    fn kind_name(&self) -> &'static str {
        "area"
    }

    fn title_key(&self) -> &'static str {
        "measure.area"
    }

    fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        vec![self.formatting.length.clone(), self.formatting.area.clone()]
    }

    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        _theme: &StyleTheme,
        is_dynamic: bool,
    ) {
        if is_dynamic && !self.is_closed() {
            let pts = self.drawn_points();
            builder.add_styled_line_string(&pts, style);
            builder.add_styled_points(&self.points, POINT_SIZE, style);
            return;
        }
        if self.is_valid_polygon() {
            builder.add_styled_shape(&self.points, style);
        } else {
            builder.add_styled_line_string(&self.points, style);
        }
    }

    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)> {
        if !self.is_valid_polygon() {
            return None;
        }
        let centroid = self.centroid();
        let view = viewport.world_to_view(centroid)?;
        viewport.view_rect.contains(view).then_some((centroid, view))
    }

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        let value = if fmt.sheet_active() {
            self.area_xy()
        } else {
            self.area()
        };
        match value {
            Some(a) => vec![fmt.area(&self.formatting.area, a)],
            None => Vec::new(),
        }
    }

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        match self.area() {
            Some(a) => {
                let value = fmt.area(&self.formatting.area, a);
                lines.push(format!("{}: {}", t("prop.area"), value));
            }
            None => lines.push(format!("{}: {}", t("prop.area"), t("label.incomplete"))),
        }
        lines.push(format!(
            "{}: {}",
            t("prop.perimeter"),
            fmt.length(&self.formatting.length, self.perimeter())
        ));
        lines
    }

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty> {
        let area = &self.formatting.area;
        let incomplete = || t("label.incomplete").to_string();
        vec![
            MeasurementProperty::new(
                "prop.area",
                self.area().map(|a| fmt.area(area, a)).unwrap_or_else(incomplete),
            ),
            MeasurementProperty::new(
                "prop.area_xy",
                self.area_xy().map(|a| fmt.area(area, a)).unwrap_or_else(incomplete),
            ),
            MeasurementProperty::new(
                "prop.perimeter",
                fmt.length(&self.formatting.length, self.perimeter()),
            ),
            MeasurementProperty::new("prop.points", self.vertex_count().to_string()),
        ]
    }

    fn decoration_geometry(&self, is_dynamic: bool) -> Option<DecorationGeometry> {
        if self.points.is_empty() {
            return None;
        }
        if is_dynamic && self.points.len() >= 3 && !self.is_closed() {
            return Some(DecorationGeometry::Point(self.points[0]));
        }
        Some(DecorationGeometry::Points(self.points.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{SpecCache, UnitsFormatter};

    fn square() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 2.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
        ]
    }

    #[test]
    fn test_area_of_open_and_closed_square() {
        let mut a = AreaMeasurement::new(square());
        assert!(!a.is_closed());
        assert!((a.area().unwrap() - 4.0).abs() < 1e-12);
        assert!(a.close());
        assert!(a.is_closed());
        assert!((a.area().unwrap() - 4.0).abs() < 1e-12);
        assert!((a.perimeter() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_polygon_has_no_area() {
        let a = AreaMeasurement::new(vec![DVec3::ZERO, DVec3::X, DVec3::X * 2.0]);
        assert!(!a.is_valid_polygon());
        assert!(a.area().is_none());
    }

    #[test]
    fn test_add_point_closes_on_first_vertex() {
        let mut a = AreaMeasurement::new(Vec::new());
        for p in square() {
            assert_eq!(a.add_point_to_dynamic_polygon(p, 1e-6), AddPointResult::Added);
        }
        assert_eq!(
            a.add_point_to_dynamic_polygon(DVec3::new(1e-9, 0.0, 0.0), 1e-6),
            AddPointResult::Closed
        );
        assert!(a.is_closed());
        assert_eq!(a.points().len(), 5);
        assert_eq!(
            a.add_point_to_dynamic_polygon(DVec3::new(5.0, 5.0, 0.0), 1e-6),
            AddPointResult::Rejected
        );
    }

    #[test]
    fn test_add_point_rejects_duplicates_and_early_close() {
        let mut a = AreaMeasurement::new(Vec::new());
        assert_eq!(a.add_point_to_dynamic_polygon(DVec3::ZERO, 1e-6), AddPointResult::Added);
        assert_eq!(a.add_point_to_dynamic_polygon(DVec3::ZERO, 1e-6), AddPointResult::Rejected);
        assert_eq!(a.add_point_to_dynamic_polygon(DVec3::X, 1e-6), AddPointResult::Added);
        assert_eq!(a.add_point_to_dynamic_polygon(DVec3::ZERO, 1e-6), AddPointResult::Rejected);
        assert_eq!(a.points().len(), 2);
    }

    #[test]
    fn test_degenerate_closure_is_rejected() {
        let mut a = AreaMeasurement::new(vec![DVec3::ZERO, DVec3::X, DVec3::X * 2.0]);
        assert_eq!(a.add_point_to_dynamic_polygon(DVec3::ZERO, 1e-6), AddPointResult::Rejected);
        assert_eq!(a.points().len(), 3);
        assert!(!a.is_closed());
    }

    #[test]
    fn test_dynamic_decoration_returns_first_point() {
        let a = AreaMeasurement::new(square());
        assert_eq!(a.decoration_geometry(true), Some(DecorationGeometry::Point(DVec3::ZERO)));
        match a.decoration_geometry(false) {
            Some(DecorationGeometry::Points(p)) => assert_eq!(p.len(), 4),
            other => panic!("unexpected {other:?}"),
        }
        let short = AreaMeasurement::new(square()[..2].to_vec());
        assert!(matches!(short.decoration_geometry(true), Some(DecorationGeometry::Points(_))));
    }

    #[test]
    fn test_label_switches_to_xy_area_on_sheets() {
        let tilted = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 2.0, 2.0),
            DVec3::new(0.0, 2.0, 2.0),
        ];
        let a = AreaMeasurement::new(tilted);
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();

        let model = ValueFormatter::new(&cache, &f, None);
        let expected = format!("{:.2} m²", 4.0 * 2f64.sqrt());
        assert_eq!(a.label_lines(&model), vec![expected]);

        let meta = shared::DrawingMetadata {
            origin: Some([1.0, 1.0]),
            world_scale: None,
        };
        let sheet = ValueFormatter::new(&cache, &f, Some(&meta));
        assert_eq!(a.label_lines(&sheet), vec!["4.00 m²".to_string()]);
    }

    #[test]
    fn test_incomplete_tooltip() {
        let a = AreaMeasurement::new(vec![DVec3::ZERO, DVec3::X]);
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let fmt = ValueFormatter::new(&cache, &f, None);
        let lines = a.tooltip_lines(&fmt);
        assert!(lines[0].ends_with(t("label.incomplete")));
        assert!(a.label_lines(&fmt).is_empty());
    }
}
