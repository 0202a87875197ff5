use glam::DVec3;
use kurbo::Point;
use shared::{FormatterSpecRef, RadiusFormatting};

use super::label::ValueFormatter;
use super::{DecorationGeometry, MeasurementProperty, MeasurementVariant, POINT_SIZE};
use crate::geometry::{fit_circular_arc, is_almost_equal, CircularArc, DEFAULT_TOLERANCE};
use crate::i18n::t;
use crate::render::{GraphicBuilder, GraphicStyle, StyleTheme};
use crate::viewport::Viewport;

pub(super) fn same_point(a: Option<DVec3>, b: Option<DVec3>, tol: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => is_almost_equal(a, b, tol),
        (None, None) => true,
        _ => false,
    }
}

/// Circle through three picked points
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusMeasurement {
    start: DVec3,
    mid: Option<DVec3>,
    end: Option<DVec3>,
    arc: Option<CircularArc>,
    pub formatting: RadiusFormatting,
}

impl RadiusMeasurement {
    pub fn new(start: DVec3) -> Self {
        Self {
            start,
            mid: None,
            end: None,
            arc: None,
            formatting: RadiusFormatting::default(),
        }
    }

    pub fn through(start: DVec3, mid: DVec3, end: DVec3) -> Self {
        let mut m = Self::new(start);
        m.mid = Some(mid);
        m.end = Some(end);
        m.refit();
        m
    }

    pub fn start_point(&self) -> DVec3 {
        self.start
    }

    pub fn mid_point(&self) -> Option<DVec3> {
        self.mid
    }

    pub fn end_point(&self) -> Option<DVec3> {
        self.end
    }

    pub fn set_start_point(&mut self, p: DVec3) {
        self.start = p;
        self.refit();
    }

    pub fn set_mid_point(&mut self, p: DVec3) {
        self.mid = Some(p);
        self.refit();
    }

    pub fn set_end_point(&mut self, p: DVec3) {
        self.end = Some(p);
        self.refit();
    }

    /// Keeps the previous arc when the points are degenerate
    fn refit(&mut self) {
        if let (Some(mid), Some(end)) = (self.mid, self.end) {
            if let Some(arc) = fit_circular_arc(self.start, mid, end, DEFAULT_TOLERANCE) {
                self.arc = Some(arc);
            }
        }
    }

    pub fn arc(&self) -> Option<&CircularArc> {
        self.arc.as_ref()
    }

    pub fn radius(&self) -> Option<f64> {
        self.arc.map(|a| a.radius)
    }

    pub fn diameter(&self) -> Option<f64> {
        self.radius().map(|r| 2.0 * r)
    }

    pub fn arc_length(&self) -> Option<f64> {
        self.arc.map(|a| a.length())
    }

    pub fn circumference(&self) -> Option<f64> {
        self.arc.map(|a| a.circumference())
    }

    fn picked_points(&self) -> Vec<DVec3> {
        std::iter::once(self.start)
            .chain(self.mid)
            .chain(self.end)
            .collect()
    }

    pub fn equals(&self, other: &RadiusMeasurement, tol: f64) -> bool {
        is_almost_equal(self.start, other.start, tol)
            && same_point(self.mid, other.mid, tol)
            && same_point(self.end, other.end, tol)
            && self.formatting == other.formatting
    }
}

impl MeasurementVariant for RadiusMeasurement {
    fn kind_name(&self) -> &'static str {
        "radius"
    }

    fn title_key(&self) -> &'static str {
        "measure.radius"
    }

    fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        vec![self.formatting.length.clone()]
    }

    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        _theme: &StyleTheme,
        _is_dynamic: bool,
    ) {
        let points = self.picked_points();
        match &self.arc {
            Some(arc) => {
                builder.add_styled_arc(arc, style);
                builder.add_styled_line_string(&[arc.center, arc.mid_point()], style);
            }
            None => builder.add_styled_line_string(&points, style),
        }
        builder.add_styled_points(&points, POINT_SIZE, style);
    }

    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)> {
        let arc = self.arc.as_ref()?;
        let world = arc.center.lerp(arc.mid_point(), 0.5);
        let view = viewport.world_to_view(world)?;
        viewport.view_rect.contains(view).then_some((world, view))
    }

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        match self.radius() {
            Some(r) => vec![format!(
                "{} {}",
                t("label.radius"),
                fmt.length(&self.formatting.length, r)
            )],
            None => Vec::new(),
        }
    }

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        self.properties(fmt)
            .into_iter()
            .take(2)
            .map(|p| format!("{}: {}", p.label, p.value))
            .collect()
    }

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty> {
        let len = &self.formatting.length;
        let show = |v: Option<f64>| {
            v.map(|v| fmt.length(len, v))
                .unwrap_or_else(|| t("label.incomplete").to_string())
        };
        let coord = FormatterSpecRef::coordinate();
        let mut props = vec![
            MeasurementProperty::new("prop.radius", show(self.radius())),
            MeasurementProperty::new("prop.diameter", show(self.diameter())),
            MeasurementProperty::new("prop.arc_length", show(self.arc_length())),
            MeasurementProperty::new("prop.circumference", show(self.circumference())),
            MeasurementProperty::new("prop.start_point", fmt.point(&coord, self.start)),
        ];
        if let Some(mid) = self.mid {
            props.push(MeasurementProperty::new("prop.mid_point", fmt.point(&coord, mid)));
        }
        if let Some(end) = self.end {
            props.push(MeasurementProperty::new("prop.end_point", fmt.point(&coord, end)));
        }
        props
    }

    fn decoration_geometry(&self, _is_dynamic: bool) -> Option<DecorationGeometry> {
        match &self.arc {
            Some(arc) => Some(DecorationGeometry::Arc(*arc)),
            None => Some(DecorationGeometry::Points(self.picked_points())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{SpecCache, UnitsFormatter};

    #[test]
    fn test_radius_through_three_points() {
        let r = RadiusMeasurement::through(
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
            DVec3::new(-2.0, 0.0, 0.0),
        );
        assert!((r.radius().unwrap() - 2.0).abs() < 1e-9);
        assert!((r.diameter().unwrap() - 4.0).abs() < 1e-9);
        assert!((r.arc_length().unwrap() - std::f64::consts::PI * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_collinear_update_keeps_previous_arc() {
        let mut r = RadiusMeasurement::through(
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
        );
        let before = *r.arc().unwrap();
        r.set_mid_point(DVec3::ZERO);
        assert_eq!(r.arc(), Some(&before));
        assert_eq!(r.mid_point(), Some(DVec3::ZERO));
    }

    #[test]
    fn test_incomplete_radius_has_no_label() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let fmt = ValueFormatter::new(&cache, &f, None);
        let mut r = RadiusMeasurement::new(DVec3::ZERO);
        r.set_mid_point(DVec3::X);
        assert!(r.radius().is_none());
        assert!(r.label_lines(&fmt).is_empty());
        assert_eq!(r.properties(&fmt)[0].value, t("label.incomplete"));
    }

    #[test]
    fn test_label_prefix() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let fmt = ValueFormatter::new(&cache, &f, None);
        let r = RadiusMeasurement::through(DVec3::X, DVec3::Y, -DVec3::X);
        assert_eq!(r.label_lines(&fmt), vec!["R 1.00 m".to_string()]);
    }
}
