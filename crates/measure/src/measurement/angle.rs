use glam::DVec3;
use kurbo::Point;
use shared::{AngleFormatting, FormatterSpecRef};

use super::label::ValueFormatter;
use super::radius::same_point;
use super::{DecorationGeometry, MeasurementProperty, MeasurementVariant, POINT_SIZE};
use crate::geometry::{
    arc_from_center, is_almost_equal, trim_arc_to_view, CircularArc, DEFAULT_TOLERANCE,
};
use crate::i18n::t;
use crate::render::{GraphicBuilder, GraphicStyle, StyleTheme};
use crate::viewport::Viewport;

/// Trimmed arcs are pushed back out by this fraction of the visible radius
const ARC_OUTWARD_OFFSET: f64 = 0.1;

/// Angle at a vertex between two arms
#[derive(Debug, Clone, PartialEq)]
pub struct AngleMeasurement {
    start: DVec3,
    center: Option<DVec3>,
    end: Option<DVec3>,
    arc: Option<CircularArc>,
    pub formatting: AngleFormatting,
}

impl AngleMeasurement {
    pub fn new(start: DVec3) -> Self {
        Self {
            start,
            center: None,
            end: None,
            arc: None,
            formatting: AngleFormatting::default(),
        }
    }

    pub fn between(start: DVec3, center: DVec3, end: DVec3) -> Self {
        let mut m = Self::new(start);
        m.center = Some(center);
        m.end = Some(end);
        m.refit();
        m
    }

    pub fn start_point(&self) -> DVec3 {
        self.start
    }

    pub fn center(&self) -> Option<DVec3> {
        self.center
    }

    pub fn end_point(&self) -> Option<DVec3> {
        self.end
    }

    pub fn set_start_point(&mut self, p: DVec3) {
        self.start = p;
        self.refit();
    }

    pub fn set_center(&mut self, p: DVec3) {
        self.center = Some(p);
        self.refit();
    }

    pub fn set_end_point(&mut self, p: DVec3) {
        self.end = Some(p);
        self.refit();
    }

    /// Keeps the previous arc when the arms are degenerate or collinear
    fn refit(&mut self) {
        if let (Some(center), Some(end)) = (self.center, self.end) {
            if let Some(arc) = arc_from_center(center, self.start, end, DEFAULT_TOLERANCE) {
                self.arc = Some(arc);
            }
        }
    }

    pub fn arc(&self) -> Option<&CircularArc> {
        self.arc.as_ref()
    }

    /// Angle in radians, in (0, π)
    pub fn angle(&self) -> Option<f64> {
        self.arc.map(|a| a.sweep)
    }

    fn picked_points(&self) -> Vec<DVec3> {
        std::iter::once(self.start)
            .chain(self.center)
            .chain(self.end)
            .collect()
    }

    pub fn equals(&self, other: &AngleMeasurement, tol: f64) -> bool {
        is_almost_equal(self.start, other.start, tol)
            && same_point(self.center, other.center, tol)
            && same_point(self.end, other.end, tol)
            && self.formatting == other.formatting
    }
}

impl MeasurementVariant for AngleMeasurement {
    fn kind_name(&self) -> &'static str {
        "angle"
    }

    fn title_key(&self) -> &'static str {
        "measure.angle"
    }

    fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        vec![self.formatting.angle.clone()]
    }

    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        _theme: &StyleTheme,
        _is_dynamic: bool,
    ) {
        let points = self.picked_points();
        builder.add_styled_line_string(&points, style);
        builder.add_styled_points(&points, POINT_SIZE, style);
    }

    /// The arc depends on whether the vertex is on screen
    fn add_view_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        viewport: &Viewport,
    ) {
        let Some(arc) = &self.arc else {
            return;
        };
        match trim_arc_to_view(arc, viewport, ARC_OUTWARD_OFFSET) {
            Some(trimmed) => {
                builder.add_styled_arc(&trimmed, style);
                builder.add_styled_line_string(&[trimmed.start, arc.start], style);
                builder.add_styled_line_string(&[trimmed.end, arc.end], style);
            }
            None => builder.add_styled_arc(arc, style),
        }
    }

    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)> {
        let arc = self.arc.as_ref()?;
        let candidates = [
            Some(arc.mid_point()),
            trim_arc_to_view(arc, viewport, ARC_OUTWARD_OFFSET).map(|a| a.mid_point()),
        ];
        candidates.into_iter().flatten().find_map(|world| {
            let view = viewport.world_to_view(world)?;
            viewport.view_rect.contains(view).then_some((world, view))
        })
    }

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        match self.angle() {
            Some(a) => vec![fmt.value(&self.formatting.angle, a)],
            None => Vec::new(),
        }
    }

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        let value = match self.angle() {
            Some(a) => fmt.value(&self.formatting.angle, a),
            None => t("label.incomplete").to_string(),
        };
        vec![format!("{}: {}", t("prop.angle"), value)]
    }

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty> {
        let coord = FormatterSpecRef::coordinate();
        let angle = self
            .angle()
            .map(|a| fmt.value(&self.formatting.angle, a))
            .unwrap_or_else(|| t("label.incomplete").to_string());
        let mut props = vec![
            MeasurementProperty::new("prop.angle", angle),
            MeasurementProperty::new("prop.start_point", fmt.point(&coord, self.start)),
        ];
        if let Some(center) = self.center {
            props.push(MeasurementProperty::new("prop.center", fmt.point(&coord, center)));
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
