use glam::DVec3;
use kurbo::Point;
use shared::{DistanceFormatting, FormatterSpecRef};

use super::label::ValueFormatter;
use super::{DecorationGeometry, MeasurementProperty, MeasurementVariant, POINT_SIZE};
use crate::geometry::{is_almost_equal, visible_segment_midpoint, DEFAULT_TOLERANCE};
use crate::i18n::t;
use crate::render::{well_known, GraphicBuilder, GraphicStyle, StyleTheme};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// Horizontal leg in the start point's elevation
    Run,
    /// Vertical leg up to the end point
    Rise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLine {
    pub kind: AxisKind,
    pub start: DVec3,
    pub end: DVec3,
}

/// Straight-line distance between two points, with optional run/rise axes
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMeasurement {
    start: DVec3,
    end: DVec3,
    show_axes: bool,
    axes: Vec<AxisLine>,
    pub formatting: DistanceFormatting,
}

impl DistanceMeasurement {
    pub fn new(start: DVec3, end: DVec3) -> Self {
        let mut m = Self {
            start,
            end,
            show_axes: false,
            axes: Vec::new(),
            formatting: DistanceFormatting::default(),
        };
        m.rebuild_axes();
        m
    }

    pub fn start_point(&self) -> DVec3 {
        self.start
    }

    pub fn end_point(&self) -> DVec3 {
        self.end
    }

    pub fn set_start_point(&mut self, p: DVec3) {
        self.start = p;
        self.rebuild_axes();
    }

    pub fn set_end_point(&mut self, p: DVec3) {
        self.end = p;
        self.rebuild_axes();
    }

    pub fn show_axes(&self) -> bool {
        self.show_axes
    }

    pub fn set_show_axes(&mut self, show: bool) {
        self.show_axes = show;
    }

    /// Run and rise legs; empty when the segment is flat or vertical
    pub fn axes(&self) -> &[AxisLine] {
        &self.axes
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Horizontal (XY) distance
    pub fn run(&self) -> f64 {
        (self.end - self.start).truncate().length()
    }

    pub fn rise(&self) -> f64 {
        self.end.z - self.start.z
    }

    /// Rise over run as a percentage; undefined for vertical segments
    pub fn slope(&self) -> Option<f64> {
        let run = self.run();
        (run > DEFAULT_TOLERANCE).then(|| self.rise() / run * 100.0)
    }

    fn rebuild_axes(&mut self) {
        self.axes.clear();
        if self.run() <= DEFAULT_TOLERANCE || self.rise().abs() <= DEFAULT_TOLERANCE {
            return;
        }
        let corner = DVec3::new(self.end.x, self.end.y, self.start.z);
        self.axes.push(AxisLine {
            kind: AxisKind::Run,
            start: self.start,
            end: corner,
        });
        self.axes.push(AxisLine {
            kind: AxisKind::Rise,
            start: corner,
            end: self.end,
        });
    }

    pub fn equals(&self, other: &DistanceMeasurement, tol: f64) -> bool {
        is_almost_equal(self.start, other.start, tol)
            && is_almost_equal(self.end, other.end, tol)
            && self.show_axes == other.show_axes
            && self.formatting == other.formatting
    }
}

impl MeasurementVariant for DistanceMeasurement {
    fn kind_name(&self) -> &'static str {
        "distance"
    }

    fn title_key(&self) -> &'static str {
        "measure.distance"
    }

    fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        vec![self.formatting.length.clone()]
    }

    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        theme: &StyleTheme,
        _is_dynamic: bool,
    ) {
        builder.add_styled_line_string(&[self.start, self.end], style);
        if self.show_axes {
            let faded = theme.resolve(well_known::FADED);
            for axis in &self.axes {
                builder.add_styled_line_string(&[axis.start, axis.end], faded);
            }
        }
        builder.add_styled_points(&[self.start, self.end], POINT_SIZE, style);
    }

    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)> {
        let a = viewport.world_to_view(self.start)?;
        let b = viewport.world_to_view(self.end)?;
        let view = visible_segment_midpoint(viewport.view_rect, a, b)?;
        Some((self.start.lerp(self.end, 0.5), view))
    }

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        vec![fmt.length(&self.formatting.length, self.length())]
    }

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        let len = &self.formatting.length;
        let mut lines = vec![
            format!("{}: {}", t("prop.length"), fmt.length(len, self.length())),
            format!("{}: {}", t("prop.run"), fmt.length(len, self.run())),
            format!("{}: {}", t("prop.rise"), fmt.length(len, self.rise())),
        ];
        if let Some(slope) = self.slope() {
            lines.push(format!("{}: {}", t("prop.slope"), fmt.percent(slope)));
        }
        lines
    }

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty> {
        let len = &self.formatting.length;
        let coord = FormatterSpecRef::coordinate();
        let mut props = vec![
            MeasurementProperty::new("prop.length", fmt.length(len, self.length())),
            MeasurementProperty::new("prop.run", fmt.length(len, self.run())),
            MeasurementProperty::new("prop.rise", fmt.length(len, self.rise())),
        ];
        if let Some(slope) = self.slope() {
            props.push(MeasurementProperty::new("prop.slope", fmt.percent(slope)));
        }
        props.push(MeasurementProperty::new("prop.start_point", fmt.point(&coord, self.start)));
        props.push(MeasurementProperty::new("prop.end_point", fmt.point(&coord, self.end)));
        props
    }

    fn decoration_geometry(&self, _is_dynamic: bool) -> Option<DecorationGeometry> {
        Some(DecorationGeometry::Points(vec![self.start, self.end]))
    }
}
