//! Measurement entity: identity and presentation state around one of five
//! geometry variants.
//!
//! [`Measurement`] owns everything transient about a measurement as well:
//! its cached render graphic, its lazily allocated pick id and the label
//! rectangles of the last frame. Any geometry, lock or style change drops the
//! cached graphic before the mutation is applied.

mod angle;
mod area;
mod distance;
pub mod label;
mod location;
mod props;
mod radius;
pub mod serialize;

pub use angle::AngleMeasurement;
pub use area::{AddPointResult, AreaMeasurement};
pub use distance::{AxisKind, AxisLine, DistanceMeasurement};
pub use location::LocationMeasurement;
pub use props::{MeasurementId, MeasurementProps};
pub use radius::RadiusMeasurement;
pub use serialize::{export_document, measurements_from_json, measurements_to_json};

use glam::DVec3;
use kurbo::{Point, Rect};
use shared::{DrawingMetadata, FormatterSpecRef};

use crate::events::{ButtonEventResult, MouseButton};
use crate::format::{QuantityFormatter, SpecCache};
use crate::geometry::CircularArc;
use crate::i18n::t;
use crate::pick::{PickContext, PickId, PickIdAllocator};
use crate::render::{GraphicBuilder, GraphicStyle, RenderGraphic, RenderTarget, StyleTheme};
use crate::view_target::ViewTarget;
use crate::viewport::{Viewport, ViewportId};

use label::ValueFormatter;

/// Marker size for measured points, in pixels
pub(crate) const POINT_SIZE: f32 = 6.0;

/// Everything a measurement needs to draw itself into one viewport
pub struct DecorateContext<'a> {
    pub viewport: &'a Viewport,
    pub target: &'a mut dyn RenderTarget,
    pub theme: &'a StyleTheme,
    pub formatter: &'a dyn QuantityFormatter,
    pub pick_ids: &'a mut PickIdAllocator,
    pub label_font_size: f32,
}

/// Lightweight pickable geometry, distinct from the rendered graphic
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationGeometry {
    Point(DVec3),
    Points(Vec<DVec3>),
    Arc(CircularArc),
}

/// One row of the property grid
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementProperty {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl MeasurementProperty {
    pub(crate) fn new(key: &'static str, value: String) -> Self {
        Self {
            key,
            label: t(key),
            value,
        }
    }
}

/// Capabilities every geometry variant provides
pub(crate) trait MeasurementVariant {
    fn kind_name(&self) -> &'static str;

    /// i18n key of the tooltip title
    fn title_key(&self) -> &'static str;

    fn formatting_refs(&self) -> Vec<FormatterSpecRef>;

    /// World-space graphics that do not depend on the viewport
    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        theme: &StyleTheme,
        is_dynamic: bool,
    );

    /// Graphics recomputed every frame for a given viewport
    fn add_view_graphics(
        &self,
        _builder: &mut GraphicBuilder,
        _style: &GraphicStyle,
        _viewport: &Viewport,
    ) {
    }

    /// World anchor and its on-screen position
    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)>;

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String>;

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String>;

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty>;

    fn decoration_geometry(&self, is_dynamic: bool) -> Option<DecorationGeometry>;
}

/// Geometry payload of a measurement
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementKind {
    Distance(DistanceMeasurement),
    Area(AreaMeasurement),
    Location(LocationMeasurement),
    Radius(RadiusMeasurement),
    Angle(AngleMeasurement),
}

impl MeasurementKind {
    pub(crate) fn variant(&self) -> &dyn MeasurementVariant {
        match self {
            MeasurementKind::Distance(m) => m,
            MeasurementKind::Area(m) => m,
            MeasurementKind::Location(m) => m,
            MeasurementKind::Radius(m) => m,
            MeasurementKind::Angle(m) => m,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.variant().kind_name()
    }

    /// Geometry and formatting equal within `tol`
    pub fn equals(&self, other: &MeasurementKind, tol: f64) -> bool {
        match (self, other) {
            (MeasurementKind::Distance(a), MeasurementKind::Distance(b)) => a.equals(b, tol),
            (MeasurementKind::Area(a), MeasurementKind::Area(b)) => a.equals(b, tol),
            (MeasurementKind::Location(a), MeasurementKind::Location(b)) => a.equals(b, tol),
            (MeasurementKind::Radius(a), MeasurementKind::Radius(b)) => a.equals(b, tol),
            (MeasurementKind::Angle(a), MeasurementKind::Angle(b)) => a.equals(b, tol),
            _ => false,
        }
    }

    pub fn as_distance(&self) -> Option<&DistanceMeasurement> {
        match self {
            MeasurementKind::Distance(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_area(&self) -> Option<&AreaMeasurement> {
        match self {
            MeasurementKind::Area(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_location(&self) -> Option<&LocationMeasurement> {
        match self {
            MeasurementKind::Location(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_radius(&self) -> Option<&RadiusMeasurement> {
        match self {
            MeasurementKind::Radius(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_angle(&self) -> Option<&AngleMeasurement> {
        match self {
            MeasurementKind::Angle(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Measurement {
    props: MeasurementProps,
    kind: MeasurementKind,
    formats: SpecCache,
    graphic: Option<Box<dyn RenderGraphic>>,
    pick_id: Option<PickId>,
    label_rects: Vec<(ViewportId, Rect)>,
}

impl Measurement {
    pub fn new(kind: MeasurementKind) -> Self {
        Self::with_props(MeasurementProps::default(), kind)
    }

    pub fn with_props(props: MeasurementProps, kind: MeasurementKind) -> Self {
        Self {
            props,
            kind,
            formats: SpecCache::default(),
            graphic: None,
            pick_id: None,
            label_rects: Vec::new(),
        }
    }

    pub fn distance(start: DVec3, end: DVec3) -> Self {
        Self::new(MeasurementKind::Distance(DistanceMeasurement::new(start, end)))
    }

    pub fn area(points: Vec<DVec3>) -> Self {
        Self::new(MeasurementKind::Area(AreaMeasurement::new(points)))
    }

    pub fn location(point: DVec3) -> Self {
        Self::new(MeasurementKind::Location(LocationMeasurement::new(point)))
    }

    /// Radius with only its start point; mid and end follow
    pub fn radius(start: DVec3) -> Self {
        Self::new(MeasurementKind::Radius(RadiusMeasurement::new(start)))
    }

    pub fn radius_through(start: DVec3, mid: DVec3, end: DVec3) -> Self {
        Self::new(MeasurementKind::Radius(RadiusMeasurement::through(start, mid, end)))
    }

    /// Angle with only its first arm point; center and end follow
    pub fn angle(start: DVec3) -> Self {
        Self::new(MeasurementKind::Angle(AngleMeasurement::new(start)))
    }

    pub fn angle_between(start: DVec3, center: DVec3, end: DVec3) -> Self {
        Self::new(MeasurementKind::Angle(AngleMeasurement::between(start, center, end)))
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn id(&self) -> MeasurementId {
        self.props.id
    }

    pub fn props(&self) -> &MeasurementProps {
        &self.props
    }

    pub fn kind(&self) -> &MeasurementKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    pub fn is_locked(&self) -> bool {
        self.props.is_locked
    }

    pub fn is_visible(&self) -> bool {
        self.props.is_visible
    }

    pub fn is_dynamic(&self) -> bool {
        self.props.is_dynamic
    }

    pub fn view_target(&self) -> &ViewTarget {
        &self.props.view_target
    }

    pub fn group_id(&self) -> Option<&str> {
        self.props.group_id.as_deref()
    }

    /// Transient pick id, if one has been allocated
    pub fn pick_id(&self) -> Option<PickId> {
        self.pick_id
    }

    pub fn has_cached_graphic(&self) -> bool {
        self.graphic.is_some()
    }

    pub fn formats(&self) -> &SpecCache {
        &self.formats
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Drop the cached graphic so the next frame rebuilds it
    pub fn invalidate(&mut self) {
        self.graphic = None;
    }

    /// Apply a geometry edit. Locked measurements are left untouched.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut MeasurementKind) -> R) -> Option<R> {
        if self.props.is_locked {
            return None;
        }
        self.invalidate();
        Some(f(&mut self.kind))
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.props.is_locked != locked {
            self.invalidate();
            self.props.is_locked = locked;
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.props.is_visible = visible;
    }

    pub fn set_display_labels(&mut self, display: bool) {
        self.props.display_labels = display;
    }

    pub fn set_dynamic(&mut self, dynamic: bool) {
        if self.props.is_dynamic != dynamic {
            self.invalidate();
            self.props.is_dynamic = dynamic;
        }
    }

    pub fn set_style(&mut self, style: Option<String>) {
        self.invalidate();
        self.props.style = style;
    }

    pub fn set_locked_style(&mut self, style: Option<String>) {
        self.invalidate();
        self.props.locked_style = style;
    }

    pub fn set_group_id(&mut self, group_id: Option<String>) {
        self.props.group_id = group_id;
    }

    pub fn set_subgroup_id(&mut self, subgroup_id: Option<String>) {
        self.props.subgroup_id = subgroup_id;
    }

    pub fn set_view_target(&mut self, view_target: ViewTarget) {
        self.props.view_target = view_target;
    }

    pub fn set_drawing_metadata(&mut self, metadata: Option<DrawingMetadata>) {
        self.invalidate();
        self.props.drawing_metadata = metadata;
    }

    /// Cleanup hook run when the measurement leaves the manager: disposes
    /// the cached graphic and forgets the pick id.
    pub fn on_cleanup(&mut self) {
        self.invalidate();
        self.pick_id = None;
        self.label_rects.clear();
    }

    /// Copy every persisted and presentation field of `other`, including
    /// its id. Transient render state is reset.
    pub fn copy_from(&mut self, other: &Measurement) {
        self.on_cleanup();
        self.props = other.props.clone();
        self.kind = other.kind.clone();
        self.formats = other.formats.clone();
    }

    /// Structural equality within `tol`, ignoring `is_dynamic` and all
    /// transient render state.
    pub fn equals(&self, other: &Measurement, tol: f64) -> bool {
        self.props.equals(&other.props) && self.kind.equals(&other.kind, tol)
    }

    // ── Formatting ────────────────────────────────────────────

    pub fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        self.kind.variant().formatting_refs()
    }

    /// Re-resolve formatter specs; returns how many are still pending
    pub fn refresh_formatting(&mut self, formatter: &dyn QuantityFormatter) -> usize {
        let refs = self.formatting_refs();
        self.formats.refresh(&refs, formatter)
    }

    fn value_formatter<'a>(&'a self, formatter: &'a dyn QuantityFormatter) -> ValueFormatter<'a> {
        ValueFormatter::new(&self.formats, formatter, self.props.drawing_metadata.as_ref())
    }

    pub fn tooltip(&self, formatter: &dyn QuantityFormatter) -> Vec<String> {
        let variant = self.kind.variant();
        let mut lines = vec![t(variant.title_key()).to_string()];
        lines.extend(variant.tooltip_lines(&self.value_formatter(formatter)));
        lines
    }

    pub fn properties(&self, formatter: &dyn QuantityFormatter) -> Vec<MeasurementProperty> {
        self.kind
            .variant()
            .properties(&self.value_formatter(formatter))
    }

    // ── Picking ───────────────────────────────────────────────

    /// Hit when the context's geometry id is this measurement's pick id,
    /// or when the pointer lies inside one of its labels in that viewport.
    pub fn test_hit(&self, ctx: &PickContext) -> bool {
        if self.props.is_dynamic && !ctx.allow_dynamic {
            return false;
        }
        if let (Some(geom), Some(mine)) = (ctx.geom_id, self.pick_id) {
            if geom == mine {
                return true;
            }
        }
        if !self.props.display_labels {
            return false;
        }
        match (ctx.view_point, ctx.viewport_id) {
            (Some(p), Some(vp)) => self
                .label_rects
                .iter()
                .any(|(id, rect)| *id == vp && rect.contains(p)),
            _ => false,
        }
    }

    pub fn decoration_geometry(&self, _ctx: &PickContext) -> Option<DecorationGeometry> {
        self.kind
            .variant()
            .decoration_geometry(self.props.is_dynamic)
    }

    /// Data button: react (the host opens the action toolbar) but let the
    /// selection tool see the click too. Reset button: handled here and
    /// consumed.
    pub fn on_button_event(&self, ctx: &PickContext) -> ButtonEventResult {
        match ctx.button {
            Some(MouseButton::Data) => ButtonEventResult::Handled { consumed: false },
            Some(MouseButton::Reset) => ButtonEventResult::Handled { consumed: true },
            _ => ButtonEventResult::NotHandled,
        }
    }

    // ── Drawing ───────────────────────────────────────────────

    /// Draw into one viewport. Committed measurements reuse their cached
    /// graphic; dynamic ones rebuild every frame in the dynamic style.
    pub fn decorate(&mut self, dc: &mut DecorateContext<'_>) {
        let viewport = dc.viewport;
        if !self.props.is_visible || !self.props.view_target.accepts(viewport) {
            return;
        }
        let theme = dc.theme;
        let formatter = dc.formatter;
        let pick_id = *self.pick_id.get_or_insert_with(|| dc.pick_ids.allocate());
        let style = theme.resolve(self.props.active_style_name());
        let variant = self.kind.variant();

        if self.props.is_dynamic {
            let mut builder = GraphicBuilder::new(Some(pick_id));
            variant.add_graphics(&mut builder, style, theme, true);
            variant.add_view_graphics(&mut builder, style, viewport);
            dc.target.add_dynamic(builder.finish());
        } else {
            if self.graphic.is_none() {
                let mut builder = GraphicBuilder::new(Some(pick_id));
                variant.add_graphics(&mut builder, style, theme, false);
                if !builder.is_empty() {
                    self.graphic = Some(dc.target.create_graphic(builder.finish()));
                }
            }
            if let Some(graphic) = &self.graphic {
                dc.target.add_graphic(graphic.as_ref());
            }
            let mut view = GraphicBuilder::new(Some(pick_id));
            variant.add_view_graphics(&mut view, style, viewport);
            if !view.is_empty() {
                dc.target.add_dynamic(view.finish());
            }
        }

        self.label_rects.retain(|(id, _)| *id != viewport.id);
        if self.props.display_labels {
            let metadata = self.props.drawing_metadata.as_ref();
            let fmt = ValueFormatter::new(&self.formats, formatter, metadata);
            if let Some(text) =
                label::build_label(variant, &fmt, viewport, dc.label_font_size, pick_id, style)
            {
                self.label_rects.push((viewport.id, text.pick_rect()));
                dc.target.add_label(text);
            }
        }
    }
}
