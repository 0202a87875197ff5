//! Render boundary: what measurements hand to a rasterizer.
//!
//! Measurements describe their graphics as [`GraphicPrimitive`]s collected by
//! a [`GraphicBuilder`]. A [`RenderTarget`] turns a finished list into an
//! owned [`RenderGraphic`] handle that the measurement caches; dropping the
//! handle releases it. Transient lists and labels are queued per frame.

pub mod egui_shapes;
pub mod recording;
pub mod style;

pub use egui_shapes::{EguiShapeTarget, LabelAnchor};
pub use recording::RecordingTarget;
pub use style::{well_known, GraphicStyle, StyleTheme};

use glam::DVec3;
use kurbo::{Point, Rect, Size};

use crate::geometry::CircularArc;
use crate::pick::PickId;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphicPrimitive {
    LineString {
        points: Vec<DVec3>,
        style: GraphicStyle,
    },
    /// Closed, filled polygon
    Shape {
        points: Vec<DVec3>,
        style: GraphicStyle,
    },
    Arc {
        arc: CircularArc,
        style: GraphicStyle,
    },
    Points {
        points: Vec<DVec3>,
        size: f32,
        style: GraphicStyle,
    },
}

/// Finished primitives, optionally tagged with the owner's pick id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicList {
    pub primitives: Vec<GraphicPrimitive>,
    pub pick_id: Option<PickId>,
}

impl GraphicList {
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }
}

#[derive(Debug, Default)]
pub struct GraphicBuilder {
    list: GraphicList,
}

impl GraphicBuilder {
    pub fn new(pick_id: Option<PickId>) -> Self {
        Self {
            list: GraphicList {
                primitives: Vec::new(),
                pick_id,
            },
        }
    }

    pub fn add_styled_line_string(&mut self, points: &[DVec3], style: &GraphicStyle) {
        if points.len() < 2 {
            return;
        }
        self.list.primitives.push(GraphicPrimitive::LineString {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    pub fn add_styled_shape(&mut self, points: &[DVec3], style: &GraphicStyle) {
        if points.len() < 3 {
            return;
        }
        self.list.primitives.push(GraphicPrimitive::Shape {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    pub fn add_styled_arc(&mut self, arc: &CircularArc, style: &GraphicStyle) {
        self.list.primitives.push(GraphicPrimitive::Arc {
            arc: *arc,
            style: style.clone(),
        });
    }

    pub fn add_styled_points(&mut self, points: &[DVec3], size: f32, style: &GraphicStyle) {
        if points.is_empty() {
            return;
        }
        self.list.primitives.push(GraphicPrimitive::Points {
            points: points.to_vec(),
            size,
            style: style.clone(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn finish(self) -> GraphicList {
        self.list
    }
}

/// Text placed in view space for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub lines: Vec<String>,
    pub world_anchor: DVec3,
    /// Center of the label in view pixels
    pub view_anchor: Point,
    pub font_size: f32,
    pub pick_id: Option<PickId>,
    pub style: GraphicStyle,
}

const LABEL_PADDING: f64 = 3.0;
const GLYPH_WIDTH: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.25;

impl TextLabel {
    /// Approximate text extent without a font backend
    pub fn extent(&self) -> Size {
        let font = self.font_size as f64;
        let widest = self
            .lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f64;
        Size::new(
            widest * font * GLYPH_WIDTH + 2.0 * LABEL_PADDING,
            self.lines.len() as f64 * font * LINE_HEIGHT + 2.0 * LABEL_PADDING,
        )
    }

    /// Canvas region that picks the label's owner
    pub fn pick_rect(&self) -> Rect {
        Rect::from_center_size(self.view_anchor, self.extent())
    }
}

/// A retained graphic owned by a measurement; dropping it disposes it
pub trait RenderGraphic: std::fmt::Debug {
    fn list(&self) -> &GraphicList;
}

pub trait RenderTarget {
    /// Retain `list` as a reusable graphic
    fn create_graphic(&mut self, list: GraphicList) -> Box<dyn RenderGraphic>;
    /// Draw a retained graphic this frame
    fn add_graphic(&mut self, graphic: &dyn RenderGraphic);
    /// Draw a one-frame list
    fn add_dynamic(&mut self, list: GraphicList);
    fn add_label(&mut self, label: TextLabel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_skips_degenerate_primitives() {
        let style = StyleTheme::default().resolve(well_known::DEFAULT).clone();
        let mut b = GraphicBuilder::new(Some(3));
        b.add_styled_line_string(&[DVec3::ZERO], &style);
        b.add_styled_shape(&[DVec3::ZERO, DVec3::X], &style);
        b.add_styled_points(&[], 4.0, &style);
        assert!(b.is_empty());

        b.add_styled_line_string(&[DVec3::ZERO, DVec3::X], &style);
        let list = b.finish();
        assert_eq!(list.len(), 1);
        assert_eq!(list.pick_id, Some(3));
    }

    #[test]
    fn test_label_pick_rect_grows_with_text() {
        let style = StyleTheme::default().resolve(well_known::DEFAULT).clone();
        let mut label = TextLabel {
            lines: vec!["5.00 m".to_string()],
            world_anchor: DVec3::ZERO,
            view_anchor: Point::new(100.0, 100.0),
            font_size: 10.0,
            pick_id: None,
            style,
        };
        let small = label.pick_rect();
        assert!(small.contains(Point::new(100.0, 100.0)));
        assert!((small.width() - (6.0 * 6.0 + 6.0)).abs() < 1e-9);

        label.lines.push("slope 12.00%".to_string());
        let big = label.pick_rect();
        assert!(big.width() > small.width());
        assert!(big.height() > small.height());
    }
}
