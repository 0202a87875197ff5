//! Render target that projects primitives into `egui::Shape`s for hosts
//! painting their viewport with egui.

use egui::{pos2, Color32, Pos2, Shape, Stroke};
use glam::DVec3;

use super::{GraphicList, GraphicPrimitive, GraphicStyle, RenderGraphic, RenderTarget, TextLabel};
use crate::viewport::Viewport;

#[derive(Debug)]
struct RetainedGraphic {
    list: GraphicList,
}

impl RenderGraphic for RetainedGraphic {
    fn list(&self) -> &GraphicList {
        &self.list
    }
}

/// Label the host paints with `Painter::text`
#[derive(Debug, Clone, PartialEq)]
pub struct LabelAnchor {
    pub pos: Pos2,
    pub text: String,
    pub font_size: f32,
    pub color: Color32,
    pub background: Color32,
}

/// Collects one frame of shapes for one viewport
#[derive(Debug)]
pub struct EguiShapeTarget {
    viewport: Viewport,
    pub shapes: Vec<Shape>,
    pub labels: Vec<LabelAnchor>,
}

impl EguiShapeTarget {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            shapes: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Hand the frame's shapes and labels to the caller and start a new frame
    pub fn finish_frame(&mut self) -> (Vec<Shape>, Vec<LabelAnchor>) {
        (
            std::mem::take(&mut self.shapes),
            std::mem::take(&mut self.labels),
        )
    }

    fn project(&self, p: DVec3) -> Option<Pos2> {
        self.viewport
            .world_to_view(p)
            .map(|v| pos2(v.x as f32, v.y as f32))
    }

    /// Projected polyline; points behind the eye are dropped
    fn project_all(&self, points: &[DVec3]) -> Vec<Pos2> {
        points.iter().filter_map(|p| self.project(*p)).collect()
    }

    fn push_polyline(&mut self, points: Vec<Pos2>, style: &GraphicStyle) {
        if points.len() < 2 {
            return;
        }
        let stroke = Stroke::new(style.line_width, style.line_color);
        match style.dash {
            Some((dash, gap)) => self
                .shapes
                .extend(Shape::dashed_line(&points, stroke, dash, gap)),
            None => self.shapes.push(Shape::line(points, stroke)),
        }
    }

    fn push_list(&mut self, list: &GraphicList) {
        for primitive in &list.primitives {
            match primitive {
                GraphicPrimitive::LineString { points, style } => {
                    let pts = self.project_all(points);
                    self.push_polyline(pts, style);
                }
                GraphicPrimitive::Shape { points, style } => {
                    let pts = self.project_all(points);
                    if pts.len() >= 3 {
                        self.shapes.push(Shape::convex_polygon(
                            pts.clone(),
                            style.fill_color,
                            Stroke::NONE,
                        ));
                        let mut outline = pts;
                        if let Some(first) = outline.first().copied() {
                            outline.push(first);
                        }
                        self.push_polyline(outline, style);
                    }
                }
                GraphicPrimitive::Arc { arc, style } => {
                    let pts = self.project_all(&arc.stroke_adaptive());
                    self.push_polyline(pts, style);
                }
                GraphicPrimitive::Points {
                    points,
                    size,
                    style,
                } => {
                    for p in self.project_all(points) {
                        self.shapes
                            .push(Shape::circle_filled(p, *size * 0.5, style.line_color));
                    }
                }
            }
        }
    }
}

impl RenderTarget for EguiShapeTarget {
    fn create_graphic(&mut self, list: GraphicList) -> Box<dyn RenderGraphic> {
        Box::new(RetainedGraphic { list })
    }

    fn add_graphic(&mut self, graphic: &dyn RenderGraphic) {
        self.push_list(graphic.list());
    }

    fn add_dynamic(&mut self, list: GraphicList) {
        self.push_list(&list);
    }

    fn add_label(&mut self, label: TextLabel) {
        self.labels.push(LabelAnchor {
            pos: pos2(label.view_anchor.x as f32, label.view_anchor.y as f32),
            text: label.lines.join("\n"),
            font_size: label.font_size,
            color: label.style.text_color,
            background: label.style.text_background,
        });
    }
}
