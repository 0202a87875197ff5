//! Viewport description the core needs: its kind, its screen rectangle and
//! the world-to-clip transform used to place labels and trimmed arcs.

use glam::{DMat4, DVec3, DVec4};
use kurbo::{Point, Rect};
use shared::ViewType;

/// Host-assigned viewport identifier
pub type ViewportId = u32;

#[derive(Debug, Clone)]
pub struct Viewport {
    pub id: ViewportId,
    /// Identifier of the displayed view (model view, drawing, sheet...)
    pub view_id: String,
    pub view_type: ViewType,
    /// Screen rectangle in pixels, y pointing down
    pub view_rect: Rect,
    /// World -> clip space
    pub view_projection: DMat4,
}

impl Viewport {
    pub fn new(
        id: ViewportId,
        view_id: impl Into<String>,
        view_type: ViewType,
        view_rect: Rect,
        view_projection: DMat4,
    ) -> Self {
        Self {
            id,
            view_id: view_id.into(),
            view_type,
            view_rect,
            view_projection,
        }
    }

    /// Top-down orthographic view centred on `center`, `pixels_per_unit`
    /// screen pixels per world unit.
    pub fn orthographic_top(
        id: ViewportId,
        view_type: ViewType,
        view_rect: Rect,
        center: DVec3,
        pixels_per_unit: f64,
    ) -> Self {
        let sx = 2.0 * pixels_per_unit / view_rect.width();
        let sy = 2.0 * pixels_per_unit / view_rect.height();
        let view_projection =
            DMat4::from_scale(DVec3::new(sx, sy, 1e-3)) * DMat4::from_translation(-center);
        Self::new(id, format!("view-{id}"), view_type, view_rect, view_projection)
    }

    /// Perspective camera looking from `eye` at `target` (Z up)
    pub fn perspective(
        id: ViewportId,
        view_type: ViewType,
        view_rect: Rect,
        eye: DVec3,
        target: DVec3,
        fov_y: f64,
    ) -> Self {
        let aspect = view_rect.width() / view_rect.height();
        let view = DMat4::look_at_rh(eye, target, DVec3::Z);
        let projection = DMat4::perspective_rh_gl(fov_y, aspect, 0.1, 10_000.0);
        Self::new(id, format!("view-{id}"), view_type, view_rect, projection * view)
    }

    /// Project a world point to screen pixels. `None` behind the eye.
    pub fn world_to_view(&self, point: DVec3) -> Option<Point> {
        let p = self.view_projection * DVec4::new(point.x, point.y, point.z, 1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let rect = self.view_rect;
        let center = rect.center();
        Some(Point::new(
            center.x + ndc.x * rect.width() * 0.5,
            center.y - ndc.y * rect.height() * 0.5,
        ))
    }

    /// Point projects inside the screen rectangle
    pub fn is_point_visible(&self, point: DVec3) -> bool {
        self.world_to_view(point)
            .is_some_and(|p| self.view_rect.contains(p))
    }
}
