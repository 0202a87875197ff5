//! Transient pick handles and the short-lived pick context built from a hit.

use glam::DVec3;
use kurbo::Point;

use crate::events::{ButtonEvent, MouseButton};
use crate::viewport::ViewportId;

/// Identifier correlating rendered pickable graphics with their owner
pub type PickId = u64;

/// Hands out transient pick ids. Ids are never reused within a process.
#[derive(Debug)]
pub struct PickIdAllocator {
    next: PickId,
}

impl Default for PickIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl PickIdAllocator {
    pub fn allocate(&mut self) -> PickId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// What the host's picking reported under the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct HitDetail {
    pub source_id: PickId,
    pub hit_point: DVec3,
    pub view_point: Option<Point>,
    pub viewport_id: ViewportId,
}

/// Query handed to each measurement during hit testing and button dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickContext {
    pub geom_id: Option<PickId>,
    pub world_point: Option<DVec3>,
    pub view_point: Option<Point>,
    pub viewport_id: Option<ViewportId>,
    pub button: Option<MouseButton>,
    /// Dynamic (under construction) measurements only answer when set
    pub allow_dynamic: bool,
}

impl PickContext {
    pub fn from_pick_id(id: PickId) -> Self {
        Self {
            geom_id: Some(id),
            ..Default::default()
        }
    }

    pub fn from_hit(hit: &HitDetail) -> Self {
        Self {
            geom_id: Some(hit.source_id),
            world_point: Some(hit.hit_point),
            view_point: hit.view_point,
            viewport_id: Some(hit.viewport_id),
            ..Default::default()
        }
    }

    /// Cursor position only, for label picking
    pub fn at_view_point(viewport_id: ViewportId, view_point: Point) -> Self {
        Self {
            view_point: Some(view_point),
            viewport_id: Some(viewport_id),
            ..Default::default()
        }
    }

    pub fn from_button_event(hit: Option<&HitDetail>, event: &ButtonEvent) -> Self {
        let mut ctx = hit.map(Self::from_hit).unwrap_or_default();
        ctx.world_point = ctx.world_point.or(Some(event.world_point));
        ctx.view_point = Some(event.view_point);
        ctx.viewport_id = Some(event.viewport_id);
        ctx.button = Some(event.button);
        ctx
    }

    pub fn with_allow_dynamic(mut self, allow: bool) -> Self {
        self.allow_dynamic = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = PickIdAllocator::default();
        let a = ids.allocate();
        let b = ids.allocate();
        assert!(b > a);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_button_context_keeps_hit_geometry() {
        let hit = HitDetail {
            source_id: 9,
            hit_point: DVec3::X,
            view_point: None,
            viewport_id: 2,
        };
        let ev = ButtonEvent::data(DVec3::Y, Point::new(4.0, 5.0), 2);
        let ctx = PickContext::from_button_event(Some(&hit), &ev);
        assert_eq!(ctx.geom_id, Some(9));
        assert_eq!(ctx.world_point, Some(DVec3::X));
        assert_eq!(ctx.view_point, Some(Point::new(4.0, 5.0)));
        assert_eq!(ctx.button, Some(MouseButton::Data));

        let bare = PickContext::from_button_event(None, &ev);
        assert_eq!(bare.geom_id, None);
        assert_eq!(bare.world_point, Some(DVec3::Y));
    }
}
