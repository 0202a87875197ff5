use glam::DVec3;
use shared::ViewType;

use super::{ToolSession, ToolState};
use crate::i18n::t;
use crate::measurement::{AddPointResult, Measurement, MeasurementId, MeasurementKind};
use crate::render::RenderTarget;
use crate::state::messages::Severity;
use crate::state::MeasurementContext;
use crate::view_target::ViewTarget;
use crate::viewport::Viewport;

/// Polygon construction: vertices accumulate until a click lands on the
/// first vertex (or the host closes explicitly).
#[derive(Debug)]
pub struct MeasureAreaToolModel {
    session: ToolSession,
    state: ToolState,
    view_type: Option<ViewType>,
}

impl MeasureAreaToolModel {
    pub fn new(ctx: &mut MeasurementContext) -> Self {
        Self {
            session: ToolSession::new(ctx),
            state: ToolState::SetMeasurementViewport,
            view_type: None,
        }
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ToolSession {
        &mut self.session
    }

    pub fn set_measurement_viewport(&mut self, view_type: ViewType) -> bool {
        if self.state != ToolState::SetMeasurementViewport {
            return false;
        }
        self.view_type = Some(view_type);
        self.state = ToolState::AddPoint;
        true
    }

    fn accepts(&self, view_type: ViewType) -> bool {
        self.state == ToolState::AddPoint && self.view_type == Some(view_type)
    }

    pub fn add_point(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        ctx: &mut MeasurementContext,
    ) -> AddPointResult {
        if !self.accepts(view_type) {
            return AddPointResult::Rejected;
        }
        if self.session.dynamic().is_none() {
            let mut m = Measurement::area(vec![point]);
            m.set_view_target(ViewTarget::only(view_type));
            self.session.begin_dynamic(m, ctx);
            return AddPointResult::Added;
        }

        let tol = ctx.preferences.closing_tolerance();
        let result = self
            .session
            .dynamic_mut()
            .and_then(|m| {
                m.modify(|k| match k {
                    MeasurementKind::Area(a) => a.add_point_to_dynamic_polygon(point, tol),
                    _ => AddPointResult::Rejected,
                })
            })
            .unwrap_or(AddPointResult::Rejected);

        match result {
            AddPointResult::Added => self.session.notify_dynamic_changed(),
            AddPointResult::Closed => {
                self.session.notify_dynamic_changed();
                self.finish(ctx);
            }
            AddPointResult::Rejected => {
                let degenerate = self
                    .session
                    .dynamic()
                    .and_then(|m| m.kind().as_area())
                    .is_some_and(|a| {
                        a.points().len() >= 3
                            && a.points()
                                .first()
                                .is_some_and(|f| f.distance(point) <= tol)
                    });
                if degenerate {
                    ctx.messages.post(Severity::Warning, t("msg.polygon_invalid"));
                }
            }
        }
        result
    }

    /// Rubber-band preview of the next vertex
    pub fn set_dynamic_point(&mut self, view_type: ViewType, point: Option<DVec3>) -> bool {
        if !self.accepts(view_type) {
            return false;
        }
        self.session
            .update_dynamic(|m| {
                m.modify(|k| {
                    if let MeasurementKind::Area(a) = k {
                        a.set_dynamic_point(point);
                    }
                })
                .is_some()
            })
            .unwrap_or(false)
    }

    /// Close the polygon from its current vertices and commit it
    pub fn close_polygon(&mut self, ctx: &mut MeasurementContext) -> bool {
        if self.state != ToolState::AddPoint {
            return false;
        }
        let closed = self
            .session
            .dynamic_mut()
            .and_then(|m| {
                m.modify(|k| match k {
                    MeasurementKind::Area(a) => a.close(),
                    _ => false,
                })
            })
            .unwrap_or(false);
        if closed {
            self.session.notify_dynamic_changed();
            self.finish(ctx);
        }
        closed
    }

    fn finish(&mut self, ctx: &mut MeasurementContext) {
        self.session.commit_dynamic(ctx);
        self.state = ToolState::SetMeasurementViewport;
        self.view_type = None;
    }

    pub fn last_committed(&mut self) -> Option<MeasurementId> {
        self.session.committed().last().copied()
    }

    pub fn undo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.session.undo(ctx)
    }

    pub fn redo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.session.redo(ctx)
    }

    pub fn reset(&mut self, clear_measurements: bool, ctx: &mut MeasurementContext) {
        self.session.reset(clear_measurements, ctx);
        self.state = ToolState::SetMeasurementViewport;
        self.view_type = None;
    }

    pub fn decorate(
        &mut self,
        ctx: &mut MeasurementContext,
        viewport: &Viewport,
        target: &mut dyn RenderTarget,
    ) {
        self.session.decorate(ctx, viewport, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(ctx: &mut MeasurementContext) -> MeasureAreaToolModel {
        let mut tool = MeasureAreaToolModel::new(ctx);
        assert!(tool.set_measurement_viewport(ViewType::Spatial));
        tool
    }

    #[test]
    fn test_closing_click_commits() {
        let mut ctx = MeasurementContext::default();
        let mut tool = start(&mut ctx);
        for p in [DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y] {
            assert_eq!(tool.add_point(ViewType::Spatial, p, &mut ctx), AddPointResult::Added);
        }
        assert!(ctx.manager.is_empty());
        assert_eq!(
            tool.add_point(ViewType::Spatial, DVec3::ZERO, &mut ctx),
            AddPointResult::Closed
        );
        assert_eq!(tool.state(), ToolState::SetMeasurementViewport);

        let id = tool.last_committed().unwrap();
        let area = ctx.manager.get(id).unwrap().kind().as_area().unwrap().area().unwrap();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_early_close_and_duplicates_rejected() {
        let mut ctx = MeasurementContext::default();
        let mut tool = start(&mut ctx);
        tool.add_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
        assert_eq!(
            tool.add_point(ViewType::Spatial, DVec3::ZERO, &mut ctx),
            AddPointResult::Rejected
        );
        tool.add_point(ViewType::Spatial, DVec3::X, &mut ctx);
        assert_eq!(
            tool.add_point(ViewType::Spatial, DVec3::ZERO, &mut ctx),
            AddPointResult::Rejected
        );
        assert_eq!(tool.add_point(ViewType::Sheet, DVec3::Y, &mut ctx), AddPointResult::Rejected);
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_degenerate_closure_warns() {
        let mut ctx = MeasurementContext::default();
        let mut tool = start(&mut ctx);
        for p in [DVec3::ZERO, DVec3::X, DVec3::X * 2.0] {
            tool.add_point(ViewType::Spatial, p, &mut ctx);
        }
        assert_eq!(
            tool.add_point(ViewType::Spatial, DVec3::ZERO, &mut ctx),
            AddPointResult::Rejected
        );
        assert_eq!(ctx.messages.last().unwrap().severity, Severity::Warning);
        assert_eq!(tool.state(), ToolState::AddPoint);
    }

    #[test]
    fn test_explicit_close_and_preview() {
        let mut ctx = MeasurementContext::default();
        let mut tool = start(&mut ctx);
        assert!(!tool.set_dynamic_point(ViewType::Spatial, Some(DVec3::ONE)));
        for p in [DVec3::ZERO, DVec3::X, DVec3::Y] {
            tool.add_point(ViewType::Spatial, p, &mut ctx);
        }
        assert!(tool.set_dynamic_point(ViewType::Spatial, Some(DVec3::ONE)));
        assert!(tool.close_polygon(&mut ctx));
        assert_eq!(ctx.manager.len(), 1);
        assert!(!tool.close_polygon(&mut ctx));
    }
}
