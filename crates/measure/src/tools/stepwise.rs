//! Strict linear construction for the point-by-point measurements.
//!
//! `SetMeasurementViewport -> SetStartPoint -> [steps...] -> commit`, then
//! back to `SetMeasurementViewport`. A session is pinned to the view kind
//! captured in the first state; points from another kind are rejected.

use std::marker::PhantomData;

use glam::DVec3;
use shared::ViewType;

use super::ToolSession;
use crate::measurement::{Measurement, MeasurementId, MeasurementKind};
use crate::render::RenderTarget;
use crate::state::MeasurementContext;
use crate::view_target::ViewTarget;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    SetMeasurementViewport,
    SetStartPoint,
    SetMidPoint,
    SetCenterPoint,
    SetEndPoint,
    /// Area: accumulate vertices until the polygon closes
    AddPoint,
    /// Location: one point commits
    SetLocation,
}

/// Variant-specific half of a stepwise tool
pub trait StepwiseKind {
    const NAME: &'static str;

    /// States after the start point, in order. The last one commits.
    const STEPS: &'static [ToolState];

    fn create(start: DVec3, ctx: &MeasurementContext) -> Measurement;

    fn apply(kind: &mut MeasurementKind, step: ToolState, point: DVec3);
}

#[derive(Debug)]
pub struct DistanceSteps;

impl StepwiseKind for DistanceSteps {
    const NAME: &'static str = "distance";
    const STEPS: &'static [ToolState] = &[ToolState::SetEndPoint];

    fn create(start: DVec3, ctx: &MeasurementContext) -> Measurement {
        let mut m = Measurement::distance(start, start);
        let show_axes = ctx.preferences.display_axes;
        m.modify(|k| {
            if let MeasurementKind::Distance(d) = k {
                d.set_show_axes(show_axes);
            }
        });
        m
    }

    fn apply(kind: &mut MeasurementKind, step: ToolState, point: DVec3) {
        if let (MeasurementKind::Distance(d), ToolState::SetEndPoint) = (kind, step) {
            d.set_end_point(point);
        }
    }
}

#[derive(Debug)]
pub struct RadiusSteps;

impl StepwiseKind for RadiusSteps {
    const NAME: &'static str = "radius";
    const STEPS: &'static [ToolState] = &[ToolState::SetMidPoint, ToolState::SetEndPoint];

    fn create(start: DVec3, _ctx: &MeasurementContext) -> Measurement {
        Measurement::radius(start)
    }

    fn apply(kind: &mut MeasurementKind, step: ToolState, point: DVec3) {
        if let MeasurementKind::Radius(r) = kind {
            match step {
                ToolState::SetMidPoint => r.set_mid_point(point),
                ToolState::SetEndPoint => r.set_end_point(point),
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
pub struct AngleSteps;

impl StepwiseKind for AngleSteps {
    const NAME: &'static str = "angle";
    const STEPS: &'static [ToolState] = &[ToolState::SetCenterPoint, ToolState::SetEndPoint];

    fn create(start: DVec3, _ctx: &MeasurementContext) -> Measurement {
        Measurement::angle(start)
    }

    fn apply(kind: &mut MeasurementKind, step: ToolState, point: DVec3) {
        if let MeasurementKind::Angle(a) = kind {
            match step {
                ToolState::SetCenterPoint => a.set_center(point),
                ToolState::SetEndPoint => a.set_end_point(point),
                _ => {}
            }
        }
    }
}

pub type MeasureDistanceToolModel = StepwiseToolModel<DistanceSteps>;
pub type MeasureRadiusToolModel = StepwiseToolModel<RadiusSteps>;
pub type MeasureAngleToolModel = StepwiseToolModel<AngleSteps>;

#[derive(Debug)]
pub struct StepwiseToolModel<K: StepwiseKind> {
    session: ToolSession,
    state: ToolState,
    view_type: Option<ViewType>,
    _kind: PhantomData<K>,
}

impl<K: StepwiseKind> StepwiseToolModel<K> {
    pub fn new(ctx: &mut MeasurementContext) -> Self {
        Self {
            session: ToolSession::new(ctx),
            state: ToolState::SetMeasurementViewport,
            view_type: None,
            _kind: PhantomData,
        }
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn view_type(&self) -> Option<ViewType> {
        self.view_type
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
        self.state = ToolState::SetStartPoint;
        true
    }

    fn accepts(&self, state: ToolState, view_type: ViewType) -> bool {
        self.state == state && self.view_type == Some(view_type)
    }

    pub fn set_start_point(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        ctx: &mut MeasurementContext,
    ) -> bool {
        if !self.accepts(ToolState::SetStartPoint, view_type) {
            return false;
        }
        let Some(&next) = K::STEPS.first() else {
            return false;
        };
        let mut m = K::create(point, ctx);
        m.set_view_target(ViewTarget::only(view_type));
        self.session.begin_dynamic(m, ctx);
        self.state = next;
        true
    }

    pub fn set_mid_point(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        is_dynamic: bool,
        ctx: &mut MeasurementContext,
    ) -> bool {
        self.set_step(ToolState::SetMidPoint, view_type, point, is_dynamic, ctx)
    }

    pub fn set_center_point(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        is_dynamic: bool,
        ctx: &mut MeasurementContext,
    ) -> bool {
        self.set_step(ToolState::SetCenterPoint, view_type, point, is_dynamic, ctx)
    }

    pub fn set_end_point(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        is_dynamic: bool,
        ctx: &mut MeasurementContext,
    ) -> bool {
        self.set_step(ToolState::SetEndPoint, view_type, point, is_dynamic, ctx)
    }

    /// Previews (`is_dynamic`) update the measurement without advancing
    fn set_step(
        &mut self,
        step: ToolState,
        view_type: ViewType,
        point: DVec3,
        is_dynamic: bool,
        ctx: &mut MeasurementContext,
    ) -> bool {
        if !self.accepts(step, view_type) {
            return false;
        }
        let applied = self
            .session
            .update_dynamic(|m| m.modify(|k| K::apply(k, step, point)).is_some());
        if applied != Some(true) {
            return false;
        }
        if is_dynamic {
            return true;
        }

        let index = K::STEPS.iter().position(|s| *s == step);
        match index.and_then(|i| K::STEPS.get(i + 1)) {
            Some(&next) => self.state = next,
            None => {
                self.session.commit_dynamic(ctx);
                self.state = ToolState::SetMeasurementViewport;
                self.view_type = None;
                tracing::debug!(tool = K::NAME, "Construction finished");
            }
        }
        true
    }

    /// Id of the most recently committed measurement
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
    use crate::tools::ToolEvent;

    #[test]
    fn test_distance_walks_states_and_commits() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureDistanceToolModel::new(&mut ctx);
        let events = tool.session_mut().subscribe();

        assert!(tool.set_measurement_viewport(ViewType::Spatial));
        assert!(tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
        assert_eq!(tool.state(), ToolState::SetEndPoint);
        assert!(tool.set_end_point(ViewType::Spatial, DVec3::new(1.0, 1.0, 0.0), true, &mut ctx));
        assert_eq!(tool.state(), ToolState::SetEndPoint);
        assert!(ctx.manager.is_empty());

        assert!(tool.set_end_point(ViewType::Spatial, DVec3::new(3.0, 4.0, 0.0), false, &mut ctx));
        assert_eq!(tool.state(), ToolState::SetMeasurementViewport);
        assert_eq!(ctx.manager.len(), 1);
        let m = ctx.manager.iter().next().unwrap();
        assert!(!m.is_dynamic());
        assert!((m.kind().as_distance().unwrap().length() - 5.0).abs() < 1e-12);
        assert_eq!(m.view_target(), &ViewTarget::only(ViewType::Spatial));

        let drained = events.drain();
        assert!(matches!(drained[0], ToolEvent::NewMeasurement(_)));
        assert!(matches!(drained[1], ToolEvent::DynamicChanged(_)));
        assert!(matches!(drained.last(), Some(ToolEvent::Committed(_))));
    }

    #[test]
    fn test_out_of_order_and_wrong_view_kind_rejected() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureRadiusToolModel::new(&mut ctx);
        assert!(!tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
        assert!(tool.set_measurement_viewport(ViewType::Sheet));
        assert!(!tool.set_measurement_viewport(ViewType::Sheet));
        assert!(!tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
        assert!(tool.set_start_point(ViewType::Sheet, DVec3::X, &mut ctx));
        assert!(!tool.set_end_point(ViewType::Sheet, DVec3::Y, false, &mut ctx));
        assert!(!tool.set_center_point(ViewType::Sheet, DVec3::Y, false, &mut ctx));
        assert!(tool.set_mid_point(ViewType::Sheet, DVec3::Y, false, &mut ctx));
        assert!(tool.set_end_point(ViewType::Sheet, -DVec3::X, false, &mut ctx));
        let r = ctx.manager.iter().next().unwrap();
        assert!((r.kind().as_radius().unwrap().radius().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_tool() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureAngleToolModel::new(&mut ctx);
        tool.set_measurement_viewport(ViewType::Spatial);
        tool.set_start_point(ViewType::Spatial, DVec3::X, &mut ctx);
        assert!(tool.set_center_point(ViewType::Spatial, DVec3::ZERO, false, &mut ctx));
        assert!(tool.set_end_point(ViewType::Spatial, DVec3::Y, false, &mut ctx));
        let id = tool.last_committed().unwrap();
        let angle = ctx.manager.get(id).unwrap().kind().as_angle().unwrap().angle().unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_reset_abandons_construction() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureDistanceToolModel::new(&mut ctx);
        tool.set_measurement_viewport(ViewType::Spatial);
        tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
        assert!(tool.session().dynamic().is_some());
        tool.reset(true, &mut ctx);
        assert!(tool.session().dynamic().is_none());
        assert_eq!(tool.state(), ToolState::SetMeasurementViewport);
        assert!(ctx.manager.is_empty());
    }

    #[test]
    fn test_distance_picks_up_axes_preference() {
        let mut ctx = MeasurementContext::default();
        ctx.preferences.display_axes = true;
        let mut tool = MeasureDistanceToolModel::new(&mut ctx);
        tool.set_measurement_viewport(ViewType::Spatial);
        tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
        tool.set_end_point(ViewType::Spatial, DVec3::new(1.0, 0.0, 1.0), false, &mut ctx);
        let m = ctx.manager.iter().next().unwrap();
        assert!(m.kind().as_distance().unwrap().show_axes());
    }
}
