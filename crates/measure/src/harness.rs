//! Headless harness that drives the tool models the way a host viewer would.
//!
//! Used by the command protocol and the integration tests. Every measure
//! call walks a tool through its whole state machine in the spatial fixture
//! viewport.

use glam::DVec3;
use kurbo::Point;
use shared::ViewType;

use crate::events::RemovalOrigin;
use crate::fixtures;
use crate::i18n::t;
use crate::measurement::{
    measurements_from_json, measurements_to_json, AddPointResult, Measurement, MeasurementId,
};
use crate::pick::PickContext;
use crate::render::recording::RecordingTarget;
use crate::state::messages::Severity;
use crate::state::MeasurementContext;
use crate::tools::{
    MeasureAngleToolModel, MeasureAreaToolModel, MeasureDistanceToolModel,
    MeasureLocationToolModel, MeasureRadiusToolModel,
};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolKind {
    Distance,
    Area,
    Location,
    Radius,
    Angle,
}

#[derive(Debug)]
pub struct MeasureHarness {
    pub ctx: MeasurementContext,
    pub viewport: Viewport,
    pub target: RecordingTarget,
    distance: MeasureDistanceToolModel,
    area: MeasureAreaToolModel,
    location: MeasureLocationToolModel,
    radius: MeasureRadiusToolModel,
    angle: MeasureAngleToolModel,
    /// Commits of every tool, oldest first
    history: Vec<(ToolKind, MeasurementId)>,
    undone: Vec<(ToolKind, MeasurementId)>,
}

impl Default for MeasureHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureHarness {
    pub fn new() -> Self {
        let mut ctx = fixtures::test_context();
        let distance = MeasureDistanceToolModel::new(&mut ctx);
        let area = MeasureAreaToolModel::new(&mut ctx);
        let location = MeasureLocationToolModel::new(&mut ctx);
        let radius = MeasureRadiusToolModel::new(&mut ctx);
        let angle = MeasureAngleToolModel::new(&mut ctx);
        Self {
            ctx,
            viewport: fixtures::spatial_viewport(),
            target: RecordingTarget::new(),
            distance,
            area,
            location,
            radius,
            angle,
            history: Vec::new(),
            undone: Vec::new(),
        }
    }

    fn committed(&mut self, kind: ToolKind, id: Option<MeasurementId>) -> Option<MeasurementId> {
        if let Some(id) = id {
            self.history.push((kind, id));
            self.undone.clear();
        }
        id
    }

    // ── Measuring ───────────────────────────────────────────

    pub fn measure_distance(&mut self, start: DVec3, end: DVec3) -> Option<MeasurementId> {
        let vt = ViewType::Spatial;
        let tool = &mut self.distance;
        let done = tool.set_measurement_viewport(vt)
            && tool.set_start_point(vt, start, &mut self.ctx)
            && tool.set_end_point(vt, end, false, &mut self.ctx);
        if !done {
            tool.reset(false, &mut self.ctx);
            return None;
        }
        let id = tool.last_committed();
        self.committed(ToolKind::Distance, id)
    }

    /// Add every vertex, then close explicitly if the last click did not
    pub fn measure_area(&mut self, points: &[DVec3]) -> Option<MeasurementId> {
        let vt = ViewType::Spatial;
        let tool = &mut self.area;
        if !tool.set_measurement_viewport(vt) {
            return None;
        }
        let mut result = AddPointResult::Rejected;
        for &p in points {
            result = tool.add_point(vt, p, &mut self.ctx);
            if result == AddPointResult::Closed {
                break;
            }
        }
        if result != AddPointResult::Closed && !tool.close_polygon(&mut self.ctx) {
            tool.reset(false, &mut self.ctx);
            return None;
        }
        let id = tool.last_committed();
        self.committed(ToolKind::Area, id)
    }

    pub fn measure_location(&mut self, point: DVec3) -> Option<MeasurementId> {
        let vt = ViewType::Spatial;
        let tool = &mut self.location;
        let done = tool.set_measurement_viewport(vt) && tool.add_location(vt, point, &mut self.ctx);
        if !done {
            tool.reset(false, &mut self.ctx);
            return None;
        }
        let id = tool.last_committed();
        self.committed(ToolKind::Location, id)
    }

    pub fn measure_radius(
        &mut self,
        start: DVec3,
        mid: DVec3,
        end: DVec3,
    ) -> Option<MeasurementId> {
        let vt = ViewType::Spatial;
        let tool = &mut self.radius;
        let done = tool.set_measurement_viewport(vt)
            && tool.set_start_point(vt, start, &mut self.ctx)
            && tool.set_mid_point(vt, mid, false, &mut self.ctx)
            && tool.set_end_point(vt, end, false, &mut self.ctx);
        if !done {
            tool.reset(false, &mut self.ctx);
            return None;
        }
        let id = tool.last_committed();
        self.committed(ToolKind::Radius, id)
    }

    pub fn measure_angle(
        &mut self,
        start: DVec3,
        center: DVec3,
        end: DVec3,
    ) -> Option<MeasurementId> {
        let vt = ViewType::Spatial;
        let tool = &mut self.angle;
        let done = tool.set_measurement_viewport(vt)
            && tool.set_start_point(vt, start, &mut self.ctx)
            && tool.set_center_point(vt, center, false, &mut self.ctx)
            && tool.set_end_point(vt, end, false, &mut self.ctx);
        if !done {
            tool.reset(false, &mut self.ctx);
            return None;
        }
        let id = tool.last_committed();
        self.committed(ToolKind::Angle, id)
    }

    // ── Undo / redo ─────────────────────────────────────────

    fn undo_with(&mut self, kind: ToolKind) -> bool {
        let ctx = &mut self.ctx;
        match kind {
            ToolKind::Distance => self.distance.undo(ctx),
            ToolKind::Area => self.area.undo(ctx),
            ToolKind::Location => self.location.undo(ctx),
            ToolKind::Radius => self.radius.undo(ctx),
            ToolKind::Angle => self.angle.undo(ctx),
        }
    }

    fn redo_with(&mut self, kind: ToolKind) -> bool {
        let ctx = &mut self.ctx;
        match kind {
            ToolKind::Distance => self.distance.redo(ctx),
            ToolKind::Area => self.area.redo(ctx),
            ToolKind::Location => self.location.redo(ctx),
            ToolKind::Radius => self.radius.redo(ctx),
            ToolKind::Angle => self.angle.redo(ctx),
        }
    }

    /// Undo the most recent commit of any tool. Commits removed from the
    /// manager by other means are skipped.
    pub fn undo(&mut self) -> bool {
        while let Some((kind, id)) = self.history.pop() {
            if !self.ctx.manager.contains(id) {
                tracing::debug!(%id, "Skipping externally removed commit");
                continue;
            }
            if self.undo_with(kind) {
                self.undone.push((kind, id));
                return true;
            }
        }
        false
    }

    pub fn redo(&mut self) -> bool {
        let Some((kind, id)) = self.undone.pop() else {
            return false;
        };
        if self.redo_with(kind) {
            self.history.push((kind, id));
            true
        } else {
            false
        }
    }

    // ── Scene manipulation ──────────────────────────────────

    /// Drop every measurement. Tool stacks forget their commits on the next
    /// sync.
    pub fn clear(&mut self) -> usize {
        self.history.clear();
        self.undone.clear();
        self.ctx
            .manager
            .clear(RemovalOrigin::User, &mut self.ctx.selection)
    }

    pub fn lock(&mut self, ids: &[MeasurementId], locked: bool) -> usize {
        self.ctx.manager.set_locked(ids, locked)
    }

    pub fn drop_group(&mut self, group_id: &str) -> usize {
        self.ctx.manager.drop_group(group_id, &mut self.ctx.selection)
    }

    pub fn set_group(&mut self, id: MeasurementId, group_id: Option<String>) -> bool {
        match self.ctx.manager.get_mut(id) {
            Some(m) => {
                m.set_group_id(group_id);
                true
            }
            None => false,
        }
    }

    // ── Queries ─────────────────────────────────────────────

    pub fn count(&self) -> usize {
        self.ctx.manager.len()
    }

    pub fn measurement(&self, id: MeasurementId) -> Option<&Measurement> {
        self.ctx.manager.get(id)
    }

    /// Render one frame of the managed measurements plus any dynamic ones
    pub fn decorate(&mut self) {
        self.target.begin_frame();
        let vp = &self.viewport;
        self.ctx.decorate(vp, &mut self.target);
        self.distance.decorate(&mut self.ctx, vp, &mut self.target);
        self.area.decorate(&mut self.ctx, vp, &mut self.target);
        self.location.decorate(&mut self.ctx, vp, &mut self.target);
        self.radius.decorate(&mut self.ctx, vp, &mut self.target);
        self.angle.decorate(&mut self.ctx, vp, &mut self.target);
    }

    /// Label hit at a view position. Only meaningful after [`decorate`].
    ///
    /// [`decorate`]: Self::decorate
    pub fn pick_at(&self, view_point: Point) -> Option<MeasurementId> {
        let ctx = PickContext::at_view_point(self.viewport.id, view_point);
        self.ctx.manager.find_hit(&ctx).map(Measurement::id)
    }

    // ── Persistence ─────────────────────────────────────────

    pub fn export_json(&self) -> Result<String, String> {
        measurements_to_json(self.ctx.manager.iter())
    }

    /// Append the measurements stored in `json`. Returns how many loaded.
    pub fn load_json(&mut self, json: &str) -> Result<usize, String> {
        let (mut loaded, skipped) =
            measurements_from_json(json, self.ctx.preferences.display_labels)?;
        if !skipped.is_empty() {
            for reason in &skipped {
                tracing::warn!(%reason, "Skipped measurement record");
            }
            self.ctx.messages.post(Severity::Warning, t("msg.records_skipped"));
        }
        for m in &mut loaded {
            m.refresh_formatting(self.ctx.formatter());
        }
        let count = loaded.len();
        self.ctx.manager.add_many(loaded);
        tracing::info!(count, skipped = skipped.len(), "Loaded measurements");
        Ok(count)
    }
}
