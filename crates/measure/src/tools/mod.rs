//! Interactive construction of measurements.
//!
//! Every tool model owns a [`ToolSession`]: the dynamic measurement under
//! construction, the ids it committed and the undone measurements waiting on
//! the redo stack. Undo moves a measurement out of the manager with a
//! [`RemovalOrigin::Tool`] origin, so the session's own removal listener can
//! tell it apart from a removal the user made elsewhere.

pub mod area;
pub mod location;
pub mod stepwise;

pub use area::MeasureAreaToolModel;
pub use location::{GeoLocationService, MeasureLocationToolModel, ServiceError};
pub use stepwise::{
    MeasureAngleToolModel, MeasureDistanceToolModel, MeasureRadiusToolModel, StepwiseKind,
    StepwiseToolModel, ToolState,
};

use crate::events::{EventChannel, MeasurementEvent, RemovalOrigin, SessionId, Subscription};
use crate::measurement::{Measurement, MeasurementId};
use crate::render::RenderTarget;
use crate::state::MeasurementContext;
use crate::viewport::Viewport;

/// Notifications a tool session publishes to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEvent {
    NewMeasurement(MeasurementId),
    DynamicChanged(MeasurementId),
    Committed(MeasurementId),
    Undone(MeasurementId),
    Redone(MeasurementId),
}

#[derive(Debug)]
pub struct ToolSession {
    id: SessionId,
    /// Committed by this session and still owned by the manager, oldest first
    committed: Vec<MeasurementId>,
    redo: Vec<Measurement>,
    dynamic: Option<Measurement>,
    /// Add committed measurements to the selection set
    pub sync_selection: bool,
    removals: Subscription<MeasurementEvent>,
    events: EventChannel<ToolEvent>,
}

impl ToolSession {
    pub fn new(ctx: &mut MeasurementContext) -> Self {
        Self {
            id: ctx.next_session_id(),
            committed: Vec::new(),
            redo: Vec::new(),
            dynamic: None,
            sync_selection: ctx.preferences.sync_selection,
            removals: ctx.manager.subscribe_removals(),
            events: EventChannel::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Committed ids still owned by the manager, oldest first
    pub fn committed(&mut self) -> &[MeasurementId] {
        self.sync_external_removals();
        &self.committed
    }

    pub fn can_undo(&mut self) -> bool {
        self.sync_external_removals();
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn dynamic(&self) -> Option<&Measurement> {
        self.dynamic.as_ref()
    }

    pub(crate) fn dynamic_mut(&mut self) -> Option<&mut Measurement> {
        self.dynamic.as_mut()
    }

    pub fn subscribe(&mut self) -> Subscription<ToolEvent> {
        self.events.subscribe()
    }

    /// Start construction. Replaces any previous dynamic measurement.
    pub fn begin_dynamic(
        &mut self,
        mut measurement: Measurement,
        ctx: &MeasurementContext,
    ) -> MeasurementId {
        ctx.configure_new(&mut measurement);
        measurement.set_dynamic(true);
        let id = measurement.id();
        self.dynamic = Some(measurement);
        self.events.emit(ToolEvent::NewMeasurement(id));
        id
    }

    /// Mutate the dynamic measurement in place
    pub fn update_dynamic<R>(&mut self, f: impl FnOnce(&mut Measurement) -> R) -> Option<R> {
        let m = self.dynamic.as_mut()?;
        let out = f(m);
        let id = m.id();
        self.events.emit(ToolEvent::DynamicChanged(id));
        Some(out)
    }

    pub(crate) fn notify_dynamic_changed(&mut self) {
        if let Some(id) = self.dynamic.as_ref().map(Measurement::id) {
            self.events.emit(ToolEvent::DynamicChanged(id));
        }
    }

    /// Finish construction and hand the measurement to the manager
    pub fn commit_dynamic(&mut self, ctx: &mut MeasurementContext) -> Option<MeasurementId> {
        let mut m = self.dynamic.take()?;
        m.set_dynamic(false);
        Some(self.commit(m, ctx))
    }

    pub fn commit(
        &mut self,
        measurement: Measurement,
        ctx: &mut MeasurementContext,
    ) -> MeasurementId {
        self.sync_external_removals();
        let id = measurement.id();
        tracing::info!(
            session = self.id,
            kind = measurement.kind_name(),
            %id,
            "Committed measurement"
        );
        self.committed.push(id);
        self.redo.clear();
        ctx.manager.add(measurement);
        if self.sync_selection {
            ctx.selection.add(&[id]);
        }
        self.events.emit(ToolEvent::Committed(id));
        id
    }

    /// Take the most recent committed measurement back out of the manager
    pub fn undo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.sync_external_removals();
        let Some(id) = self.committed.pop() else {
            return false;
        };
        let Some(m) = ctx
            .manager
            .take(id, RemovalOrigin::Tool(self.id), &mut ctx.selection)
        else {
            return false;
        };
        tracing::info!(session = self.id, %id, "Undo");
        self.redo.push(m);
        self.events.emit(ToolEvent::Undone(id));
        true
    }

    pub fn redo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.sync_external_removals();
        let Some(m) = self.redo.pop() else {
            return false;
        };
        let id = m.id();
        tracing::info!(session = self.id, %id, "Redo");
        self.committed.push(id);
        ctx.manager.add(m);
        if self.sync_selection {
            ctx.selection.add(&[id]);
        }
        self.events.emit(ToolEvent::Redone(id));
        true
    }

    /// Forget committed ids that something other than this session removed
    pub fn sync_external_removals(&mut self) {
        for event in self.removals.drain() {
            if let MeasurementEvent::Removed { ids, origin } = event {
                if origin == RemovalOrigin::Tool(self.id) {
                    continue;
                }
                self.committed.retain(|id| !ids.contains(id));
            }
        }
    }

    /// Abandon the dynamic measurement. With `clear_measurements` also drop
    /// everything this session committed and empty both stacks.
    pub fn reset(&mut self, clear_measurements: bool, ctx: &mut MeasurementContext) {
        self.dynamic = None;
        if clear_measurements {
            self.sync_external_removals();
            let ids = std::mem::take(&mut self.committed);
            ctx.manager
                .drop(&ids, RemovalOrigin::Tool(self.id), &mut ctx.selection);
            self.redo.clear();
        }
    }

    /// Draw the dynamic measurement, if any
    pub fn decorate(
        &mut self,
        ctx: &mut MeasurementContext,
        viewport: &Viewport,
        target: &mut dyn RenderTarget,
    ) {
        if let Some(m) = self.dynamic.as_mut() {
            ctx.decorate_measurement(m, viewport, target);
        }
    }
}
