//! Owner of every committed (and in-progress) measurement.
//!
//! The manager keeps an insertion-ordered collection and arbitrates drawing,
//! picking and button dispatch across all registered viewports. Picking is
//! first-match-wins in insertion order. Removals always run the cleanup hook
//! and are announced with their origin so tool sessions can ignore their own.

use std::collections::BTreeSet;

use kurbo::Point;

use crate::events::{
    ButtonEventResult, EventChannel, MeasurementEvent, MouseButton, RemovalOrigin, Subscription,
};
use crate::format::QuantityFormatter;
use crate::measurement::{DecorateContext, DecorationGeometry, Measurement, MeasurementId};
use crate::pick::PickContext;
use crate::state::selection::SelectionState;
use crate::viewport::{Viewport, ViewportId};

pub type TooltipOverride = Box<dyn Fn(&Measurement, &PickContext) -> Vec<String>>;
pub type GeometryOverride = Box<dyn Fn(&Measurement, &PickContext) -> Option<DecorationGeometry>>;
pub type HitOverride = Box<dyn Fn(&Measurement, &PickContext) -> bool>;

/// Process-wide replacements for the per-measurement pick behavior
#[derive(Default)]
pub struct PickOverrides {
    pub tooltip: Option<TooltipOverride>,
    pub geometry: Option<GeometryOverride>,
    pub hit: Option<HitOverride>,
}

impl std::fmt::Debug for PickOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickOverrides")
            .field("tooltip", &self.tooltip.is_some())
            .field("geometry", &self.geometry.is_some())
            .field("hit", &self.hit.is_some())
            .finish()
    }
}

/// Host-side UI requests raised while dispatching buttons
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementAction {
    OpenActionToolbar {
        id: MeasurementId,
        view_point: Option<Point>,
    },
    OpenContextMenu {
        id: MeasurementId,
        view_point: Option<Point>,
    },
}

#[derive(Debug, Default)]
pub struct MeasurementManager {
    measurements: Vec<Measurement>,
    events: EventChannel<MeasurementEvent>,
    overrides: PickOverrides,
    viewports: Vec<Viewport>,
    /// Viewports whose decorations are stale
    invalidated: BTreeSet<ViewportId>,
    actions: Vec<MeasurementAction>,
    /// Bumped on every collection change
    pub version: u64,
}

impl MeasurementManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Collection ────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter()
    }

    pub fn ids(&self) -> Vec<MeasurementId> {
        self.measurements.iter().map(Measurement::id).collect()
    }

    pub fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: MeasurementId) -> Option<&mut Measurement> {
        self.measurements.iter_mut().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: MeasurementId) -> bool {
        self.get(id).is_some()
    }

    pub fn add(&mut self, measurement: Measurement) {
        self.add_many(vec![measurement]);
    }

    /// Append in order, announce once and invalidate every viewport that
    /// accepts at least one of them.
    pub fn add_many(&mut self, measurements: Vec<Measurement>) {
        if measurements.is_empty() {
            return;
        }
        let ids: Vec<MeasurementId> = measurements.iter().map(Measurement::id).collect();
        for m in &measurements {
            self.invalidate_accepting(m);
        }
        self.measurements.extend(measurements);
        self.version += 1;
        tracing::info!(count = ids.len(), "Added measurements");
        self.events.emit(MeasurementEvent::Added { ids });
    }

    /// Remove every match, run its cleanup hook, deselect it and announce
    /// the removal. The removed values are handed back to the caller.
    pub fn remove_where(
        &mut self,
        mut predicate: impl FnMut(&Measurement) -> bool,
        origin: RemovalOrigin,
        selection: &mut SelectionState,
    ) -> Vec<Measurement> {
        let (mut removed, kept): (Vec<Measurement>, Vec<Measurement>) =
            std::mem::take(&mut self.measurements)
                .into_iter()
                .partition(|m| predicate(m));
        self.measurements = kept;
        if removed.is_empty() {
            return removed;
        }

        for m in &mut removed {
            m.on_cleanup();
        }
        for m in &removed {
            self.invalidate_accepting(m);
        }
        let ids: Vec<MeasurementId> = removed.iter().map(Measurement::id).collect();
        selection.remove(&ids);
        self.version += 1;
        tracing::info!(count = ids.len(), ?origin, "Removed measurements");
        self.events.emit(MeasurementEvent::Removed { ids, origin });
        removed
    }

    /// Remove and discard every match; returns how many were dropped
    pub fn drop_where(
        &mut self,
        predicate: impl FnMut(&Measurement) -> bool,
        origin: RemovalOrigin,
        selection: &mut SelectionState,
    ) -> usize {
        self.remove_where(predicate, origin, selection).len()
    }

    pub fn drop(
        &mut self,
        ids: &[MeasurementId],
        origin: RemovalOrigin,
        selection: &mut SelectionState,
    ) -> usize {
        self.drop_where(|m| ids.contains(&m.id()), origin, selection)
    }

    /// Move one measurement out of the manager (undo uses this)
    pub fn take(
        &mut self,
        id: MeasurementId,
        origin: RemovalOrigin,
        selection: &mut SelectionState,
    ) -> Option<Measurement> {
        self.remove_where(|m| m.id() == id, origin, selection).pop()
    }

    pub fn drop_group(&mut self, group_id: &str, selection: &mut SelectionState) -> usize {
        self.drop_where(
            |m| m.group_id() == Some(group_id),
            RemovalOrigin::User,
            selection,
        )
    }

    /// Drop everything; used on shutdown and by the harness
    pub fn clear(&mut self, origin: RemovalOrigin, selection: &mut SelectionState) -> usize {
        self.drop_where(|_| true, origin, selection)
    }

    /// Lock or unlock; returns how many changed
    pub fn set_locked(&mut self, ids: &[MeasurementId], locked: bool) -> usize {
        let mut changed = Vec::new();
        for m in self.measurements.iter_mut() {
            if ids.contains(&m.id()) && m.is_locked() != locked {
                m.set_locked(locked);
                changed.push(m.id());
            }
        }
        for id in &changed {
            if let Some(m) = self.measurements.iter().find(|m| m.id() == *id) {
                let targets: Vec<ViewportId> = self
                    .viewports
                    .iter()
                    .filter(|vp| m.view_target().accepts(vp))
                    .map(|vp| vp.id)
                    .collect();
                self.invalidated.extend(targets);
            }
        }
        if !changed.is_empty() {
            self.version += 1;
        }
        changed.len()
    }

    // ── Events ────────────────────────────────────────────────

    pub fn subscribe(&mut self) -> Subscription<MeasurementEvent> {
        self.events.subscribe()
    }

    /// Subscription that only ever queues `Removed` events
    pub fn subscribe_removals(&mut self) -> Subscription<MeasurementEvent> {
        self.events
            .subscribe_filtered(|e| matches!(e, MeasurementEvent::Removed { .. }))
    }

    pub fn unsubscribe(&mut self, subscription: Subscription<MeasurementEvent>) {
        self.events.unsubscribe(subscription);
    }

    pub fn overrides_mut(&mut self) -> &mut PickOverrides {
        &mut self.overrides
    }

    /// Drain queued host UI requests
    pub fn take_actions(&mut self) -> Vec<MeasurementAction> {
        std::mem::take(&mut self.actions)
    }

    // ── Viewports ─────────────────────────────────────────────

    pub fn register_viewport(&mut self, viewport: Viewport) {
        let id = viewport.id;
        self.viewports.retain(|vp| vp.id != id);
        self.viewports.push(viewport);
        self.invalidated.insert(id);
    }

    pub fn unregister_viewport(&mut self, id: ViewportId) {
        self.viewports.retain(|vp| vp.id != id);
        self.invalidated.remove(&id);
    }

    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    /// Viewports that need a redraw since the last call
    pub fn take_invalidated(&mut self) -> Vec<ViewportId> {
        std::mem::take(&mut self.invalidated).into_iter().collect()
    }

    pub fn invalidate_all(&mut self) {
        let ids: Vec<ViewportId> = self.viewports.iter().map(|vp| vp.id).collect();
        self.invalidated.extend(ids);
    }

    fn invalidate_accepting(&mut self, m: &Measurement) {
        for vp in &self.viewports {
            if m.view_target().accepts(vp) {
                self.invalidated.insert(vp.id);
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────

    /// Draw every measurement accepted by the viewport, in insertion order
    pub fn decorate(&mut self, dc: &mut DecorateContext<'_>) {
        for m in self.measurements.iter_mut() {
            m.decorate(dc);
        }
        self.invalidated.remove(&dc.viewport.id);
    }

    /// Re-resolve every formatter spec after a units or formats change
    pub fn on_display_units_changed(&mut self, formatter: &dyn QuantityFormatter) -> usize {
        let mut pending = 0;
        for m in self.measurements.iter_mut() {
            pending += m.refresh_formatting(formatter);
            m.invalidate();
        }
        self.invalidate_all();
        if pending > 0 {
            tracing::debug!(pending, "Formatter specs not yet available");
        }
        pending
    }

    // ── Picking ───────────────────────────────────────────────

    fn hits(&self, m: &Measurement, ctx: &PickContext) -> bool {
        if !m.is_visible() {
            return false;
        }
        match &self.overrides.hit {
            Some(hit) => hit(m, ctx),
            None => m.test_hit(ctx),
        }
    }

    /// First visible measurement that claims the context
    pub fn find_hit(&self, ctx: &PickContext) -> Option<&Measurement> {
        self.measurements.iter().find(|m| self.hits(m, ctx))
    }

    pub fn test_hit(&self, ctx: &PickContext) -> bool {
        self.find_hit(ctx).is_some()
    }

    pub fn pick_geometry(&self, ctx: &PickContext) -> Option<DecorationGeometry> {
        let m = self.find_hit(ctx)?;
        match &self.overrides.geometry {
            Some(geometry) => geometry(m, ctx),
            None => m.decoration_geometry(ctx),
        }
    }

    pub fn pick_tooltip(
        &self,
        ctx: &PickContext,
        formatter: &dyn QuantityFormatter,
    ) -> Option<Vec<String>> {
        let m = self.find_hit(ctx)?;
        Some(match &self.overrides.tooltip {
            Some(tooltip) => tooltip(m, ctx),
            None => m.tooltip(formatter),
        })
    }

    /// Offer a button event to every visible measurement the context hits.
    ///
    /// A measurement that handles without consuming lets dispatch continue
    /// (and the host's selection tool still sees the click); one that
    /// consumes stops dispatch.
    pub fn dispatch_button_event(&mut self, ctx: &PickContext) -> ButtonEventResult {
        let mut result = ButtonEventResult::NotHandled;
        let mut actions = Vec::new();
        for m in &self.measurements {
            if !self.hits(m, ctx) {
                continue;
            }
            let outcome = m.on_button_event(ctx);
            if !outcome.is_handled() {
                continue;
            }
            let id = m.id();
            let view_point = ctx.view_point;
            actions.push(match ctx.button {
                Some(MouseButton::Reset) => MeasurementAction::OpenContextMenu { id, view_point },
                _ => MeasurementAction::OpenActionToolbar { id, view_point },
            });
            result = outcome;
            if outcome.is_consumed() {
                break;
            }
        }
        self.actions.extend(actions);
        result
    }
}
