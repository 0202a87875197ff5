//! Process-wide measurement context.
//!
//! Owns the manager together with everything the tools and the manager
//! share: selection, preferences, style theme, user messages, the quantity
//! formatter and the transient pick-id allocator. Tool models borrow it
//! mutably for the duration of one call.

pub mod messages;
pub mod selection;
pub mod settings;

use crate::events::{RemovalOrigin, SessionId};
use crate::format::{QuantityFormatter, UnitsFormatter};
use crate::manager::MeasurementManager;
use crate::measurement::{DecorateContext, Measurement};
use crate::pick::PickIdAllocator;
use crate::render::{RenderTarget, StyleTheme};
use crate::viewport::Viewport;

use messages::MessageCenter;
use selection::SelectionState;
use settings::{MeasurementPreferences, Units};

pub struct MeasurementContext {
    pub manager: MeasurementManager,
    pub selection: SelectionState,
    pub preferences: MeasurementPreferences,
    pub theme: StyleTheme,
    pub messages: MessageCenter,
    formatter: Box<dyn QuantityFormatter>,
    pick_ids: PickIdAllocator,
    next_session: SessionId,
}

impl Default for MeasurementContext {
    fn default() -> Self {
        let preferences = MeasurementPreferences::default();
        let formatter = Box::new(UnitsFormatter::from_preferences(&preferences));
        Self::init(preferences, formatter)
    }
}

impl std::fmt::Debug for MeasurementContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasurementContext")
            .field("measurements", &self.manager.len())
            .field("selected", &self.selection.count())
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

impl MeasurementContext {
    pub fn init(
        preferences: MeasurementPreferences,
        formatter: Box<dyn QuantityFormatter>,
    ) -> Self {
        tracing::debug!(units = ?preferences.units, "Measurement context initialized");
        Self {
            manager: MeasurementManager::new(),
            selection: SelectionState::default(),
            preferences,
            theme: StyleTheme::default(),
            messages: MessageCenter::default(),
            formatter,
            pick_ids: PickIdAllocator::default(),
            next_session: 1,
        }
    }

    pub fn formatter(&self) -> &dyn QuantityFormatter {
        self.formatter.as_ref()
    }

    /// Swap the formatter (e.g. when a formats provider becomes ready) and
    /// refresh every measurement against it.
    pub fn set_formatter(&mut self, formatter: Box<dyn QuantityFormatter>) {
        self.formatter = formatter;
        self.refresh_formatting();
    }

    pub fn set_units(&mut self, units: Units) {
        self.preferences.units = units;
        self.formatter.apply_preferences(&self.preferences);
        self.refresh_formatting();
    }

    pub fn refresh_formatting(&mut self) -> usize {
        let pending = self.manager.on_display_units_changed(self.formatter.as_ref());
        if pending > 0 {
            self.messages.post(
                messages::Severity::Info,
                crate::i18n::t("msg.formatter_pending"),
            );
        }
        pending
    }

    /// Measurement pre-configured with the process preferences
    pub fn configure_new(&self, measurement: &mut Measurement) {
        measurement.set_display_labels(self.preferences.display_labels);
        measurement.refresh_formatting(self.formatter.as_ref());
    }

    pub fn next_session_id(&mut self) -> SessionId {
        let id = self.next_session;
        self.next_session += 1;
        id
    }

    /// Draw every managed measurement into one viewport
    pub fn decorate(&mut self, viewport: &Viewport, target: &mut dyn RenderTarget) {
        let mut dc = DecorateContext {
            viewport,
            target,
            theme: &self.theme,
            formatter: self.formatter.as_ref(),
            pick_ids: &mut self.pick_ids,
            label_font_size: self.preferences.label_font_size,
        };
        self.manager.decorate(&mut dc);
    }

    /// Draw a measurement the manager does not own (a tool's dynamic one)
    pub fn decorate_measurement(
        &mut self,
        measurement: &mut Measurement,
        viewport: &Viewport,
        target: &mut dyn RenderTarget,
    ) {
        let mut dc = DecorateContext {
            viewport,
            target,
            theme: &self.theme,
            formatter: self.formatter.as_ref(),
            pick_ids: &mut self.pick_ids,
            label_font_size: self.preferences.label_font_size,
        };
        measurement.decorate(&mut dc);
    }

    /// Drop every measurement, announcing the removal as a shutdown
    pub fn shutdown(&mut self) {
        let dropped = self
            .manager
            .clear(RemovalOrigin::Shutdown, &mut self.selection);
        tracing::info!(dropped, "Measurement context shut down");
    }
}
