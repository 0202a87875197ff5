use crate::events::{EventChannel, Subscription};
use crate::measurement::MeasurementId;

/// Change notification of the selection set
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Added(Vec<MeasurementId>),
    Removed(Vec<MeasurementId>),
    Cleared,
}

/// Selected measurements (supports multi-select)
#[derive(Debug, Default)]
pub struct SelectionState {
    /// Selected ids (in order of selection)
    selected: Vec<MeasurementId>,
    /// Version counter for selection changes (for cache invalidation)
    pub version: u64,
    events: EventChannel<SelectionEvent>,
}

impl SelectionState {
    /// Primary (first) selected measurement
    pub fn primary(&self) -> Option<&MeasurementId> {
        self.selected.first()
    }

    /// All selected measurements
    pub fn all(&self) -> &[MeasurementId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &MeasurementId) -> bool {
        self.selected.contains(id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn subscribe(&mut self) -> Subscription<SelectionEvent> {
        self.events.subscribe()
    }

    /// Select a single measurement (clears previous selection)
    pub fn select(&mut self, id: MeasurementId) {
        self.replace(&[id]);
    }

    /// Toggle selection (Ctrl+click behavior)
    pub fn toggle(&mut self, id: MeasurementId) {
        if self.is_selected(&id) {
            self.remove(&[id]);
        } else {
            self.add(&[id]);
        }
    }

    /// Add to the selection, skipping ids already selected
    pub fn add(&mut self, ids: &[MeasurementId]) {
        let mut added = Vec::new();
        for id in ids {
            if !self.selected.contains(id) && !added.contains(id) {
                added.push(*id);
            }
        }
        if added.is_empty() {
            return;
        }
        self.selected.extend_from_slice(&added);
        self.version += 1;
        self.events.emit(SelectionEvent::Added(added));
    }

    pub fn remove(&mut self, ids: &[MeasurementId]) {
        let removed: Vec<MeasurementId> = self
            .selected
            .iter()
            .filter(|s| ids.contains(s))
            .copied()
            .collect();
        if removed.is_empty() {
            return;
        }
        self.selected.retain(|s| !ids.contains(s));
        self.version += 1;
        self.events.emit(SelectionEvent::Removed(removed));
    }

    /// Replace the whole selection
    pub fn replace(&mut self, ids: &[MeasurementId]) {
        self.clear();
        self.add(ids);
    }

    /// Clear all selection
    pub fn clear(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.selected.clear();
        self.version += 1;
        self.events.emit(SelectionEvent::Cleared);
    }
}
