//! Which viewport kinds a measurement may be drawn and picked in.

use shared::{ViewTargetRecord, ViewType};

use crate::viewport::Viewport;

/// Include/exclude sets over [`ViewType`] plus an optional list of
/// specific view ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTarget {
    included: Vec<ViewType>,
    excluded: Vec<ViewType>,
    view_ids: Vec<String>,
}

impl Default for ViewTarget {
    fn default() -> Self {
        Self::any()
    }
}

impl ViewTarget {
    /// Accepts every viewport
    pub fn any() -> Self {
        Self {
            included: vec![ViewType::Any],
            excluded: Vec::new(),
            view_ids: Vec::new(),
        }
    }

    /// Accepts only viewports of `kind` (and its family for `Drawing`)
    pub fn only(kind: ViewType) -> Self {
        Self {
            included: vec![kind],
            excluded: Vec::new(),
            view_ids: Vec::new(),
        }
    }

    pub fn included(&self) -> &[ViewType] {
        &self.included
    }

    pub fn excluded(&self) -> &[ViewType] {
        &self.excluded
    }

    pub fn view_ids(&self) -> &[String] {
        &self.view_ids
    }

    /// First included kind, `Any` when nothing is included
    pub fn primary(&self) -> ViewType {
        self.included.first().copied().unwrap_or(ViewType::Any)
    }

    pub fn include(&mut self, kind: ViewType) {
        self.excluded.retain(|k| *k != kind);
        if !self.included.contains(&kind) {
            self.included.push(kind);
        }
    }

    pub fn exclude(&mut self, kind: ViewType) {
        self.included.retain(|k| *k != kind);
        if !self.excluded.contains(&kind) {
            self.excluded.push(kind);
        }
    }

    /// Restrict to a specific view
    pub fn add_view_id(&mut self, view_id: impl Into<String>) {
        let view_id = view_id.into();
        if !self.view_ids.contains(&view_id) {
            self.view_ids.push(view_id);
        }
    }

    /// Remove every rule; the target then matches nothing until something
    /// is included.
    pub fn clear(&mut self) {
        self.included.clear();
        self.excluded.clear();
        self.view_ids.clear();
    }

    /// Kind-only check, ignoring view ids
    pub fn accepts_kind(&self, kind: ViewType) -> bool {
        if self.excluded.contains(&kind) {
            return false;
        }
        self.included.iter().any(|inc| {
            *inc == ViewType::Any
                || *inc == kind
                || (*inc == ViewType::Drawing && kind.is_drawing_family())
        })
    }

    /// Exclusions win, then the specific view ids (when any are set), then
    /// the kind rules.
    pub fn accepts(&self, viewport: &Viewport) -> bool {
        if self.excluded.contains(&viewport.view_type) {
            return false;
        }
        if !self.view_ids.is_empty() && !self.view_ids.contains(&viewport.view_id) {
            return false;
        }
        self.accepts_kind(viewport.view_type)
    }

    pub fn to_record(&self) -> ViewTargetRecord {
        ViewTargetRecord {
            included: self.included.clone(),
            excluded: self.excluded.clone(),
            view_ids: self.view_ids.clone(),
        }
    }

    /// An empty include list in a record means "any"
    pub fn from_record(record: &ViewTargetRecord) -> Self {
        let mut target = Self {
            included: Vec::new(),
            excluded: Vec::new(),
            view_ids: Vec::new(),
        };
        for kind in &record.included {
            target.include(*kind);
        }
        for kind in &record.excluded {
            target.exclude(*kind);
        }
        for id in &record.view_ids {
            target.add_view_id(id.clone());
        }
        if target.included.is_empty() {
            target.included.push(ViewType::Any);
        }
        target
    }
}
