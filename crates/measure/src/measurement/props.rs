use shared::{CommonRecord, DrawingMetadata};
use uuid::Uuid;

use crate::render::well_known;
use crate::view_target::ViewTarget;

/// Stable identity of a measurement
pub type MeasurementId = Uuid;

/// Identity and presentation state shared by every variant
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementProps {
    pub id: MeasurementId,
    pub group_id: Option<String>,
    pub subgroup_id: Option<String>,
    /// Prevents geometry edits and swaps to the locked style
    pub is_locked: bool,
    pub is_visible: bool,
    pub display_labels: bool,
    /// Under interactive construction; never persisted
    pub is_dynamic: bool,
    /// Overrides the `default` style
    pub style: Option<String>,
    /// Overrides the `locked` style
    pub locked_style: Option<String>,
    pub view_target: ViewTarget,
    pub drawing_metadata: Option<DrawingMetadata>,
}

impl Default for MeasurementProps {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: None,
            subgroup_id: None,
            is_locked: false,
            is_visible: true,
            display_labels: true,
            is_dynamic: false,
            style: None,
            locked_style: None,
            view_target: ViewTarget::default(),
            drawing_metadata: None,
        }
    }
}

impl MeasurementProps {
    /// Style name to resolve against the theme
    pub fn active_style_name(&self) -> &str {
        if self.is_dynamic {
            well_known::DYNAMIC
        } else if self.is_locked {
            self.locked_style.as_deref().unwrap_or(well_known::LOCKED)
        } else {
            self.style.as_deref().unwrap_or(well_known::DEFAULT)
        }
    }

    /// Field-wise equality ignoring `is_dynamic`
    pub fn equals(&self, other: &MeasurementProps) -> bool {
        self.id == other.id
            && self.group_id == other.group_id
            && self.subgroup_id == other.subgroup_id
            && self.is_locked == other.is_locked
            && self.display_labels == other.display_labels
            && self.style == other.style
            && self.locked_style == other.locked_style
            && self.view_target == other.view_target
            && self.drawing_metadata == other.drawing_metadata
    }

    pub fn to_record(&self) -> CommonRecord {
        CommonRecord {
            id: Some(self.id.to_string()),
            group_id: self.group_id.clone(),
            subgroup_id: self.subgroup_id.clone(),
            is_locked: self.is_locked,
            display_labels: Some(self.display_labels),
            view_target: self.view_target.to_record(),
            style: self.style.clone(),
            locked_style: self.locked_style.clone(),
            drawing_metadata: self.drawing_metadata.clone(),
        }
    }

    /// Restore from a record. A missing or unparsable id gets a fresh one.
    pub fn from_record(record: &CommonRecord, default_display_labels: bool) -> Self {
        let id = record
            .id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        Self {
            id,
            group_id: record.group_id.clone(),
            subgroup_id: record.subgroup_id.clone(),
            is_locked: record.is_locked,
            is_visible: true,
            display_labels: record.display_labels.unwrap_or(default_display_labels),
            is_dynamic: false,
            style: record.style.clone(),
            locked_style: record.locked_style.clone(),
            view_target: ViewTarget::from_record(&record.view_target),
            drawing_metadata: record.drawing_metadata.clone(),
        }
    }
}
