//! Persisted measurement records.
//!
//! Each record is a flat JSON object with a `"type"` discriminator, the
//! variant geometry (points as `{x, y, z}`), its formatting references and
//! the common presentation fields. Dynamic state, cached graphics and pick
//! handles never appear here.

use serde::{Deserialize, Serialize};

use crate::lenient::lenient;
use crate::{
    AngleFormatting, AreaFormatting, CartographicProps, DistanceFormatting, DrawingMetadata,
    LocationFormatting, RadiusFormatting, RecordId, ViewTargetRecord, XyzProps,
};

/// Fields every measurement variant writes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub subgroup_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_locked: bool,
    /// Missing means "use the preference default"
    #[serde(default, deserialize_with = "lenient")]
    pub display_labels: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_target: ViewTargetRecord,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub locked_style: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub drawing_metadata: Option<DrawingMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub start_point: XyzProps,
    pub end_point: XyzProps,
    #[serde(default, deserialize_with = "lenient")]
    pub show_axes: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting: DistanceFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub polygon_points: Vec<XyzProps>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting: AreaFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub location: XyzProps,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<CartographicProps>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub station: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting: LocationFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub start_point: XyzProps,
    /// Absent until the second point is picked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid_point: Option<XyzProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<XyzProps>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting: RadiusFormatting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleRecord {
    #[serde(flatten)]
    pub common: CommonRecord,
    pub start_point: XyzProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<XyzProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<XyzProps>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatting: AngleFormatting,
}

/// One persisted measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MeasurementRecord {
    Distance(DistanceRecord),
    Area(AreaRecord),
    Location(LocationRecord),
    Radius(RadiusRecord),
    Angle(AngleRecord),
}

impl MeasurementRecord {
    pub fn common(&self) -> &CommonRecord {
        match self {
            MeasurementRecord::Distance(r) => &r.common,
            MeasurementRecord::Area(r) => &r.common,
            MeasurementRecord::Location(r) => &r.common,
            MeasurementRecord::Radius(r) => &r.common,
            MeasurementRecord::Angle(r) => &r.common,
        }
    }

    /// Discriminator values this version understands
    pub fn known_types() -> &'static [&'static str] {
        &["distance", "area", "location", "radius", "angle"]
    }
}

fn default_version() -> u32 {
    1
}

/// File-level wrapper written by exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    pub measurements: Vec<MeasurementRecord>,
}

impl Default for MeasurementDocument {
    fn default() -> Self {
        Self {
            version: 1,
            measurements: Vec::new(),
        }
    }
}

/// Result of parsing a batch: good records plus a reason for each skipped one
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub records: Vec<MeasurementRecord>,
    pub skipped: Vec<String>,
}

/// Parse either a bare array of records or a [`MeasurementDocument`].
///
/// Records are parsed one by one: a record with a missing or unknown
/// discriminator, or with malformed required geometry, is skipped and
/// reported, and the rest of the batch still loads. Only a document that is
/// not JSON at all, or has no record list, is an error.
pub fn parse_records(json: &str) -> Result<RecordBatch, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid measurement JSON: {e}"))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("measurements") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Err("Measurement document has no \"measurements\" array".to_string()),
        },
        _ => return Err("Expected an array of measurements".to_string()),
    };

    let mut batch = RecordBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        let kind = item.get("type").and_then(|t| t.as_str()).map(str::to_string);
        match kind {
            None => batch
                .skipped
                .push(format!("record {index}: missing \"type\" discriminator")),
            Some(kind) if !MeasurementRecord::known_types().contains(&kind.as_str()) => batch
                .skipped
                .push(format!("record {index}: unknown measurement type \"{kind}\"")),
            Some(kind) => match serde_json::from_value::<MeasurementRecord>(item) {
                Ok(record) => batch.records.push(record),
                Err(e) => batch
                    .skipped
                    .push(format!("record {index}: malformed {kind} measurement: {e}")),
            },
        }
    }
    Ok(batch)
}
