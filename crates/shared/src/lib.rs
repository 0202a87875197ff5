use glam::DVec3;
use serde::{Deserialize, Serialize};

pub mod lenient;
pub mod records;

pub use records::{
    parse_records, AngleRecord, AreaRecord, CommonRecord, DistanceRecord, LocationRecord,
    MeasurementDocument, MeasurementRecord, RadiusRecord, RecordBatch,
};

/// Opaque identifier of a measurement as written to disk
pub type RecordId = String;

/// Viewport classification a measurement may be drawn into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViewType {
    Spatial,
    Drawing,
    Sheet,
    CrossSection,
    Profile,
    /// Wildcard: matches every viewport kind
    Any,
}

impl ViewType {
    /// Cross sections and profiles are specialised drawings
    pub fn is_drawing_family(&self) -> bool {
        matches!(self, ViewType::Drawing | ViewType::CrossSection | ViewType::Profile)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewType::Spatial => "Spatial",
            ViewType::Drawing => "Drawing",
            ViewType::Sheet => "Sheet",
            ViewType::CrossSection => "CrossSection",
            ViewType::Profile => "Profile",
            ViewType::Any => "Any",
        }
    }

    /// All concrete (non-wildcard) kinds
    pub fn concrete() -> &'static [ViewType] {
        &[
            ViewType::Spatial,
            ViewType::Drawing,
            ViewType::Sheet,
            ViewType::CrossSection,
            ViewType::Profile,
        ]
    }
}

/// 3D point as persisted: `{ "x": .., "y": .., "z": .. }`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XyzProps {
    pub x: f64,
    pub y: f64,
    /// 2D records may omit z
    #[serde(default)]
    pub z: f64,
}

impl From<DVec3> for XyzProps {
    fn from(p: DVec3) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<XyzProps> for DVec3 {
    fn from(p: XyzProps) -> Self {
        DVec3::new(p.x, p.y, p.z)
    }
}

/// Geographic coordinate in degrees / meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CartographicProps {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub height: f64,
}

/// Sheet placement of a drawing. When `world_scale` is set, sheet
/// coordinates are converted to world units before display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingMetadata {
    #[serde(default, deserialize_with = "lenient::lenient")]
    pub origin: Option<[f64; 2]>,
    #[serde(default, deserialize_with = "lenient::lenient")]
    pub world_scale: Option<f64>,
}

impl DrawingMetadata {
    /// Matrix mapping sheet coordinates to world coordinates
    pub fn sheet_to_world(&self) -> glam::DAffine3 {
        let scale = self.world_scale.unwrap_or(1.0);
        let origin = self.origin.unwrap_or([0.0, 0.0]);
        glam::DAffine3::from_scale(DVec3::splat(scale))
            * glam::DAffine3::from_translation(DVec3::new(-origin[0], -origin[1], 0.0))
    }

    pub fn is_identity(&self) -> bool {
        self.world_scale.is_none_or(|s| s == 1.0) && self.origin.is_none()
    }
}

// ============================================================================
// Formatting references
// ============================================================================

/// Named pairing of a kind-of-quantity and its persistence unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterSpecRef {
    pub koq_name: String,
    pub persistence_unit_name: String,
}

impl FormatterSpecRef {
    pub fn new(koq_name: &str, persistence_unit_name: &str) -> Self {
        Self {
            koq_name: koq_name.to_string(),
            persistence_unit_name: persistence_unit_name.to_string(),
        }
    }

    pub fn length() -> Self {
        Self::new("AecUnits.LENGTH", "Units.M")
    }

    pub fn area() -> Self {
        Self::new("AecUnits.AREA", "Units.SQ_M")
    }

    pub fn angle() -> Self {
        Self::new("AecUnits.ANGLE", "Units.RAD")
    }

    pub fn station() -> Self {
        Self::new("RoadRailUnits.STATION", "Units.M")
    }

    pub fn coordinate() -> Self {
        Self::new("AecUnits.LENGTH_COORDINATE", "Units.M")
    }
}

fn default_length_ref() -> FormatterSpecRef {
    FormatterSpecRef::length()
}

fn default_area_ref() -> FormatterSpecRef {
    FormatterSpecRef::area()
}

fn default_angle_ref() -> FormatterSpecRef {
    FormatterSpecRef::angle()
}

fn default_station_ref() -> FormatterSpecRef {
    FormatterSpecRef::station()
}

fn default_coordinate_ref() -> FormatterSpecRef {
    FormatterSpecRef::coordinate()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceFormatting {
    #[serde(default = "default_length_ref")]
    pub length: FormatterSpecRef,
}

impl Default for DistanceFormatting {
    fn default() -> Self {
        Self { length: FormatterSpecRef::length() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFormatting {
    #[serde(default = "default_length_ref")]
    pub length: FormatterSpecRef,
    #[serde(default = "default_area_ref")]
    pub area: FormatterSpecRef,
}

impl Default for AreaFormatting {
    fn default() -> Self {
        Self {
            length: FormatterSpecRef::length(),
            area: FormatterSpecRef::area(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFormatting {
    #[serde(default = "default_coordinate_ref")]
    pub coordinate: FormatterSpecRef,
    #[serde(default = "default_station_ref")]
    pub station: FormatterSpecRef,
    #[serde(default = "default_length_ref")]
    pub length: FormatterSpecRef,
    #[serde(default = "default_angle_ref")]
    pub angle: FormatterSpecRef,
}

impl Default for LocationFormatting {
    fn default() -> Self {
        Self {
            coordinate: FormatterSpecRef::coordinate(),
            station: FormatterSpecRef::station(),
            length: FormatterSpecRef::length(),
            angle: FormatterSpecRef::angle(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusFormatting {
    #[serde(default = "default_length_ref")]
    pub length: FormatterSpecRef,
}

impl Default for RadiusFormatting {
    fn default() -> Self {
        Self { length: FormatterSpecRef::length() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleFormatting {
    #[serde(default = "default_angle_ref")]
    pub angle: FormatterSpecRef,
}

impl Default for AngleFormatting {
    fn default() -> Self {
        Self { angle: FormatterSpecRef::angle() }
    }
}

/// Persisted view target: included/excluded kinds plus explicit view ids
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTargetRecord {
    #[serde(default, deserialize_with = "lenient::lenient")]
    pub included: Vec<ViewType>,
    #[serde(default, deserialize_with = "lenient::lenient")]
    pub excluded: Vec<ViewType>,
    #[serde(default, deserialize_with = "lenient::lenient", skip_serializing_if = "Vec::is_empty")]
    pub view_ids: Vec<String>,
}
