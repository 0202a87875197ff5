//! Measurement preferences

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geometry::DEFAULT_TOLERANCE;

/// Unit system for displayed lengths and areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Length abbreviation
    pub fn abbrev(&self) -> &'static str {
        match self {
            Units::Metric => "m",
            Units::Imperial => "ft",
        }
    }

    pub fn area_abbrev(&self) -> &'static str {
        match self {
            Units::Metric => "m²",
            Units::Imperial => "ft²",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Units::Metric => "Metric",
            Units::Imperial => "Imperial",
        }
    }

    /// Meters -> display length
    pub fn length_factor(&self) -> f64 {
        match self {
            Units::Metric => 1.0,
            Units::Imperial => 1.0 / 0.3048,
        }
    }

    pub fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnits {
    #[default]
    Degrees,
    Radians,
}

/// Process-wide measurement preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementPreferences {
    /// Display units
    pub units: Units,
    pub angle_units: AngleUnits,
    /// Decimal places in labels and tooltips
    pub precision: usize,
    /// Labels shown on newly created measurements
    pub display_labels: bool,
    /// Rise/run axes shown on newly created distances
    pub display_axes: bool,
    /// Label font size in points
    pub label_font_size: f32,
    /// Distance under which an area point closes the polygon
    pub closing_tolerance: Option<f64>,
    /// Tool sessions add committed measurements to the selection
    pub sync_selection: bool,
}

impl Default for MeasurementPreferences {
    fn default() -> Self {
        Self {
            units: Units::Metric,
            angle_units: AngleUnits::Degrees,
            precision: 2,
            display_labels: true,
            display_axes: false,
            label_font_size: 14.0,
            closing_tolerance: None,
            sync_selection: true,
        }
    }
}

impl MeasurementPreferences {
    pub fn closing_tolerance(&self) -> f64 {
        self.closing_tolerance
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(DEFAULT_TOLERANCE)
    }

    /// `<config dir>/measure-tools/preferences.json`
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "measure-tools", "measure-tools")
            .map(|dirs| dirs.config_dir().join("preferences.json"))
    }

    /// Load from the config dir; missing or malformed files yield defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(prefs) => {
                info!("Loaded measurement preferences from {}", path.display());
                prefs
            }
            Err(e) => {
                warn!("{e}; using default preferences");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("Invalid preferences in {}: {e}", path.display()))
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        info!("Saved measurement preferences to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let prefs: MeasurementPreferences =
            serde_json::from_str(r#"{"units": "Imperial", "precision": 4}"#).unwrap();
        assert_eq!(prefs.units, Units::Imperial);
        assert_eq!(prefs.precision, 4);
        assert!(prefs.display_labels);
        assert!(prefs.sync_selection);
        assert_eq!(prefs.label_font_size, 14.0);
    }

    #[test]
    fn test_closing_tolerance_rejects_nonsense() {
        let mut prefs = MeasurementPreferences::default();
        assert_eq!(prefs.closing_tolerance(), DEFAULT_TOLERANCE);
        prefs.closing_tolerance = Some(-1.0);
        assert_eq!(prefs.closing_tolerance(), DEFAULT_TOLERANCE);
        prefs.closing_tolerance = Some(0.01);
        assert_eq!(prefs.closing_tolerance(), 0.01);
    }

    #[test]
    fn test_imperial_factor() {
        assert!((Units::Imperial.length_factor() * 0.3048 - 1.0).abs() < 1e-12);
        assert_eq!(Units::Metric.abbrev(), "m");
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("measure-prefs-{}", uuid::Uuid::new_v4()));
        let path = dir.join("preferences.json");
        let prefs = MeasurementPreferences {
            units: Units::Imperial,
            display_axes: true,
            ..Default::default()
        };
        prefs.save_to(&path).unwrap();
        let loaded = MeasurementPreferences::load_from(&path).unwrap();
        assert_eq!(loaded, prefs);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_load_from_malformed_file_is_error() {
        let dir = std::env::temp_dir().join(format!("measure-prefs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preferences.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(MeasurementPreferences::load_from(&path).is_err());
        let _ = std::fs::remove_dir_all(dir);
    }
}
