//! Quantity formatting boundary.
//!
//! Measurements only know [`FormatterSpecRef`]s (kind-of-quantity plus
//! persistence unit). A [`QuantityFormatter`] resolves them to a
//! [`FormatterSpec`]; a lookup may not be ready yet, in which case the raw
//! value is shown and resolution is retried on the next refresh.

use shared::FormatterSpecRef;

use crate::state::settings::{AngleUnits, MeasurementPreferences, Units};

/// Resolved formatter for one quantity
#[derive(Debug, Clone, PartialEq)]
pub struct FormatterSpec {
    pub spec_ref: FormatterSpecRef,
    /// Persistence unit -> display unit
    pub factor: f64,
    /// Appended after the number, including any separator
    pub suffix: String,
    pub precision: usize,
}

impl FormatterSpec {
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}{}", self.precision, value * self.factor, self.suffix)
    }
}

/// Shown while no formatter is available
pub fn format_raw(value: f64) -> String {
    format!("{value:.4}")
}

pub trait QuantityFormatter {
    /// `None` means "not available (yet)"
    fn find_spec(&self, spec_ref: &FormatterSpecRef) -> Option<FormatterSpec>;

    /// Called when display preferences change
    fn apply_preferences(&mut self, _prefs: &MeasurementPreferences) {}
}

/// Formatter driven by the unit system in the preferences.
///
/// Understands the stock length, area, angle, station and coordinate
/// quantities persisted in meters, square meters and radians.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitsFormatter {
    units: Units,
    angle_units: AngleUnits,
    precision: usize,
}

impl Default for UnitsFormatter {
    fn default() -> Self {
        Self::from_preferences(&MeasurementPreferences::default())
    }
}

impl UnitsFormatter {
    pub fn from_preferences(prefs: &MeasurementPreferences) -> Self {
        Self {
            units: prefs.units,
            angle_units: prefs.angle_units,
            precision: prefs.precision,
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn spec(&self, spec_ref: &FormatterSpecRef, factor: f64, suffix: String) -> FormatterSpec {
        FormatterSpec {
            spec_ref: spec_ref.clone(),
            factor,
            suffix,
            precision: self.precision,
        }
    }
}

impl QuantityFormatter for UnitsFormatter {
    fn find_spec(&self, spec_ref: &FormatterSpecRef) -> Option<FormatterSpec> {
        let koq = spec_ref.koq_name.rsplit('.').next().unwrap_or_default();
        let unit = spec_ref.persistence_unit_name.as_str();
        match (koq, unit) {
            ("LENGTH" | "LENGTH_COORDINATE" | "STATION", "Units.M") => Some(self.spec(
                spec_ref,
                self.units.length_factor(),
                format!(" {}", self.units.abbrev()),
            )),
            ("AREA", "Units.SQ_M") => {
                let f = self.units.length_factor();
                Some(self.spec(spec_ref, f * f, format!(" {}", self.units.area_abbrev())))
            }
            ("ANGLE", "Units.RAD") => Some(match self.angle_units {
                AngleUnits::Degrees => {
                    self.spec(spec_ref, 180.0 / std::f64::consts::PI, "°".to_string())
                }
                AngleUnits::Radians => self.spec(spec_ref, 1.0, " rad".to_string()),
            }),
            _ => None,
        }
    }

    fn apply_preferences(&mut self, prefs: &MeasurementPreferences) {
        *self = Self::from_preferences(prefs);
    }
}

/// Specs resolved for one measurement's formatting references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecCache {
    resolved: Vec<FormatterSpec>,
    pending: usize,
}

impl SpecCache {
    /// Re-resolve every reference; returns how many are still unavailable
    pub fn refresh(
        &mut self,
        refs: &[FormatterSpecRef],
        formatter: &dyn QuantityFormatter,
    ) -> usize {
        self.resolved = refs.iter().filter_map(|r| formatter.find_spec(r)).collect();
        self.pending = refs.len() - self.resolved.len();
        self.pending
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn get(&self, spec_ref: &FormatterSpecRef) -> Option<&FormatterSpec> {
        self.resolved.iter().find(|s| s.spec_ref == *spec_ref)
    }

    /// Cached spec, else a direct lookup, else the raw number
    pub fn format(
        &self,
        spec_ref: &FormatterSpecRef,
        value: f64,
        formatter: &dyn QuantityFormatter,
    ) -> String {
        if let Some(spec) = self.get(spec_ref) {
            return spec.format(value);
        }
        match formatter.find_spec(spec_ref) {
            Some(spec) => spec.format(value),
            None => format_raw(value),
        }
    }
}
