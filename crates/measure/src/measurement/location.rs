use glam::DVec3;
use kurbo::Point;
use shared::{CartographicProps, FormatterSpecRef, LocationFormatting};

use super::label::ValueFormatter;
use super::{DecorationGeometry, MeasurementProperty, MeasurementVariant, POINT_SIZE};
use crate::geometry::is_almost_equal;
use crate::i18n::t;
use crate::render::{GraphicBuilder, GraphicStyle, StyleTheme};
use crate::viewport::Viewport;

/// A single picked point with whatever context the host could resolve for it
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMeasurement {
    location: DVec3,
    pub geo_location: Option<CartographicProps>,
    /// Surface slope at the point, percent
    pub slope: Option<f64>,
    /// Distance along an alignment
    pub station: Option<f64>,
    /// Perpendicular distance from the alignment
    pub offset: Option<f64>,
    pub formatting: LocationFormatting,
}

fn close(a: Option<f64>, b: Option<f64>, tol: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= tol,
        (None, None) => true,
        _ => false,
    }
}

impl LocationMeasurement {
    pub fn new(location: DVec3) -> Self {
        Self {
            location,
            geo_location: None,
            slope: None,
            station: None,
            offset: None,
            formatting: LocationFormatting::default(),
        }
    }

    pub fn location(&self) -> DVec3 {
        self.location
    }

    pub fn set_location(&mut self, p: DVec3) {
        self.location = p;
    }

    pub fn equals(&self, other: &LocationMeasurement, tol: f64) -> bool {
        let geo_equal = match (&self.geo_location, &other.geo_location) {
            (Some(a), Some(b)) => {
                (a.latitude - b.latitude).abs() <= tol
                    && (a.longitude - b.longitude).abs() <= tol
                    && (a.height - b.height).abs() <= tol
            }
            (None, None) => true,
            _ => false,
        };
        is_almost_equal(self.location, other.location, tol)
            && geo_equal
            && close(self.slope, other.slope, tol)
            && close(self.station, other.station, tol)
            && close(self.offset, other.offset, tol)
            && self.formatting == other.formatting
    }

    fn detail_rows(&self, fmt: &ValueFormatter<'_>) -> Vec<(&'static str, String)> {
        let f = &self.formatting;
        let mut rows = vec![("prop.coordinates", fmt.point(&f.coordinate, self.location))];
        if let Some(geo) = &self.geo_location {
            rows.push(("prop.latitude", fmt.degrees(geo.latitude)));
            rows.push(("prop.longitude", fmt.degrees(geo.longitude)));
            rows.push(("prop.altitude", fmt.length(&f.length, geo.height)));
        }
        if let Some(station) = self.station {
            rows.push(("prop.station", fmt.value(&f.station, station)));
        }
        if let Some(offset) = self.offset {
            rows.push(("prop.offset", fmt.length(&f.length, offset)));
        }
        if let Some(slope) = self.slope {
            rows.push(("prop.slope", fmt.percent(slope)));
        }
        rows
    }
}

impl MeasurementVariant for LocationMeasurement {
    fn kind_name(&self) -> &'static str {
        "location"
    }

    fn title_key(&self) -> &'static str {
        "measure.location"
    }

    fn formatting_refs(&self) -> Vec<FormatterSpecRef> {
        let f = &self.formatting;
        vec![
            f.coordinate.clone(),
            f.station.clone(),
            f.length.clone(),
            f.angle.clone(),
        ]
    }

    fn add_graphics(
        &self,
        builder: &mut GraphicBuilder,
        style: &GraphicStyle,
        _theme: &StyleTheme,
        _is_dynamic: bool,
    ) {
        builder.add_styled_points(&[self.location], POINT_SIZE * 1.5, style);
    }

    fn label_anchor(&self, viewport: &Viewport) -> Option<(DVec3, Point)> {
        let view = viewport.world_to_view(self.location)?;
        viewport
            .view_rect
            .contains(view)
            .then_some((self.location, view))
    }

    fn label_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        let mut lines = vec![fmt.point(&self.formatting.coordinate, self.location)];
        if let Some(station) = self.station {
            lines.push(fmt.value(&self.formatting.station, station));
        }
        lines
    }

    fn tooltip_lines(&self, fmt: &ValueFormatter<'_>) -> Vec<String> {
        self.detail_rows(fmt)
            .into_iter()
            .map(|(key, value)| format!("{}: {}", t(key), value))
            .collect()
    }

    fn properties(&self, fmt: &ValueFormatter<'_>) -> Vec<MeasurementProperty> {
        self.detail_rows(fmt)
            .into_iter()
            .map(|(key, value)| MeasurementProperty::new(key, value))
            .collect()
    }

    fn decoration_geometry(&self, _is_dynamic: bool) -> Option<DecorationGeometry> {
        Some(DecorationGeometry::Point(self.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{SpecCache, UnitsFormatter};

    #[test]
    fn test_optional_rows_are_omitted() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let fmt = ValueFormatter::new(&cache, &f, None);
        let loc = LocationMeasurement::new(DVec3::new(1.0, 2.0, 3.0));
        let props = loc.properties(&fmt);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].value, "1.00 m, 2.00 m, 3.00 m");
    }

    #[test]
    fn test_geo_station_and_slope_rows() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let fmt = ValueFormatter::new(&cache, &f, None);
        let mut loc = LocationMeasurement::new(DVec3::ZERO);
        loc.geo_location = Some(CartographicProps {
            latitude: 45.5,
            longitude: -73.25,
            height: 12.0,
        });
        loc.station = Some(120.0);
        loc.slope = Some(2.5);
        let keys: Vec<_> = loc.properties(&fmt).iter().map(|p| p.key).collect();
        assert_eq!(
            keys,
            vec![
                "prop.coordinates",
                "prop.latitude",
                "prop.longitude",
                "prop.altitude",
                "prop.station",
                "prop.slope"
            ]
        );
        assert_eq!(loc.label_lines(&fmt).len(), 2);
        assert!(loc.tooltip_lines(&fmt)[1].contains("45.500000°"));
    }

    #[test]
    fn test_equals_compares_optional_fields() {
        let a = LocationMeasurement::new(DVec3::X);
        let mut b = a.clone();
        assert!(a.equals(&b, 1e-9));
        b.offset = Some(1.0);
        assert!(!a.equals(&b, 1e-9));
    }
}
