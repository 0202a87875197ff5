//! Conversion between live measurements and persisted records.

use glam::DVec3;
use shared::{
    parse_records, AngleRecord, AreaRecord, DistanceRecord, LocationRecord, MeasurementDocument,
    MeasurementRecord, RadiusRecord,
};

use super::{
    AngleMeasurement, AreaMeasurement, DistanceMeasurement, LocationMeasurement, Measurement,
    MeasurementKind, MeasurementProps, RadiusMeasurement,
};

impl Measurement {
    /// Persisted form. Incomplete radius and angle points are written as the
    /// start point.
    pub fn to_record(&self) -> MeasurementRecord {
        let common = self.props().to_record();
        match self.kind() {
            MeasurementKind::Distance(d) => MeasurementRecord::Distance(DistanceRecord {
                common,
                start_point: d.start_point().into(),
                end_point: d.end_point().into(),
                show_axes: Some(d.show_axes()),
                formatting: d.formatting.clone(),
            }),
            MeasurementKind::Area(a) => MeasurementRecord::Area(AreaRecord {
                common,
                polygon_points: a.points().iter().map(|&p| p.into()).collect(),
                formatting: a.formatting.clone(),
            }),
            MeasurementKind::Location(l) => MeasurementRecord::Location(LocationRecord {
                common,
                location: l.location().into(),
                geo_location: l.geo_location,
                slope: l.slope,
                station: l.station,
                offset: l.offset,
                formatting: l.formatting.clone(),
            }),
            MeasurementKind::Radius(r) => MeasurementRecord::Radius(RadiusRecord {
                common,
                start_point: r.start_point().into(),
                mid_point: r.mid_point().map(Into::into),
                end_point: r.end_point().map(Into::into),
                formatting: r.formatting.clone(),
            }),
            MeasurementKind::Angle(a) => MeasurementRecord::Angle(AngleRecord {
                common,
                start_point: a.start_point().into(),
                center: a.center().map(Into::into),
                end_point: a.end_point().map(Into::into),
                formatting: a.formatting.clone(),
            }),
        }
    }

    /// Rebuild from a record. `default_display_labels` applies when the
    /// record does not say.
    pub fn from_record(record: &MeasurementRecord, default_display_labels: bool) -> Measurement {
        let props = MeasurementProps::from_record(record.common(), default_display_labels);
        let kind = match record {
            MeasurementRecord::Distance(r) => {
                let mut d = DistanceMeasurement::new(r.start_point.into(), r.end_point.into());
                d.set_show_axes(r.show_axes.unwrap_or(false));
                d.formatting = r.formatting.clone();
                MeasurementKind::Distance(d)
            }
            MeasurementRecord::Area(r) => {
                let points = r.polygon_points.iter().map(|&p| DVec3::from(p)).collect();
                let mut a = AreaMeasurement::new(points);
                a.formatting = r.formatting.clone();
                MeasurementKind::Area(a)
            }
            MeasurementRecord::Location(r) => {
                let mut l = LocationMeasurement::new(r.location.into());
                l.geo_location = r.geo_location;
                l.slope = r.slope;
                l.station = r.station;
                l.offset = r.offset;
                l.formatting = r.formatting.clone();
                MeasurementKind::Location(l)
            }
            MeasurementRecord::Radius(r) => {
                let mut m = RadiusMeasurement::new(r.start_point.into());
                if let Some(mid) = r.mid_point {
                    m.set_mid_point(mid.into());
                }
                if let Some(end) = r.end_point {
                    m.set_end_point(end.into());
                }
                m.formatting = r.formatting.clone();
                MeasurementKind::Radius(m)
            }
            MeasurementRecord::Angle(r) => {
                let mut m = AngleMeasurement::new(r.start_point.into());
                if let Some(center) = r.center {
                    m.set_center(center.into());
                }
                if let Some(end) = r.end_point {
                    m.set_end_point(end.into());
                }
                m.formatting = r.formatting.clone();
                MeasurementKind::Angle(m)
            }
        };
        Measurement::with_props(props, kind)
    }
}

/// Document of every committed measurement; dynamic ones are skipped
pub fn export_document<'a>(
    items: impl IntoIterator<Item = &'a Measurement>,
) -> MeasurementDocument {
    MeasurementDocument {
        measurements: items
            .into_iter()
            .filter(|m| !m.is_dynamic())
            .map(Measurement::to_record)
            .collect(),
        ..Default::default()
    }
}

pub fn measurements_to_json<'a>(
    items: impl IntoIterator<Item = &'a Measurement>,
) -> Result<String, String> {
    serde_json::to_string_pretty(&export_document(items))
        .map_err(|e| format!("Failed to serialize measurements: {e}"))
}

/// Parse a batch. Bad records are skipped and reported; the second vector
/// holds one reason per skipped record.
pub fn measurements_from_json(
    json: &str,
    default_display_labels: bool,
) -> Result<(Vec<Measurement>, Vec<String>), String> {
    let batch = parse_records(json)?;
    let measurements = batch
        .records
        .iter()
        .map(|r| Measurement::from_record(r, default_display_labels))
        .collect();
    Ok((measurements, batch.skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::geometry::DEFAULT_TOLERANCE;

    #[test]
    fn test_every_variant_survives_a_round_trip() {
        for original in fixtures::one_of_each() {
            let json = measurements_to_json([&original]).unwrap();
            let (back, skipped) = measurements_from_json(&json, true).unwrap();
            assert!(skipped.is_empty());
            assert_eq!(back.len(), 1);
            assert!(
                back[0].equals(&original, DEFAULT_TOLERANCE),
                "{} did not round-trip",
                original.kind_name()
            );
        }
    }

    #[test]
    fn test_dynamic_measurements_are_not_exported() {
        let mut m = Measurement::distance(DVec3::ZERO, DVec3::X);
        m.set_dynamic(true);
        let committed = Measurement::location(DVec3::Y);
        let doc = export_document([&m, &committed]);
        assert_eq!(doc.measurements.len(), 1);
        assert!(matches!(doc.measurements[0], MeasurementRecord::Location(_)));
    }

    #[test]
    fn test_unknown_and_malformed_records_are_skipped() {
        let json = r#"[
            {"type": "distance", "startPoint": {"x": 0, "y": 0}, "endPoint": {"x": 1, "y": 0}},
            {"type": "volume"},
            {"startPoint": {"x": 0, "y": 0}},
            {"type": "radius", "startPoint": "nope"}
        ]"#;
        let (ms, skipped) = measurements_from_json(json, false).unwrap();
        assert_eq!(ms.len(), 1);
        assert_eq!(skipped.len(), 3);
        assert!(!ms[0].props().display_labels);
        assert!((ms[0].kind().as_distance().unwrap().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_incomplete_radius_leaves_missing_points_out() {
        let m = Measurement::radius(DVec3::new(1.0, 2.0, 3.0));
        match m.to_record() {
            MeasurementRecord::Radius(r) => {
                assert!(r.mid_point.is_none());
                assert!(r.end_point.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        let json = measurements_to_json([&m]).unwrap();
        assert!(!json.contains("midPoint"));
        let (back, skipped) = measurements_from_json(&json, true).unwrap();
        assert!(skipped.is_empty());
        assert!(back[0].equals(&m, DEFAULT_TOLERANCE));
        assert!(back[0].kind().as_radius().unwrap().mid_point().is_none());
    }

    #[test]
    fn test_incomplete_angle_round_trips() {
        let mut m = Measurement::angle(DVec3::ZERO);
        m.modify(|kind| {
            if let MeasurementKind::Angle(a) = kind {
                a.set_center(DVec3::X);
            }
        });
        let json = measurements_to_json([&m]).unwrap();
        let (back, _) = measurements_from_json(&json, true).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back[0].equals(&m, DEFAULT_TOLERANCE));
        let angle = back[0].kind().as_angle().unwrap();
        assert_eq!(angle.center(), Some(DVec3::X));
        assert!(angle.end_point().is_none());
    }

    #[test]
    fn test_not_json_is_an_error() {
        assert!(measurements_from_json("{{", true).is_err());
    }
}
