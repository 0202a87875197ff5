//! Factory functions for viewports, measurements and persisted records.
//!
//! Used by the unit and integration tests and by the command protocol.

use glam::DVec3;
use kurbo::Rect;
use shared::{CartographicProps, DrawingMetadata, ViewType};

use crate::measurement::{Measurement, MeasurementKind};
use crate::state::MeasurementContext;
use crate::view_target::ViewTarget;
use crate::viewport::{Viewport, ViewportId};

/// Screen size of the fixture viewports, in pixels
pub const VIEW_WIDTH: f64 = 800.0;
pub const VIEW_HEIGHT: f64 = 600.0;
/// Fixture zoom: the 800x600 view spans x in [-20, 20], y in [-15, 15]
pub const PIXELS_PER_UNIT: f64 = 20.0;

// ── Viewports ───────────────────────────────────────────────────

/// Top-down orthographic viewport centred on the origin
pub fn top_viewport(id: ViewportId, view_type: ViewType) -> Viewport {
    Viewport::orthographic_top(
        id,
        view_type,
        Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
        DVec3::ZERO,
        PIXELS_PER_UNIT,
    )
}

pub fn spatial_viewport() -> Viewport {
    top_viewport(1, ViewType::Spatial)
}

pub fn sheet_viewport() -> Viewport {
    top_viewport(2, ViewType::Sheet)
}

pub fn drawing_viewport() -> Viewport {
    top_viewport(3, ViewType::Drawing)
}

// ── Measurements ────────────────────────────────────────────────

/// 3-4-5 distance in the XY plane
pub fn distance_345() -> Measurement {
    Measurement::distance(DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0))
}

/// Closed 2x2 square
pub fn closed_square() -> Measurement {
    Measurement::area(vec![
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(2.0, 2.0, 0.0),
        DVec3::new(0.0, 2.0, 0.0),
        DVec3::new(0.0, 0.0, 0.0),
    ])
}

/// Unit circle through three points
pub fn unit_radius() -> Measurement {
    Measurement::radius_through(DVec3::X, DVec3::Y, -DVec3::X)
}

/// Right angle at the origin
pub fn right_angle() -> Measurement {
    Measurement::angle_between(DVec3::X, DVec3::ZERO, DVec3::Y)
}

/// Location carrying every optional field
pub fn full_location() -> Measurement {
    let mut m = Measurement::location(DVec3::new(10.0, 20.0, 3.0));
    m.modify(|k| {
        if let MeasurementKind::Location(l) = k {
            l.geo_location = Some(CartographicProps {
                latitude: 45.5,
                longitude: -73.5,
                height: 30.0,
            });
            l.slope = Some(1.5);
            l.station = Some(250.0);
            l.offset = Some(-2.0);
        }
    });
    m
}

/// One complete measurement of every variant, with non-default
/// presentation fields spread across them
pub fn one_of_each() -> Vec<Measurement> {
    let mut distance = distance_345();
    distance.set_group_id(Some("group-a".into()));
    distance.modify(|k| {
        if let MeasurementKind::Distance(d) = k {
            d.set_show_axes(true);
        }
    });

    let mut area = closed_square();
    area.set_style(Some("highlight".into()));
    area.set_view_target(ViewTarget::only(ViewType::Sheet));
    area.set_drawing_metadata(Some(DrawingMetadata {
        origin: Some([1.0, 2.0]),
        world_scale: Some(100.0),
    }));

    let mut location = full_location();
    location.set_subgroup_id(Some("sub-1".into()));
    location.set_display_labels(false);

    let mut radius = unit_radius();
    radius.set_locked(true);
    radius.set_locked_style(Some("grey".into()));

    let angle = right_angle();

    vec![distance, area, location, radius, angle]
}

// ── Records ─────────────────────────────────────────────────────

/// Persisted document with one distance and one area
pub fn sample_document_json() -> String {
    r#"{
  "version": 1,
  "measurements": [
    {
      "type": "distance",
      "id": "6f1c2f1e-4c59-4d6b-9d1e-2d3c4b5a6978",
      "groupId": "survey",
      "startPoint": { "x": 0.0, "y": 0.0, "z": 0.0 },
      "endPoint": { "x": 6.0, "y": 8.0, "z": 0.0 }
    },
    {
      "type": "area",
      "polygonPoints": [
        { "x": 0.0, "y": 0.0 },
        { "x": 4.0, "y": 0.0 },
        { "x": 4.0, "y": 3.0 },
        { "x": 0.0, "y": 0.0 }
      ],
      "isLocked": true
    }
  ]
}"#
    .to_string()
}

// ── Context ─────────────────────────────────────────────────────

/// Context with default preferences and the spatial fixture viewport
/// registered
pub fn test_context() -> MeasurementContext {
    let mut ctx = MeasurementContext::default();
    ctx.manager.register_viewport(spatial_viewport());
    ctx
}
