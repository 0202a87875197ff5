//! Label text and placement shared by all variants.

use glam::{DAffine3, DVec3};
use shared::{DrawingMetadata, FormatterSpecRef};

use super::MeasurementVariant;
use crate::format::{QuantityFormatter, SpecCache};
use crate::pick::PickId;
use crate::render::{GraphicStyle, TextLabel};
use crate::viewport::Viewport;

/// Formats values of one measurement, applying its sheet-to-world
/// transform to lengths, areas and coordinates.
pub struct ValueFormatter<'a> {
    cache: &'a SpecCache,
    formatter: &'a dyn QuantityFormatter,
    sheet: Option<DAffine3>,
    world_scale: f64,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(
        cache: &'a SpecCache,
        formatter: &'a dyn QuantityFormatter,
        metadata: Option<&DrawingMetadata>,
    ) -> Self {
        let active = metadata.filter(|m| !m.is_identity());
        Self {
            cache,
            formatter,
            sheet: active.map(DrawingMetadata::sheet_to_world),
            world_scale: active.and_then(|m| m.world_scale).unwrap_or(1.0),
        }
    }

    /// A non-identity sheet-to-world transform is in effect
    pub fn sheet_active(&self) -> bool {
        self.sheet.is_some()
    }

    /// No unit conversion beyond the formatter's own
    pub fn value(&self, spec_ref: &FormatterSpecRef, value: f64) -> String {
        self.cache.format(spec_ref, value, self.formatter)
    }

    pub fn length(&self, spec_ref: &FormatterSpecRef, length: f64) -> String {
        self.value(spec_ref, length * self.world_scale)
    }

    pub fn area(&self, spec_ref: &FormatterSpecRef, area: f64) -> String {
        self.value(spec_ref, area * self.world_scale * self.world_scale)
    }

    pub fn point(&self, spec_ref: &FormatterSpecRef, p: DVec3) -> String {
        let w = self.sheet.map(|m| m.transform_point3(p)).unwrap_or(p);
        format!(
            "{}, {}, {}",
            self.value(spec_ref, w.x),
            self.value(spec_ref, w.y),
            self.value(spec_ref, w.z)
        )
    }

    pub fn percent(&self, value: f64) -> String {
        format!("{value:.2}%")
    }

    pub fn degrees(&self, value: f64) -> String {
        format!("{value:.6}°")
    }
}

/// Per-frame label for a variant, `None` when it has nothing to show or its
/// anchor does not project into the viewport.
pub(crate) fn build_label(
    variant: &dyn MeasurementVariant,
    fmt: &ValueFormatter<'_>,
    viewport: &Viewport,
    font_size: f32,
    pick_id: PickId,
    style: &GraphicStyle,
) -> Option<TextLabel> {
    let (world_anchor, view_anchor) = variant.label_anchor(viewport)?;
    let lines = variant.label_lines(fmt);
    if lines.is_empty() {
        return None;
    }
    Some(TextLabel {
        lines,
        world_anchor,
        view_anchor,
        font_size,
        pick_id: Some(pick_id),
        style: style.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::UnitsFormatter;

    #[test]
    fn test_identity_metadata_is_ignored() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let meta = DrawingMetadata::default();
        let fmt = ValueFormatter::new(&cache, &f, Some(&meta));
        assert!(!fmt.sheet_active());
        assert_eq!(fmt.length(&FormatterSpecRef::length(), 2.0), "2.00 m");
    }

    #[test]
    fn test_world_scale_applies_to_lengths_and_areas() {
        let cache = SpecCache::default();
        let f = UnitsFormatter::default();
        let meta = DrawingMetadata {
            origin: None,
            world_scale: Some(10.0),
        };
        let fmt = ValueFormatter::new(&cache, &f, Some(&meta));
        assert!(fmt.sheet_active());
        assert_eq!(fmt.length(&FormatterSpecRef::length(), 2.0), "20.00 m");
        assert_eq!(fmt.area(&FormatterSpecRef::area(), 2.0), "200.00 m²");
        assert_eq!(
            fmt.point(&FormatterSpecRef::coordinate(), DVec3::new(1.0, 2.0, 0.0)),
            "10.00 m, 20.00 m, 0.00 m"
        );
    }
}
