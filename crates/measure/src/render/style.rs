use std::collections::HashMap;

use egui::Color32;

/// Names of the styles every theme provides
pub mod well_known {
    pub const DEFAULT: &str = "default";
    pub const LOCKED: &str = "locked";
    pub const FADED: &str = "faded";
    pub const DYNAMIC: &str = "dynamic";
}

/// Line/fill/text appearance of one measurement graphic
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicStyle {
    pub name: String,
    pub line_color: Color32,
    pub fill_color: Color32,
    pub line_width: f32,
    /// Dash and gap lengths in pixels; solid when `None`
    pub dash: Option<(f32, f32)>,
    pub text_color: Color32,
    pub text_background: Color32,
}

impl GraphicStyle {
    fn named(name: &str, line: Color32, fill: Color32, width: f32) -> Self {
        Self {
            name: name.to_string(),
            line_color: line,
            fill_color: fill,
            line_width: width,
            dash: None,
            text_color: Color32::WHITE,
            text_background: Color32::from_rgba_unmultiplied(20, 20, 25, 200),
        }
    }

    pub fn with_dash(mut self, dash: f32, gap: f32) -> Self {
        self.dash = Some((dash, gap));
        self
    }
}

/// Style lookup by name. Unknown names resolve to `default`.
#[derive(Debug, Clone)]
pub struct StyleTheme {
    default: GraphicStyle,
    styles: HashMap<String, GraphicStyle>,
}

impl Default for StyleTheme {
    fn default() -> Self {
        let mut theme = Self {
            default: GraphicStyle::named(
                well_known::DEFAULT,
                Color32::from_rgb(255, 200, 50),
                Color32::from_rgba_unmultiplied(255, 200, 50, 60),
                2.0,
            ),
            styles: HashMap::new(),
        };
        theme.insert(GraphicStyle::named(
            well_known::LOCKED,
            Color32::from_rgb(150, 150, 160),
            Color32::from_rgba_unmultiplied(150, 150, 160, 50),
            2.0,
        ));
        theme.insert(
            GraphicStyle::named(
                well_known::FADED,
                Color32::from_rgba_unmultiplied(255, 200, 50, 120),
                Color32::TRANSPARENT,
                1.0,
            )
            .with_dash(6.0, 4.0),
        );
        theme.insert(
            GraphicStyle::named(
                well_known::DYNAMIC,
                Color32::from_rgb(0, 220, 255),
                Color32::from_rgba_unmultiplied(0, 220, 255, 40),
                1.5,
            )
            .with_dash(8.0, 4.0),
        );
        theme
    }
}

impl StyleTheme {
    /// Add or replace a style. Inserting `default` replaces the fallback.
    pub fn insert(&mut self, style: GraphicStyle) {
        if style.name == well_known::DEFAULT {
            self.default = style;
        } else {
            self.styles.insert(style.name.clone(), style);
        }
    }

    pub fn get(&self, name: &str) -> Option<&GraphicStyle> {
        if name == well_known::DEFAULT {
            Some(&self.default)
        } else {
            self.styles.get(name)
        }
    }

    pub fn resolve(&self, name: &str) -> &GraphicStyle {
        self.get(name).unwrap_or(&self.default)
    }
}
