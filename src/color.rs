use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Dataset, Field, Value};

/// Single-series charts (bars, lines, scatter).
pub const SERIES_COLOR: Color32 = Color32::from_rgb(0x00, 0x83, 0xB8);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a categorical field to distinct colours.
///
/// Built from the whole dataset, not the filtered view, so a category keeps
/// its colour while the user filters.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the distinct values of one field.
    pub fn new(unique_values: &BTreeSet<Value>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<Value, Color32> = unique_values
            .iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

/// One colour map per categorical field of `dataset`.
pub fn category_colors(dataset: &Dataset) -> BTreeMap<Field, ColorMap> {
    dataset
        .unique_values
        .iter()
        .map(|(field, values)| (*field, ColorMap::new(values)))
        .collect()
}
