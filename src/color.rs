use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{FromColor, Hsl, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Hue of the first category; later ones step around the wheel by the golden angle.
const FIRST_HUE: f32 = 210.0;
const GOLDEN_ANGLE: f32 = 137.508;

/// `n` distinct colours. A palette for `n` categories starts with the
/// palette for fewer, so a category keeps its colour as others are added.
/// Lightness alternates so neighbouring pie slices stay apart.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (FIRST_HUE + i as f32 * GOLDEN_ANGLE) % 360.0;
            let lightness = if i % 2 == 0 { 0.5 } else { 0.62 };
            let rgb: Srgb<u8> = Srgb::<f32>::from_color(Hsl::new(hue, 0.7, lightness)).into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Stable colour per category (vehicle type), shared by every chart so the
/// same category keeps its colour across reports.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let palette = generate_palette(categories.len());
        let mapping = categories.iter().cloned().zip(palette).collect();
        ColorMap { mapping }
    }

    /// Colour for `category`, or `fallback` if it was not known at construction.
    pub fn color_for(&self, category: &str, fallback: Color32) -> Color32 {
        self.mapping.get(category).copied().unwrap_or(fallback)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}
