use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Backend-neutral 8-bit sRGB colour of one data series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SeriesColor {
    pub const GRAY: SeriesColor = SeriesColor {
        r: 128,
        g: 128,
        b: 128,
    };
}

impl From<SeriesColor> for Color32 {
    fn from(c: SeriesColor) -> Self {
        Color32::from_rgb(c.r, c.g, c.b)
    }
}

impl From<SeriesColor> for RGBColor {
    fn from(c: SeriesColor) -> Self {
        RGBColor(c.r, c.g, c.b)
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<SeriesColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Start at blue so single-series panels look conventional.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            SeriesColor {
                r: (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
                g: (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
                b: (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
            }
        })
        .collect()
}
