//! Figure style settings, optionally loaded from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Global style defaults applied when a figure is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Base font size for tick labels, axis labels and legends (points).
    pub font_size: u32,
    /// Font size of subplot titles (points).
    pub title_size: u32,
    /// Figure width and height in inches.
    pub figure_size: [f64; 2],
    /// Pixels per inch for bitmap output.
    pub dpi: f64,
    /// Half-width of error-bar caps (points).
    pub error_cap_size: f64,
    /// Line width for data and simulation lines (pixels).
    pub line_width: u32,
    /// Marker radius (pixels).
    pub marker_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            font_size: 10,
            title_size: 10,
            figure_size: [20.0, 10.0],
            dpi: 100.0,
            error_cap_size: 2.0,
            line_width: 2,
            marker_size: 3,
        }
    }
}

impl PlotStyle {
    /// Read a style file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading style file {}", path.display()))?;
        serde_json::from_str(&text).context("parsing style JSON")
    }

    /// Figure size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.figure_size[0] * self.dpi).round() as u32,
            (self.figure_size[1] * self.dpi).round() as u32,
        )
    }

    /// Convert a size in points to pixels.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_figure_settings() {
        let style = PlotStyle::default();
        assert_eq!(style.pixel_size(), (2000, 1000));
        assert_eq!(style.font_size, 10);
        assert_eq!(style.error_cap_size, 2.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let style: PlotStyle = serde_json::from_str(r#"{ "font_size": 14, "dpi": 50 }"#).unwrap();
        assert_eq!(style.font_size, 14);
        assert_eq!(style.title_size, 10);
        assert_eq!(style.pixel_size(), (1000, 500));
    }
}
