//! Rendering: shared layout/scale/subplot logic plus pluggable backends.
//!
//! ```text
//!   Figure ──► prepare_figure ──► Vec<SubplotContext>
//!                                      │
//!                    ┌─────────────────┴─────────────────┐
//!                    ▼                                   ▼
//!             bitmap (plotters)                  ui (eframe + egui_plot)
//!             PNG / SVG file                     interactive window
//! ```
//!
//! Both backends size the grid with [`layout::GridLayout`] and draw each
//! panel with their own line / bar / scatter routines.

pub mod bitmap;
pub mod geometry;
pub mod layout;
pub mod scale;
pub mod subplot;

use std::path::PathBuf;

use crate::config::PlotStyle;
use crate::error::Result;
use crate::figure::Figure;

use subplot::{prepare_subplot, SubplotContext};

/// Where a figure goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Open an interactive window.
    Display,
    /// Write an image; the extension selects PNG or SVG.
    File(PathBuf),
}

/// A rendering engine able to assemble a whole figure.
pub trait FigureRenderer {
    fn render(&mut self, figure: &Figure, style: &PlotStyle) -> anyhow::Result<()>;
}

/// Draw contexts of every subplot, in figure order.
pub fn prepare_figure(figure: &Figure) -> Result<Vec<SubplotContext>> {
    figure.subplots.iter().map(prepare_subplot).collect()
}
