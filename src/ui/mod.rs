//! Interactive display backend: an eframe window drawing the subplot grid
//! with `egui_plot`.

pub mod panels;
pub mod plot;

use anyhow::{anyhow, Result};
use eframe::egui;

use crate::app::FigureViewer;
use crate::config::PlotStyle;
use crate::figure::Figure;
use crate::render::{prepare_figure, FigureRenderer};
use crate::state::ViewerState;

/// Opens the figure in a window and blocks until it is closed.
pub struct DisplayRenderer {
    title: String,
}

impl DisplayRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl Default for DisplayRenderer {
    fn default() -> Self {
        Self::new("PEtab visualization")
    }
}

impl FigureRenderer for DisplayRenderer {
    fn render(&mut self, figure: &Figure, style: &PlotStyle) -> Result<()> {
        let contexts = prepare_figure(figure)?;

        let (width, height) = style.pixel_size();
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width as f32 * 0.6, height as f32 * 0.6])
                .with_min_inner_size([600.0, 400.0]),
            ..Default::default()
        };

        let state = ViewerState::new(figure.clone(), contexts, style.clone());
        log::info!("Opening viewer with {} subplots", state.contexts.len());

        eframe::run_native(
            &self.title,
            options,
            Box::new(|_cc| Ok(Box::new(FigureViewer::new(state)))),
        )
        .map_err(|e| anyhow!("display backend failed: {e}"))
    }
}
