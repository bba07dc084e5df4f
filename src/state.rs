use std::path::Path;

use crate::config::PlotStyle;
use crate::figure::Figure;
use crate::render::bitmap::write_figure;
use crate::render::subplot::SubplotContext;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the figure window shows, independent of rendering.
pub struct ViewerState {
    /// The figure being displayed; exported as-is.
    pub figure: Figure,

    /// Prepared draw context of every subplot, in figure order.
    pub contexts: Vec<SubplotContext>,

    /// Per-subplot visibility toggled from the side panel.
    pub visible: Vec<bool>,

    /// Style used for export.
    pub style: PlotStyle,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(figure: Figure, contexts: Vec<SubplotContext>, style: PlotStyle) -> Self {
        let visible = vec![true; contexts.len()];
        Self {
            figure,
            contexts,
            visible,
            style,
            status_message: None,
        }
    }

    /// Contexts of the subplots currently shown, in figure order.
    pub fn visible_contexts(&self) -> Vec<&SubplotContext> {
        self.contexts
            .iter()
            .zip(&self.visible)
            .filter_map(|(ctx, &shown)| shown.then_some(ctx))
            .collect()
    }

    pub fn show_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = true);
    }

    pub fn hide_all(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
    }

    /// Write the whole figure through the file backend and report the
    /// outcome in the status line.
    pub fn export(&mut self, path: &Path) {
        match write_figure(&self.figure, &self.style, path) {
            Ok(()) => {
                self.status_message = Some(format!("Exported {}", path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::prepare_figure;

    fn state(n: usize) -> ViewerState {
        let figure = Figure::with_panels(n);
        let contexts = prepare_figure(&figure).unwrap();
        ViewerState::new(figure, contexts, PlotStyle::default())
    }

    #[test]
    fn hidden_subplots_leave_the_grid() {
        let mut s = state(3);
        assert_eq!(s.visible_contexts().len(), 3);
        s.visible[1] = false;
        let ids: Vec<&str> = s.visible_contexts().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["plot1", "plot3"]);
        s.hide_all();
        assert!(s.visible_contexts().is_empty());
        s.show_all();
        assert_eq!(s.visible_contexts().len(), 3);
    }

    #[test]
    fn export_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.svg");
        let mut s = state(2);
        s.export(&path);
        assert!(path.exists());
        assert!(s.status_message.unwrap().starts_with("Exported"));
    }
}
