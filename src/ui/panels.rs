use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::petab::PlotKind;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – subplot list
// ---------------------------------------------------------------------------

/// Render the left panel: one checkbox per subplot plus its series.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Subplots");
    ui.separator();

    if state.contexts.is_empty() {
        ui.label("Figure has no subplots.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (ctx, shown) in state.contexts.iter().zip(state.visible.iter_mut()) {
                let kind = match ctx.kind {
                    PlotKind::Line => "line",
                    PlotKind::Bar => "bar",
                    PlotKind::Scatter => "scatter",
                };
                let header = format!("{}  ({kind}, {} series)", ctx.id, ctx.series.len());
                ui.checkbox(shown, RichText::new(header).strong());

                ui.indent(&ctx.id, |ui: &mut Ui| {
                    for series in &ctx.series {
                        let color: Color32 = series.color.into();
                        ui.label(RichText::new(&series.label).color(color));
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let shown = state.visible.iter().filter(|v| **v).count();
        ui.label(format!(
            "{} subplots, {} visible",
            state.contexts.len(),
            shown
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut ViewerState) {
    let file = rfd::FileDialog::new()
        .set_title("Export figure")
        .set_file_name("figure.png")
        .add_filter("PNG image", &["png"])
        .add_filter("SVG image", &["svg"])
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
