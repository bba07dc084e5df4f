use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, MarkerShape, Plot, PlotPoints, PlotUi, Points,
};

use crate::petab::PlotKind;
use crate::render::geometry::{
    bar_baseline, bars, dash_dot_segments, is_replicate, line_points, panel_bounds,
    replicate_points, scatter_points, simulation_line, Bounds,
};
use crate::render::layout::GridLayout;
use crate::render::subplot::SubplotContext;
use crate::state::ViewerState;

const TITLE_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Subplot grid (central panel)
// ---------------------------------------------------------------------------

/// Render the visible subplots on a square-root grid.
pub fn figure_grid(ui: &mut Ui, state: &ViewerState) {
    let contexts = state.visible_contexts();
    if contexts.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No subplots to show");
        });
        return;
    }

    let grid = GridLayout::for_subplots(contexts.len());
    let spacing = ui.spacing().item_spacing;
    let avail = ui.available_size();
    let cell = Vec2::new(
        (avail.x - spacing.x * (grid.cols as f32 - 1.0)) / grid.cols as f32,
        (avail.y - spacing.y * (grid.rows as f32 - 1.0)) / grid.rows as f32,
    );
    let marker = state.style.marker_size as f32;
    let line_width = state.style.line_width as f32;

    for row in 0..grid.rows {
        ui.horizontal(|ui: &mut Ui| {
            for col in 0..grid.cols {
                let idx = row * grid.cols + col;
                let Some(ctx) = contexts.get(idx) else {
                    break;
                };
                ui.vertical(|ui: &mut Ui| {
                    ui.set_width(cell.x);
                    ui.label(RichText::new(&ctx.title).strong());
                    subplot(ui, ctx, cell - Vec2::new(0.0, TITLE_HEIGHT), marker, line_width);
                });
            }
        });
    }
}

/// One subplot panel.
fn subplot(ui: &mut Ui, ctx: &SubplotContext, size: Vec2, marker: f32, line_width: f32) {
    let bounds = panel_bounds(ctx);
    let x_axis = ctx.x_axis.clone();
    let y_axis = ctx.y_axis.clone();

    let mut plot = Plot::new(format!("subplot_{}", ctx.id))
        .width(size.x.max(50.0))
        .height(size.y.max(50.0))
        .x_axis_label(ctx.x_axis.label.clone())
        .y_axis_label(ctx.y_axis.label.clone())
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            x_axis.tick_label(mark.value)
        })
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            y_axis.tick_label(mark.value)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .include_x(bounds.x.0)
        .include_x(bounds.x.1)
        .include_y(bounds.y.0)
        .include_y(bounds.y.1);

    if ctx.show_legend {
        plot = plot.legend(Legend::default());
    }
    if ctx.kind == PlotKind::Scatter {
        plot = plot.data_aspect(1.0);
    }

    plot.show(ui, |plot_ui| {
        match ctx.kind {
            PlotKind::Line => line_plot(plot_ui, ctx, bounds, marker, line_width),
            PlotKind::Bar => bar_plot(plot_ui, ctx, bounds),
            PlotKind::Scatter => scatter_plot(plot_ui, ctx, bounds, marker),
        }
    });
}

// ---------------------------------------------------------------------------
// Plot variants
// ---------------------------------------------------------------------------

fn error_bar(plot_ui: &mut PlotUi, x: f64, (low, high): (f64, f64), floor: f64, color: Color32) {
    let points: PlotPoints = vec![[x, low.max(floor)], [x, high]].into();
    plot_ui.line(Line::new(points).color(color).width(1.0));
}

fn line_plot(plot_ui: &mut PlotUi, ctx: &SubplotContext, bounds: Bounds, marker: f32, width: f32) {
    for series in &ctx.series {
        let color: Color32 = series.color.into();

        if is_replicate(series) {
            let points: PlotPoints = replicate_points(series)
                .into_iter()
                .map(|(x, y)| [x, y])
                .collect();
            plot_ui.points(
                Points::new(points)
                    .shape(MarkerShape::Cross)
                    .radius(marker + 1.0)
                    .color(color)
                    .name(&series.label),
            );
        } else {
            let points = line_points(series);
            let path: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

            // one legend entry: egui_plot merges items sharing a name
            for [a, b] in dash_dot_segments(&path, bounds) {
                let segment: PlotPoints = vec![[a.0, a.1], [b.0, b.1]].into();
                plot_ui.line(
                    Line::new(segment)
                        .color(color)
                        .width(width)
                        .name(&series.label),
                );
            }
            let markers: PlotPoints = path.iter().map(|&(x, y)| [x, y]).collect();
            plot_ui.points(
                Points::new(markers)
                    .shape(MarkerShape::Circle)
                    .radius(marker)
                    .filled(true)
                    .color(color)
                    .name(&series.label),
            );
            for p in &points {
                if let Some(error) = p.error {
                    error_bar(plot_ui, p.x, error, bounds.y.0, color);
                }
            }
        }

        if series.has_simulation {
            let sim: Vec<[f64; 2]> = simulation_line(series)
                .into_iter()
                .map(|(x, y)| [x, y])
                .collect();
            let name = format!("{} simulation", series.label);
            plot_ui.line(
                Line::new(PlotPoints::from(sim.clone()))
                    .color(color)
                    .width(width)
                    .name(&name),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(sim))
                    .shape(MarkerShape::Circle)
                    .radius(marker)
                    .filled(true)
                    .color(color)
                    .name(&name),
            );
        }
    }
}

fn bar_plot(plot_ui: &mut PlotUi, ctx: &SubplotContext, bounds: Bounds) {
    let base = bar_baseline(ctx.y_axis.scale, bounds.y);
    let mut data_bars = Vec::new();
    let mut sim_bars = Vec::new();

    for bar in bars(ctx) {
        let color: Color32 = bar.color.into();
        let (x0, x1) = bar.span;
        let name = ctx
            .x_axis
            .categories
            .as_ref()
            .and_then(|c| c.get(bar.category))
            .cloned()
            .unwrap_or_default();

        data_bars.push(
            Bar::new((x0 + x1) / 2.0, bar.value - base)
                .base_offset(base)
                .width(x1 - x0)
                .fill(color)
                .stroke(Stroke::new(1.0, color))
                .name(&name),
        );
        if let Some(error) = bar.error {
            error_bar(plot_ui, (x0 + x1) / 2.0, error, bounds.y.0, Color32::BLACK);
        }
        if let Some(((s0, s1), sim)) = bar.simulation {
            sim_bars.push(
                Bar::new((s0 + s1) / 2.0, sim - base)
                    .base_offset(base)
                    .width(s1 - s0)
                    .fill(Color32::WHITE)
                    .stroke(Stroke::new(2.0, color))
                    .name(format!("{name} simulation")),
            );
        }
    }

    plot_ui.bar_chart(BarChart::new(data_bars));
    if !sim_bars.is_empty() {
        plot_ui.bar_chart(BarChart::new(sim_bars));
    }
}

fn scatter_plot(plot_ui: &mut PlotUi, ctx: &SubplotContext, bounds: Bounds, marker: f32) {
    // prepare_subplot rejects scatter panels without simulation
    let Ok(pairs) = scatter_points(ctx) else {
        return;
    };

    let diagonal: PlotPoints = vec![[bounds.x.0, bounds.y.0], [bounds.x.1, bounds.y.1]].into();
    plot_ui.line(Line::new(diagonal).color(Color32::GRAY).width(1.0));

    for (series, points) in pairs {
        let color: Color32 = series.color.into();
        let points: PlotPoints = points.into_iter().map(|(x, y)| [x, y]).collect();
        plot_ui.points(
            Points::new(points)
                .shape(MarkerShape::Circle)
                .radius(marker + 1.0)
                .filled(true)
                .color(color)
                .name(&series.label),
        );
    }
}
