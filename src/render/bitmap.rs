//! Static figure backend on `plotters`: PNG through `BitMapBackend`, SVG
//! through `SVGBackend`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::config::PlotStyle;
use crate::figure::Figure;
use crate::petab::PlotKind;

use super::geometry::{
    bar_baseline, bars, dash_dot_segments, is_replicate, line_points, panel_bounds,
    replicate_points, scatter_points, simulation_line, Bounds,
};
use super::layout::GridLayout;
use super::subplot::SubplotContext;
use super::{prepare_figure, FigureRenderer};

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";

// ---------------------------------------------------------------------------
// File renderer
// ---------------------------------------------------------------------------

/// Writes a figure to an image file.
pub struct BitmapRenderer {
    path: PathBuf,
}

impl BitmapRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FigureRenderer for BitmapRenderer {
    fn render(&mut self, figure: &Figure, style: &PlotStyle) -> Result<()> {
        write_figure(figure, style, &self.path)
    }
}

/// Render `figure` into `path`; `.svg` selects vector output, anything else PNG.
pub fn write_figure(figure: &Figure, style: &PlotStyle, path: &Path) -> Result<()> {
    let contexts = prepare_figure(figure)?;
    let size = style.pixel_size();
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    let drawn = if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_figure(&root, &contexts, style)
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_figure(&root, &contexts, style)
    };
    drawn.with_context(|| format!("rendering figure to {}", path.display()))?;

    log::info!(
        "Figure with {} subplots written to {}",
        contexts.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Figure assembly
// ---------------------------------------------------------------------------

/// Split `root` into the subplot grid and draw each panel. Cells past the
/// last subplot stay blank.
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    contexts: &[SubplotContext],
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let grid = GridLayout::for_subplots(contexts.len());
    log::debug!("grid {}x{} for {} subplots", grid.rows, grid.cols, contexts.len());

    if grid.cells() > 0 {
        let cells = root.split_evenly((grid.rows, grid.cols));
        for (idx, ctx) in grid.used_cells().zip(contexts) {
            draw_subplot(&cells[idx], ctx, style)?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_subplot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    ctx: &SubplotContext,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let font_px = style.points_to_pixels(style.font_size as f64);
    let title_px = style.points_to_pixels(style.title_size as f64);
    let bounds = panel_bounds(ctx);

    let mut chart = ChartBuilder::on(area)
        .caption(ctx.title.as_str(), (FONT, title_px))
        .margin(10)
        .x_label_area_size((font_px * 3.0) as u32)
        .y_label_area_size((font_px * 5.0) as u32)
        .build_cartesian_2d(bounds.x.0..bounds.x.1, bounds.y.0..bounds.y.1)?;

    let x_fmt = |v: &f64| ctx.x_axis.tick_label(*v);
    let y_fmt = |v: &f64| ctx.y_axis.tick_label(*v);
    let x_labels = match &ctx.x_axis.categories {
        Some(categories) => categories.len().max(2),
        None => 8,
    };

    chart
        .configure_mesh()
        .x_desc(ctx.x_axis.label.as_str())
        .y_desc(ctx.y_axis.label.as_str())
        .x_labels(x_labels)
        .y_labels(6)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .label_style((FONT, font_px))
        .axis_desc_style((FONT, font_px))
        .light_line_style(WHITE.mix(0.0))
        .draw()?;

    match ctx.kind {
        PlotKind::Line => draw_line_plot(&mut chart, ctx, bounds, style)?,
        PlotKind::Bar => draw_bar_plot(&mut chart, ctx, bounds, style)?,
        PlotKind::Scatter => draw_scatter_plot(&mut chart, ctx, bounds, style)?,
    }

    if ctx.show_legend && !ctx.series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, font_px))
            .draw()?;
    }
    Ok(())
}

fn cap_width(style: &PlotStyle) -> u32 {
    (style.points_to_pixels(style.error_cap_size) * 2.0).round() as u32
}

// ---------------------------------------------------------------------------
// Plot variants
// ---------------------------------------------------------------------------

fn draw_line_plot<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    ctx: &SubplotContext,
    bounds: Bounds,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let marker = style.marker_size;
    let line_width = style.line_width;
    let cap = cap_width(style);

    for series in &ctx.series {
        let color: RGBColor = series.color.into();

        if is_replicate(series) {
            chart
                .draw_series(
                    replicate_points(series)
                        .into_iter()
                        .map(|(x, y)| Cross::new((x, y), marker + 1, color.stroke_width(1))),
                )?
                .label(series.label.as_str())
                .legend(move |(x, y)| Cross::new((x + 10, y), marker + 1, color.stroke_width(1)));
        } else {
            let points = line_points(series);
            let path: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();

            chart
                .draw_series(
                    dash_dot_segments(&path, bounds)
                        .into_iter()
                        .map(|segment| PathElement::new(segment, color.stroke_width(line_width))),
                )?
                .label(series.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(line_width))
                });
            chart.draw_series(
                path.iter()
                    .map(|&(x, y)| Circle::new((x, y), marker.saturating_sub(1).max(1), color.filled())),
            )?;
            chart.draw_series(points.iter().filter_map(|p| {
                let (low, high) = p.error?;
                Some(ErrorBar::new_vertical(
                    p.x,
                    low.max(bounds.y.0),
                    p.y,
                    high,
                    color.stroke_width(1),
                    cap,
                ))
            }))?;
        }

        if series.has_simulation {
            let sim = simulation_line(series);
            chart
                .draw_series(LineSeries::new(
                    sim.iter().copied(),
                    color.stroke_width(line_width),
                ))?
                .label(format!("{} simulation", series.label))
                .legend(move |(x, y)| Circle::new((x + 10, y), marker, color.filled()));
            chart.draw_series(
                sim.iter()
                    .map(|&(x, y)| Circle::new((x, y), marker, color.filled())),
            )?;
        }
    }
    Ok(())
}

fn draw_bar_plot<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    ctx: &SubplotContext,
    bounds: Bounds,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let base = bar_baseline(ctx.y_axis.scale, bounds.y);
    let cap = cap_width(style);

    for bar in bars(ctx) {
        let color: RGBColor = bar.color.into();
        let (x0, x1) = bar.span;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x0, base), (x1, bar.value)],
            color.filled(),
        )))?;

        if let Some((low, high)) = bar.error {
            chart.draw_series(std::iter::once(ErrorBar::new_vertical(
                (x0 + x1) / 2.0,
                low.max(bounds.y.0),
                bar.value,
                high,
                BLACK.stroke_width(1),
                cap,
            )))?;
        }

        if let Some(((s0, s1), sim)) = bar.simulation {
            chart.draw_series([
                Rectangle::new([(s0, base), (s1, sim)], WHITE.filled()),
                Rectangle::new([(s0, base), (s1, sim)], color.stroke_width(2)),
            ])?;
        }
    }
    Ok(())
}

fn draw_scatter_plot<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    ctx: &SubplotContext,
    bounds: Bounds,
    style: &PlotStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let pairs = scatter_points(ctx)?;
    let marker = style.marker_size;

    // y = x: perfect agreement between data and simulation
    chart.draw_series(LineSeries::new(
        [(bounds.x.0, bounds.y.0), (bounds.x.1, bounds.y.1)],
        BLACK.mix(0.3).stroke_width(1),
    ))?;

    for (series, points) in pairs {
        let color: RGBColor = series.color.into();
        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|(x, y)| Circle::new((x, y), marker + 1, color.filled())),
            )?
            .label(series.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), marker + 1, color.filled()));
    }
    Ok(())
}
