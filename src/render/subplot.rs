//! Per-subplot context: scales resolved, offsets applied, noise selected.
//!
//! Backends never read tables; each draw routine receives a
//! [`SubplotContext`] built here.

use crate::color::{generate_palette, SeriesColor};
use crate::error::{PlotError, Result};
use crate::figure::{DataSeries, SinglePlot};
use crate::petab::aggregate::DataPoint;
use crate::petab::{AxisScale, PlotKind, PlotTypeData};

use super::scale::{format_number, shared_ordinal_axis, tick_label, to_axis, with_offset};

/// A resolved axis: scale, label, and fixed ticks for ordinal axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub scale: AxisScale,
    pub label: String,
    /// Tick labels at integer positions `0..n` (ordinal and bar axes).
    pub categories: Option<Vec<String>>,
}

impl AxisSpec {
    fn new(scale: AxisScale, label: &str) -> Self {
        AxisSpec {
            scale,
            label: label.to_string(),
            categories: None,
        }
    }

    /// Label for an axis-space tick value.
    pub fn tick_label(&self, value: f64) -> String {
        match &self.categories {
            Some(labels) => {
                let idx = value.round();
                if (value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels.get(idx as usize).cloned().unwrap_or_default()
            }
            None => tick_label(self.scale, value),
        }
    }
}

/// One condition point of a series, in axis space.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoint {
    /// Raw condition value (for category labels).
    pub condition: f64,
    /// Axis-space x, offset applied. `None` if not representable.
    pub x: Option<f64>,
    /// Axis-space mean, offset applied.
    pub mean: Option<f64>,
    /// Axis-space lower/upper error-bar ends, if the series draws noise.
    pub error: Option<(f64, f64)>,
    /// Axis-space replicates, offset applied.
    pub repl: Vec<f64>,
    /// Axis-space simulated value, offset applied.
    pub sim: Option<f64>,
}

/// A series ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesContext {
    pub label: String,
    pub color: SeriesColor,
    pub mode: PlotTypeData,
    pub points: Vec<PreparedPoint>,
    /// Whether simulated values exist for every point.
    pub has_simulation: bool,
}

/// Everything a backend needs to draw one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SubplotContext {
    pub id: String,
    pub title: String,
    pub kind: PlotKind,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub show_legend: bool,
    pub series: Vec<SeriesContext>,
}

impl SubplotContext {
    /// Whether every series carries simulation data.
    pub fn has_simulation(&self) -> bool {
        !self.series.is_empty() && self.series.iter().all(|s| s.has_simulation)
    }
}

/// Column used for error bars; `None` for replicate mode or when provided
/// noise is absent.
pub fn noise_value(point: &DataPoint, mode: PlotTypeData) -> Option<f64> {
    match mode {
        PlotTypeData::MeanAndSd => Some(point.sd),
        PlotTypeData::MeanAndSem => Some(point.sem),
        PlotTypeData::Provided => point.noise_model,
        PlotTypeData::Replicate => None,
    }
}

/// Build the draw context of one subplot.
pub fn prepare_subplot(plot: &SinglePlot) -> Result<SubplotContext> {
    let panel = plot.panel();
    let kind = plot.kind();
    let palette = generate_palette(panel.series.len());

    // scatter plots mean against simulation, both on the y scale
    let x_scale = match kind {
        PlotKind::Scatter => panel.y_scale,
        _ => panel.x_scale,
    };
    let mut x_axis = AxisSpec::new(x_scale, &panel.x_label);
    let y_axis = AxisSpec::new(panel.y_scale, &panel.y_label);

    let ranks = if panel.x_scale == AxisScale::Order && kind == PlotKind::Line {
        let conditions: Vec<Vec<f64>> = panel.series.iter().map(|s| s.data.conditions()).collect();
        let shared = shared_ordinal_axis(&conditions)?;
        x_axis.categories = Some(shared.labels);
        shared.positions
    } else {
        Vec::new()
    };

    let mut series = Vec::with_capacity(panel.series.len());
    for (i, (data_series, color)) in panel.series.iter().zip(palette).enumerate() {
        let ranks = ranks.get(i).map(Vec::as_slice);
        series.push(prepare_series(data_series, color, ranks, panel.x_scale, y_axis.scale));
    }

    if kind == PlotKind::Bar {
        x_axis.scale = AxisScale::Linear;
        x_axis.categories = Some(bar_category_labels(&series));
    }

    let ctx = SubplotContext {
        id: panel.id.clone(),
        title: panel.title.clone(),
        kind,
        x_axis,
        y_axis,
        show_legend: kind != PlotKind::Bar,
        series,
    };
    if kind == PlotKind::Scatter && !ctx.has_simulation() {
        return Err(PlotError::ScatterWithoutSimulation { plot_id: ctx.id });
    }
    Ok(ctx)
}

/// `ranks` replaces the condition values on an ordinal axis.
fn prepare_series(
    data_series: &DataSeries,
    color: SeriesColor,
    ranks: Option<&[f64]>,
    x_scale: AxisScale,
    y_scale: AxisScale,
) -> SeriesContext {
    let vis = &data_series.vis;
    let points = &data_series.data.points;
    let conditions = data_series.data.conditions();

    let x_data = with_offset(ranks.unwrap_or(&conditions), vis.x_offset);

    // y: offset mean, replicates and simulation into new values
    let means = with_offset(&data_series.data.means(), vis.y_offset);

    let mut dropped = 0usize;
    let prepared: Vec<PreparedPoint> = points
        .iter()
        .zip(x_data.iter().zip(&means))
        .map(|(point, (&x, &mean))| {
            let error = noise_value(point, vis.plot_type_data).and_then(|noise| {
                let high = to_axis(y_scale, mean + noise)?;
                let low = to_axis(y_scale, mean - noise).unwrap_or(f64::NEG_INFINITY);
                Some((low, high))
            });
            let repl: Vec<f64> = with_offset(&point.repl, vis.y_offset)
                .into_iter()
                .filter_map(|v| to_axis(y_scale, v))
                .collect();
            let prepared = PreparedPoint {
                condition: point.x,
                x: to_axis(x_scale, x),
                mean: to_axis(y_scale, mean),
                error,
                repl,
                sim: point.sim.and_then(|s| to_axis(y_scale, s + vis.y_offset)),
            };
            if prepared.x.is_none() || prepared.mean.is_none() {
                dropped += 1;
            }
            prepared
        })
        .collect();

    if dropped > 0 {
        log::warn!(
            "plot '{}', series '{}': {} point(s) not representable on a logarithmic axis",
            vis.plot_id,
            vis.legend_entry,
            dropped
        );
    }

    SeriesContext {
        label: vis.legend_entry.clone(),
        color,
        mode: vis.plot_type_data,
        has_simulation: data_series.data.has_simulation(),
        points: prepared,
    }
}

/// One category per (series, condition point); the condition is appended
/// when a series has several points.
pub fn bar_category_labels(series: &[SeriesContext]) -> Vec<String> {
    series
        .iter()
        .flat_map(|s| {
            let many = s.points.len() > 1;
            s.points.iter().map(move |p| {
                if many {
                    format!("{} ({})", s.label, format_number(p.condition))
                } else {
                    s.label.clone()
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Panel;
    use crate::petab::aggregate::DataToPlot;
    use crate::petab::vis_spec::VisSpecRow;

    fn point(x: f64, mean: f64, sd: f64, sim: Option<f64>) -> DataPoint {
        DataPoint {
            x,
            mean,
            sd,
            sem: sd / 2.0,
            noise_model: None,
            repl: vec![mean - 1.0, mean + 1.0],
            sim,
        }
    }

    fn plot(kind: PlotKind, row: VisSpecRow, points: Vec<DataPoint>) -> SinglePlot {
        let mut panel = Panel::from_row(&row);
        panel.add_series(row, DataToPlot { points });
        SinglePlot::new(kind, panel)
    }

    #[test]
    fn y_offset_shifts_mean_replicates_and_simulation() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.y_offset = 5.0;
        let points = vec![
            point(0.0, 1.0, 0.5, Some(1.5)),
            point(1.0, 2.0, 0.5, Some(2.5)),
            point(2.0, 3.0, 0.5, Some(3.5)),
        ];
        let ctx = prepare_subplot(&plot(PlotKind::Line, row, points)).unwrap();
        let means: Vec<f64> = ctx.series[0].points.iter().map(|p| p.mean.unwrap()).collect();
        assert_eq!(means, vec![6.0, 7.0, 8.0]);
        assert_eq!(ctx.series[0].points[0].error, Some((5.5, 6.5)));
        assert_eq!(ctx.series[0].points[0].repl, vec![5.0, 7.0]);
        assert_eq!(ctx.series[0].points[2].sim, Some(8.5));
        assert!(ctx.show_legend);
    }

    #[test]
    fn noise_column_follows_plot_type_data() {
        let p = DataPoint {
            noise_model: Some(0.7),
            ..point(0.0, 1.0, 0.4, None)
        };
        assert_eq!(noise_value(&p, PlotTypeData::MeanAndSd), Some(0.4));
        assert_eq!(noise_value(&p, PlotTypeData::MeanAndSem), Some(0.2));
        assert_eq!(noise_value(&p, PlotTypeData::Provided), Some(0.7));
        assert_eq!(noise_value(&p, PlotTypeData::Replicate), None);
    }

    #[test]
    fn ordinal_x_uses_ranks_plus_offset() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.x_scale = AxisScale::Order;
        row.x_offset = 0.5;
        let points = vec![point(8.0, 1.0, 0.0, None), point(4.0, 1.0, 0.0, None)];
        let ctx = prepare_subplot(&plot(PlotKind::Line, row, points)).unwrap();
        let xs: Vec<f64> = ctx.series[0].points.iter().map(|p| p.x.unwrap()).collect();
        assert_eq!(xs, vec![1.5, 0.5]);
        assert_eq!(ctx.x_axis.tick_label(0.0), "4");
        assert_eq!(ctx.x_axis.tick_label(1.0), "8");
        assert_eq!(ctx.x_axis.tick_label(0.5), "");
    }

    #[test]
    fn ordinal_series_share_one_axis() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.x_scale = AxisScale::Order;
        let mut panel = Panel::from_row(&row);
        panel.add_series(
            row.clone(),
            DataToPlot {
                points: vec![
                    point(1.0, 1.0, 0.0, None),
                    point(2.0, 1.0, 0.0, None),
                    point(4.0, 1.0, 0.0, None),
                ],
            },
        );
        panel.add_series(
            row,
            DataToPlot {
                points: vec![point(1.0, 2.0, 0.0, None), point(4.0, 2.0, 0.0, None)],
            },
        );
        let ctx = prepare_subplot(&SinglePlot::new(PlotKind::Line, panel)).unwrap();

        let xs: Vec<f64> = ctx.series[1].points.iter().map(|p| p.x.unwrap()).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(ctx.x_axis.tick_label(2.0), "4");
    }

    #[test]
    fn scatter_ticks_follow_the_y_scale() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.y_scale = AxisScale::Log10;
        let points = vec![point(0.0, 100.0, 0.0, Some(1000.0))];
        let ctx = prepare_subplot(&plot(PlotKind::Scatter, row, points)).unwrap();

        assert_eq!(ctx.series[0].points[0].mean, Some(2.0));
        assert_eq!(ctx.series[0].points[0].sim, Some(3.0));
        assert_eq!(ctx.x_axis.scale, AxisScale::Log10);
        assert_eq!(ctx.x_axis.tick_label(2.0), "10^2");
        assert_eq!(ctx.y_axis.tick_label(2.0), "10^2");
    }

    #[test]
    fn non_monotonic_ordinal_aborts() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.x_scale = AxisScale::Order;
        let points = vec![
            point(1.0, 1.0, 0.0, None),
            point(3.0, 1.0, 0.0, None),
            point(2.0, 1.0, 0.0, None),
        ];
        assert!(prepare_subplot(&plot(PlotKind::Line, row, points)).is_err());
    }

    #[test]
    fn log_axis_drops_non_positive_means() {
        let mut row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        row.y_scale = AxisScale::Log10;
        let points = vec![point(0.0, 100.0, 0.0, None), point(1.0, -1.0, 0.0, None)];
        let ctx = prepare_subplot(&plot(PlotKind::Line, row, points)).unwrap();
        assert_eq!(ctx.series[0].points[0].mean, Some(2.0));
        assert_eq!(ctx.series[0].points[1].mean, None);
    }

    #[test]
    fn scatter_without_simulation_is_rejected() {
        let row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        let points = vec![point(0.0, 1.0, 0.1, None)];
        let err = prepare_subplot(&plot(PlotKind::Scatter, row, points)).unwrap_err();
        assert!(matches!(err, PlotError::ScatterWithoutSimulation { .. }));
    }

    #[test]
    fn bar_plots_hide_legend_and_label_categories() {
        let row = VisSpecRow::new("p1", PlotTypeData::MeanAndSd);
        let points = vec![point(0.0, 1.0, 0.1, None), point(2.0, 1.0, 0.1, None)];
        let ctx = prepare_subplot(&plot(PlotKind::Bar, row, points)).unwrap();
        assert!(!ctx.show_legend);
        assert_eq!(ctx.x_axis.tick_label(1.0), "p1 (2)");
    }
}
