//! Backend-independent geometry of the three plot variants: sorted line
//! points, bar slots, scatter pairs and fitted axis ranges.

use crate::color::SeriesColor;
use crate::error::{PlotError, Result};
use crate::petab::{AxisScale, PlotKind, PlotTypeData};

use super::subplot::{SeriesContext, SubplotContext};

/// Width of a bar when no simulation bar shares its slot.
pub const BAR_WIDTH: f64 = 2.0 / 3.0;
/// Width of each half of a data/simulation bar pair.
pub const PAIRED_BAR_WIDTH: f64 = 1.0 / 3.0;

/// Relative padding added around fitted ranges.
const MARGIN: f64 = 0.05;

/// A point of an aggregated line with its error bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    pub error: Option<(f64, f64)>,
}

/// Aggregated means sorted by ascending condition.
pub fn line_points(series: &SeriesContext) -> Vec<LinePoint> {
    let mut points: Vec<LinePoint> = series
        .points
        .iter()
        .filter_map(|p| {
            Some(LinePoint {
                x: p.x?,
                y: p.mean?,
                error: p.error,
            })
        })
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    points
}

/// Dash, gap, dot, gap of the measured-data line, as fractions of the
/// panel normalised to a unit square.
const DASH_DOT: [(bool, f64); 4] = [(true, 0.04), (false, 0.015), (true, 0.006), (false, 0.015)];

/// Visible pieces of a polyline drawn dash-dot. The pattern carries over
/// vertices, so it reads the same whatever the point spacing.
pub fn dash_dot_segments(path: &[(f64, f64)], bounds: Bounds) -> Vec<[(f64, f64); 2]> {
    let sx = (bounds.x.1 - bounds.x.0).abs().max(f64::MIN_POSITIVE);
    let sy = (bounds.y.1 - bounds.y.0).abs().max(f64::MIN_POSITIVE);
    let lerp = |a: (f64, f64), b: (f64, f64), t: f64| (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);

    let mut out = Vec::new();
    let mut phase = 0;
    let mut left = DASH_DOT[0].1;
    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = (((b.0 - a.0) / sx).powi(2) + ((b.1 - a.1) / sy).powi(2)).sqrt();
        if !len.is_finite() || len == 0.0 {
            continue;
        }
        let mut t = 0.0;
        while len - t > 1e-12 {
            let step = left.min(len - t);
            if DASH_DOT[phase].0 {
                out.push([lerp(a, b, t / len), lerp(a, b, (t + step) / len)]);
            }
            t += step;
            left -= step;
            if left <= 1e-12 {
                phase = (phase + 1) % DASH_DOT.len();
                left = DASH_DOT[phase].1;
            }
        }
    }
    out
}

/// Every replicate as an unconnected marker.
pub fn replicate_points(series: &SeriesContext) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .filter_map(|p| Some((p.x?, &p.repl)))
        .flat_map(|(x, repl)| repl.iter().map(move |&y| (x, y)))
        .collect()
}

/// Simulated values sorted by ascending condition.
pub fn simulation_line(series: &SeriesContext) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter_map(|p| Some((p.x?, p.sim?)))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}

/// Whether a series is drawn as raw replicates.
pub fn is_replicate(series: &SeriesContext) -> bool {
    series.mode == PlotTypeData::Replicate
}

/// Horizontal extent of the data bar and (if paired) simulation bar in
/// category slot `index`.
pub fn bar_span(index: usize, paired: bool) -> ((f64, f64), Option<(f64, f64)>) {
    let center = index as f64;
    if paired {
        (
            (center - PAIRED_BAR_WIDTH, center),
            Some((center, center + PAIRED_BAR_WIDTH)),
        )
    } else {
        ((center - BAR_WIDTH / 2.0, center + BAR_WIDTH / 2.0), None)
    }
}

/// One data bar with its optional simulation partner.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: usize,
    pub color: SeriesColor,
    pub span: (f64, f64),
    pub value: f64,
    pub error: Option<(f64, f64)>,
    /// Span and value of the hollow simulation bar.
    pub simulation: Option<((f64, f64), f64)>,
}

/// Bars of a bar plot, one per (series, condition point) category.
pub fn bars(ctx: &SubplotContext) -> Vec<Bar> {
    let paired = ctx.has_simulation();
    let mut out = Vec::new();
    let mut category = 0usize;
    for series in &ctx.series {
        for point in &series.points {
            let (span, sim_span) = bar_span(category, paired);
            if let Some(value) = point.mean {
                out.push(Bar {
                    category,
                    color: series.color,
                    span,
                    value,
                    error: point.error,
                    simulation: sim_span.zip(point.sim),
                });
            }
            category += 1;
        }
    }
    out
}

/// Bottom edge of bars: zero on linear axes, the lower axis bound on
/// logarithmic axes.
pub fn bar_baseline(scale: AxisScale, y_range: (f64, f64)) -> f64 {
    match scale {
        AxisScale::Linear | AxisScale::Order => 0.0,
        AxisScale::Log10 | AxisScale::Ln => y_range.0,
    }
}

/// (measured mean, simulated value) pairs per series.
pub fn scatter_points(ctx: &SubplotContext) -> Result<Vec<(&SeriesContext, Vec<(f64, f64)>)>> {
    if !ctx.has_simulation() {
        return Err(PlotError::ScatterWithoutSimulation {
            plot_id: ctx.id.clone(),
        });
    }
    Ok(ctx
        .series
        .iter()
        .map(|s| {
            let pairs = s
                .points
                .iter()
                .filter_map(|p| Some((p.mean?, p.sim?)))
                .collect();
            (s, pairs)
        })
        .collect())
}

/// Axis ranges of a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// Fit ranges to every value a panel draws.
pub fn panel_bounds(ctx: &SubplotContext) -> Bounds {
    match ctx.kind {
        PlotKind::Line => {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for series in &ctx.series {
                for p in &series.points {
                    let Some(x) = p.x else { continue };
                    xs.push(x);
                    if is_replicate(series) {
                        ys.extend(p.repl.iter().copied());
                    } else {
                        ys.extend(p.mean);
                        if let Some((low, high)) = p.error {
                            ys.push(low);
                            ys.push(high);
                        }
                    }
                    ys.extend(p.sim);
                }
            }
            Bounds {
                x: fit_range(xs),
                y: fit_range(ys),
            }
        }
        PlotKind::Bar => {
            let all = bars(ctx);
            let categories: usize = ctx.series.iter().map(|s| s.points.len()).sum();
            let mut ys: Vec<f64> = Vec::new();
            for bar in &all {
                ys.push(bar.value);
                if let Some((low, high)) = bar.error {
                    ys.push(low);
                    ys.push(high);
                }
                if let Some((_, sim)) = bar.simulation {
                    ys.push(sim);
                }
            }
            if matches!(ctx.y_axis.scale, AxisScale::Linear | AxisScale::Order) {
                ys.push(0.0);
            }
            Bounds {
                x: (-0.5, categories.max(1) as f64 - 0.5),
                y: fit_range(ys),
            }
        }
        PlotKind::Scatter => {
            let values = ctx
                .series
                .iter()
                .flat_map(|s| s.points.iter())
                .flat_map(|p| p.mean.into_iter().chain(p.sim));
            let range = square_range(values);
            Bounds { x: range, y: range }
        }
    }
}

/// One range covering every value, for both axes of a scatter plot.
pub fn square_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    fit_range(values)
}

/// Min/max of the finite values with a small margin. Degenerate inputs
/// still produce a non-empty range.
pub fn fit_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = if min.abs() > f64::EPSILON { min.abs() * 0.1 } else { 0.5 };
        return (min - pad, max + pad);
    }
    (min - span * MARGIN, max + span * MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::subplot::{AxisSpec, PreparedPoint};

    #[test]
    fn dash_dot_alternates_dashes_and_dots() {
        let bounds = Bounds {
            x: (0.0, 1.0),
            y: (0.0, 10.0),
        };
        let segments = dash_dot_segments(&[(0.0, 0.0), (0.2, 0.0)], bounds);
        let lengths: Vec<f64> = segments.iter().map(|[a, b]| b.0 - a.0).collect();

        assert!((lengths[0] - 0.04).abs() < 1e-9);
        assert!((lengths[1] - 0.006).abs() < 1e-9);
        assert!((lengths[2] - 0.04).abs() < 1e-9);
        assert!((segments[1][0].0 - 0.055).abs() < 1e-9);
    }

    #[test]
    fn dash_dot_continues_across_vertices() {
        let bounds = Bounds {
            x: (0.0, 1.0),
            y: (0.0, 1.0),
        };
        let segments = dash_dot_segments(&[(0.0, 0.0), (0.02, 0.0), (0.1, 0.0)], bounds);
        // the first dash is split at the vertex
        assert_eq!(segments[0], [(0.0, 0.0), (0.02, 0.0)]);
        assert!((segments[1][1].0 - 0.04).abs() < 1e-9);
        assert!(dash_dot_segments(&[(0.5, 0.5)], bounds).is_empty());
    }

    fn prepared(x: f64, mean: f64, sim: Option<f64>) -> PreparedPoint {
        PreparedPoint {
            condition: x,
            x: Some(x),
            mean: Some(mean),
            error: Some((mean - 0.5, mean + 0.5)),
            repl: vec![mean - 1.0, mean + 1.0],
            sim,
        }
    }

    fn series(label: &str, points: Vec<PreparedPoint>) -> SeriesContext {
        SeriesContext {
            label: label.to_string(),
            color: SeriesColor::GRAY,
            mode: PlotTypeData::MeanAndSd,
            has_simulation: points.iter().all(|p| p.sim.is_some()),
            points,
        }
    }

    fn context(kind: PlotKind, series: Vec<SeriesContext>) -> SubplotContext {
        SubplotContext {
            id: "p1".to_string(),
            title: "p1".to_string(),
            kind,
            x_axis: AxisSpec {
                scale: AxisScale::Linear,
                label: "time".to_string(),
                categories: None,
            },
            y_axis: AxisSpec {
                scale: AxisScale::Linear,
                label: "values".to_string(),
                categories: None,
            },
            show_legend: kind != PlotKind::Bar,
            series,
        }
    }

    #[test]
    fn line_points_are_sorted_by_condition() {
        let s = series(
            "a",
            vec![prepared(2.0, 3.0, Some(3.1)), prepared(0.0, 1.0, Some(1.1))],
        );
        let xs: Vec<f64> = line_points(&s).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(simulation_line(&s), vec![(0.0, 1.1), (2.0, 3.1)]);
        assert_eq!(replicate_points(&s).len(), 4);
    }

    #[test]
    fn single_bars_are_centred_two_thirds_wide() {
        let ((x0, x1), sim) = bar_span(2, false);
        assert!((x1 - x0 - 2.0 / 3.0).abs() < 1e-12);
        assert!(((x0 + x1) / 2.0 - 2.0).abs() < 1e-12);
        assert!(sim.is_none());
    }

    #[test]
    fn paired_bars_occupy_mirrored_thirds() {
        let ((d0, d1), sim) = bar_span(1, true);
        let (s0, s1) = sim.unwrap();
        assert!((d1 - d0 - 1.0 / 3.0).abs() < 1e-12);
        assert!((s1 - s0 - 1.0 / 3.0).abs() < 1e-12);
        assert!(d1 <= s0);
        assert!(((1.0 - d0) - (s1 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn bars_pair_only_with_simulation() {
        let ctx = context(PlotKind::Bar, vec![series("a", vec![prepared(0.0, 2.0, None)])]);
        let b = bars(&ctx);
        assert_eq!(b.len(), 1);
        assert!(b[0].simulation.is_none());

        let ctx = context(
            PlotKind::Bar,
            vec![
                series("a", vec![prepared(0.0, 2.0, Some(1.5))]),
                series("b", vec![prepared(0.0, 4.0, Some(3.5))]),
            ],
        );
        let b = bars(&ctx);
        assert_eq!(b[1].category, 1);
        assert_eq!(b[1].simulation, Some(((1.0, 1.0 + 1.0 / 3.0), 3.5)));
        let bounds = panel_bounds(&ctx);
        assert_eq!(bounds.x, (-0.5, 1.5));
        assert!(bounds.y.0 <= 0.0);
    }

    #[test]
    fn scatter_requires_simulation() {
        let ctx = context(PlotKind::Scatter, vec![series("a", vec![prepared(0.0, 2.0, None)])]);
        let err = scatter_points(&ctx).unwrap_err();
        assert!(matches!(err, PlotError::ScatterWithoutSimulation { .. }));
    }

    #[test]
    fn scatter_ranges_are_square() {
        let ctx = context(
            PlotKind::Scatter,
            vec![series("a", vec![prepared(0.0, 1.0, Some(5.0)), prepared(1.0, 2.0, Some(3.0))])],
        );
        let pairs = scatter_points(&ctx).unwrap();
        assert_eq!(pairs[0].1, vec![(1.0, 5.0), (2.0, 3.0)]);
        let bounds = panel_bounds(&ctx);
        assert_eq!(bounds.x, bounds.y);
        assert!(bounds.x.0 < 1.0 && bounds.x.1 > 5.0);
    }

    #[test]
    fn fit_range_handles_degenerate_input() {
        assert_eq!(fit_range(Vec::new()), (0.0, 1.0));
        assert_eq!(fit_range(vec![0.0]), (-0.5, 0.5));
        let (lo, hi) = fit_range(vec![f64::NEG_INFINITY, 2.0, 4.0]);
        assert!((lo - 1.9).abs() < 1e-12 && (hi - 4.1).abs() < 1e-12);
    }
}
