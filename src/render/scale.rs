//! Axis-scale handling shared by every backend.
//!
//! Data are drawn in "axis space": logarithmic axes plot `log10(v)` or
//! `ln(v)` on a linear coordinate and relabel the ticks, ordinal axes plot
//! ranks. Offsets are added in data space, before the log transform.

use crate::error::{PlotError, Result};
use crate::petab::AxisScale;

/// Rank positions of monotonic condition values and the tick labels at
/// positions `0..labels.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalAxis {
    /// Position of each input value, in input order.
    pub positions: Vec<f64>,
    /// Label of tick `i`.
    pub labels: Vec<String>,
}

/// Replace strictly monotonic values by their ranks.
///
/// Increasing input keeps its order. Decreasing input is plotted right to
/// left: positions run `k-1 .. 0` and the tick labels are the reversed
/// values, so ticks still read small to large from the left.
pub fn ordinal_axis(values: &[f64]) -> Result<OrdinalAxis> {
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    let n = values.len();

    if increasing {
        Ok(OrdinalAxis {
            positions: (0..n).map(|i| i as f64).collect(),
            labels: values.iter().map(|v| format_number(*v)).collect(),
        })
    } else if decreasing {
        Ok(OrdinalAxis {
            positions: (0..n).rev().map(|i| i as f64).collect(),
            labels: values.iter().rev().map(|v| format_number(*v)).collect(),
        })
    } else {
        Err(PlotError::NonMonotonicConditions {
            values: values.to_vec(),
        })
    }
}

/// Ordinal ranks for every series of one panel on a single set of ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedOrdinalAxis {
    /// Positions of each series' values, in input order.
    pub positions: Vec<Vec<f64>>,
    /// Label of tick `i`.
    pub labels: Vec<String>,
}

/// Rank the condition values of several series against the sorted union of
/// all of them. Each series must itself be strictly monotonic.
pub fn shared_ordinal_axis(series: &[Vec<f64>]) -> Result<SharedOrdinalAxis> {
    for values in series {
        ordinal_axis(values)?;
    }

    let mut union: Vec<f64> = series.iter().flatten().copied().collect();
    union.sort_by(f64::total_cmp);
    union.dedup();
    let axis = ordinal_axis(&union)?;

    let positions = series
        .iter()
        .map(|values| {
            values
                .iter()
                .map(|v| {
                    union
                        .binary_search_by(|u| u.total_cmp(v))
                        .map_or(f64::NAN, |i| axis.positions[i])
                })
                .collect()
        })
        .collect();

    Ok(SharedOrdinalAxis {
        positions,
        labels: axis.labels,
    })
}

/// Map a data-space value to axis space. `None` when the value cannot be
/// shown on a logarithmic axis.
pub fn to_axis(scale: AxisScale, value: f64) -> Option<f64> {
    let mapped = match scale {
        AxisScale::Linear | AxisScale::Order => value,
        AxisScale::Log10 if value > 0.0 => value.log10(),
        AxisScale::Ln if value > 0.0 => value.ln(),
        AxisScale::Log10 | AxisScale::Ln => return None,
    };
    mapped.is_finite().then_some(mapped)
}

/// Add an additive offset, returning new values.
pub fn with_offset(values: &[f64], offset: f64) -> Vec<f64> {
    values.iter().map(|v| v + offset).collect()
}

/// Tick label for a base-e axis: the natural logarithm of the raw value,
/// rounded to an integer exponent.
pub fn natural_log_tick(raw: f64) -> String {
    let exponent = raw.ln().round() as i64;
    format!("e^{exponent}")
}

/// Tick label for a base-10 axis.
pub fn log10_tick(raw: f64) -> String {
    let exponent = raw.log10();
    if (exponent - exponent.round()).abs() < 1e-9 {
        format!("10^{}", exponent.round() as i64)
    } else {
        format_number(raw)
    }
}

/// Tick label for an axis-space value.
pub fn tick_label(scale: AxisScale, axis_value: f64) -> String {
    match scale {
        AxisScale::Linear | AxisScale::Order => format_number(axis_value),
        AxisScale::Log10 => log10_tick(10f64.powf(axis_value)),
        AxisScale::Ln => natural_log_tick(axis_value.exp()),
    }
}

/// Compact number formatting for tick and category labels.
pub fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else if v.abs() >= 1e4 || v.abs() < 1e-3 {
        format!("{v:.2e}")
    } else {
        let s = format!("{v:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_increasing() {
        let axis = ordinal_axis(&[1.0, 2.0, 4.0, 8.0]).unwrap();
        assert_eq!(axis.positions, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(axis.labels, vec!["1", "2", "4", "8"]);
    }

    #[test]
    fn shared_ordinal_ranks_against_union() {
        let axis = shared_ordinal_axis(&[vec![1.0, 2.0, 4.0], vec![4.0, 1.0]]).unwrap();
        assert_eq!(axis.labels, vec!["1", "2", "4"]);
        assert_eq!(axis.positions[0], vec![0.0, 1.0, 2.0]);
        assert_eq!(axis.positions[1], vec![2.0, 0.0]);
    }

    #[test]
    fn shared_ordinal_checks_each_series() {
        assert!(shared_ordinal_axis(&[vec![1.0, 2.0], vec![1.0, 4.0, 2.0]]).is_err());
    }

    #[test]
    fn ordinal_decreasing_is_reversed() {
        let axis = ordinal_axis(&[8.0, 4.0, 2.0, 1.0]).unwrap();
        assert_eq!(axis.positions, vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(axis.labels, vec!["1", "2", "4", "8"]);
    }

    #[test]
    fn ordinal_rejects_non_monotonic() {
        let err = ordinal_axis(&[1.0, 3.0, 2.0]).unwrap_err();
        assert!(matches!(err, PlotError::NonMonotonicConditions { .. }));
    }

    #[test]
    fn ordinal_rejects_repeated_values() {
        assert!(ordinal_axis(&[1.0, 1.0]).is_err());
        assert_eq!(ordinal_axis(&[5.0]).unwrap().positions, vec![0.0]);
    }

    #[test]
    fn natural_log_ticks() {
        assert_eq!(natural_log_tick(std::f64::consts::E.powi(2)), "e^2");
        assert_eq!(natural_log_tick(1.0), "e^0");
        assert_eq!(tick_label(AxisScale::Ln, -1.0), "e^-1");
    }

    #[test]
    fn log_axes_drop_non_positive_values() {
        assert_eq!(to_axis(AxisScale::Log10, 100.0), Some(2.0));
        assert_eq!(to_axis(AxisScale::Log10, 0.0), None);
        assert_eq!(to_axis(AxisScale::Ln, -1.0), None);
        assert_eq!(to_axis(AxisScale::Linear, -1.0), Some(-1.0));
        assert_eq!(tick_label(AxisScale::Log10, 3.0), "10^3");
    }

    #[test]
    fn offsets_return_new_values() {
        let means = vec![1.0, 2.0, 3.0];
        assert_eq!(with_offset(&means, 5.0), vec![6.0, 7.0, 8.0]);
        assert_eq!(means, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(12345.6), "1.23e4");
    }
}
