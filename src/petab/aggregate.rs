//! Per-series measurement summary: the values a subplot actually draws.

use std::collections::BTreeSet;

use crate::data::filter::{filtered_indices, select_ids};
use crate::data::model::{CellValue, Table};
use crate::error::{PlotError, Result};

use super::vis_spec::VisSpecRow;
use super::{
    CONDITION_ID, DATASET_ID, MEASUREMENT, NOISE_PARAMETERS, OBSERVABLE_ID, SIMULATION,
    SIMULATION_CONDITION_ID, TIME,
};

/// Summary of all measurements sharing one condition value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Condition value on the x-axis (time or condition parameter).
    pub x: f64,
    pub mean: f64,
    /// Population standard deviation of the replicates.
    pub sd: f64,
    /// Standard error of the mean, `sd / sqrt(n)`.
    pub sem: f64,
    /// Mean of the numeric `noiseParameters`, if any were provided.
    pub noise_model: Option<f64>,
    pub repl: Vec<f64>,
    /// Mean simulated value for the same selection.
    pub sim: Option<f64>,
}

/// Everything one data series contributes to a subplot, in grouping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataToPlot {
    pub points: Vec<DataPoint>,
}

impl DataToPlot {
    pub fn has_simulation(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.sim.is_some())
    }

    pub fn conditions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn means(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.mean).collect()
    }
}

/// Grouping key of a measurement row.
#[derive(Debug, Clone, PartialEq)]
enum GroupKey {
    Time(f64),
    Condition(String),
}

/// Select the rows of `row`'s series, group them by condition and summarise.
///
/// Groups are ordered by ascending time, or by ascending condition id when
/// the x-axis is a condition parameter; that order is what ordinal scaling
/// checks for monotonicity.
pub fn data_to_plot(
    row: &VisSpecRow,
    conditions: &Table,
    measurements: &Table,
    simulation: Option<&Table>,
) -> Result<DataToPlot> {
    let indices = select_series(row, measurements);
    if indices.is_empty() {
        return Err(PlotError::missing_data(describe(row)));
    }

    let keys = indices
        .iter()
        .map(|&i| group_key(row, measurements, i))
        .collect::<Result<Vec<_>>>()?;
    let groups = ordered_groups(&keys);

    let sim_rows = match simulation {
        Some(sim) => {
            let idx = simulation_rows(row, measurements, &indices, sim);
            let keys = idx
                .iter()
                .map(|&i| group_key(row, sim, i))
                .collect::<Result<Vec<_>>>()?;
            Some((sim, idx, keys))
        }
        None => None,
    };

    let mut points = Vec::with_capacity(groups.len());
    for key in groups {
        let members: Vec<usize> = indices
            .iter()
            .zip(&keys)
            .filter(|(_, k)| **k == key)
            .map(|(&i, _)| i)
            .collect();

        let repl = members
            .iter()
            .map(|&i| measurements.f64_at(i, MEASUREMENT))
            .collect::<Result<Vec<_>>>()?;
        let (mean, sd) = mean_and_sd(&repl);
        let sem = sd / (repl.len() as f64).sqrt();

        let noise: Vec<f64> = members
            .iter()
            .filter_map(|&i| measurements.rows[i].get(NOISE_PARAMETERS))
            .filter_map(|cell| cell.as_f64())
            .collect();
        let noise_model = if noise.is_empty() {
            None
        } else {
            Some(mean_and_sd(&noise).0)
        };

        let sim = match &sim_rows {
            Some((table, idx, sim_keys)) => {
                let values = idx
                    .iter()
                    .zip(sim_keys)
                    .filter(|(_, k)| **k == key)
                    .map(|(&i, _)| table.f64_at(i, SIMULATION))
                    .collect::<Result<Vec<_>>>()?;
                if values.is_empty() {
                    None
                } else {
                    Some(mean_and_sd(&values).0)
                }
            }
            None => None,
        };

        let x = condition_value(row, conditions, &key)?;
        points.push(DataPoint {
            x,
            mean,
            sd,
            sem,
            noise_model,
            repl,
            sim,
        });
    }

    Ok(DataToPlot { points })
}

fn select_series(row: &VisSpecRow, table: &Table) -> Vec<usize> {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if let Some(dataset_id) = &row.dataset_id {
        if table.has_column(DATASET_ID) {
            pairs.push((DATASET_ID, dataset_id.as_str()));
        }
    }
    if let Some(observable_id) = &row.y_values {
        pairs.push((OBSERVABLE_ID, observable_id.as_str()));
    }
    if let Some(condition_id) = &row.condition_id {
        pairs.push((SIMULATION_CONDITION_ID, condition_id.as_str()));
    }
    filtered_indices(table, &select_ids(pairs))
}

/// Simulation rows of a series: the series filter, narrowed to the
/// (observableId, simulationConditionId) pairs of its measurement rows,
/// since `datasetId` is optional in simulation tables.
fn simulation_rows(
    row: &VisSpecRow,
    measurements: &Table,
    measured: &[usize],
    simulation: &Table,
) -> Vec<usize> {
    let measured: BTreeSet<(Option<String>, Option<String>)> = measured
        .iter()
        .map(|&i| {
            (
                measurements.id_at(i, OBSERVABLE_ID),
                measurements.id_at(i, SIMULATION_CONDITION_ID),
            )
        })
        .collect();
    select_series(row, simulation)
        .into_iter()
        .filter(|&i| {
            measured.contains(&(
                simulation.id_at(i, OBSERVABLE_ID),
                simulation.id_at(i, SIMULATION_CONDITION_ID),
            ))
        })
        .collect()
}

fn group_key(row: &VisSpecRow, table: &Table, idx: usize) -> Result<GroupKey> {
    if row.x_is_condition_parameter() {
        let id = table.id_at(idx, SIMULATION_CONDITION_ID).ok_or_else(|| {
            PlotError::invalid_value(&table.name, SIMULATION_CONDITION_ID, idx, "")
        })?;
        Ok(GroupKey::Condition(id))
    } else {
        Ok(GroupKey::Time(table.f64_at(idx, TIME)?))
    }
}

/// Distinct keys sorted ascending.
fn ordered_groups(keys: &[GroupKey]) -> Vec<GroupKey> {
    let mut groups: Vec<GroupKey> = Vec::new();
    for key in keys {
        if !groups.contains(key) {
            groups.push(key.clone());
        }
    }
    groups.sort_by(|a, b| match (a, b) {
        (GroupKey::Time(x), GroupKey::Time(y)) => x.total_cmp(y),
        (GroupKey::Condition(x), GroupKey::Condition(y)) => x.cmp(y),
        (GroupKey::Time(_), GroupKey::Condition(_)) => std::cmp::Ordering::Less,
        (GroupKey::Condition(_), GroupKey::Time(_)) => std::cmp::Ordering::Greater,
    });
    groups
}

/// Resolve the x coordinate of a group from the condition table.
fn condition_value(row: &VisSpecRow, conditions: &Table, key: &GroupKey) -> Result<f64> {
    match key {
        GroupKey::Time(t) => Ok(*t),
        GroupKey::Condition(id) => {
            conditions.require_columns(&[CONDITION_ID, row.x_values.as_str()])?;
            let idx = (0..conditions.len())
                .find(|&i| conditions.id_at(i, CONDITION_ID).as_deref() == Some(id.as_str()))
                .ok_or_else(|| PlotError::missing_data(format!("condition '{id}' in condition table")))?;
            let cell = conditions.rows[idx]
                .get(&row.x_values)
                .cloned()
                .unwrap_or(CellValue::Null);
            cell.as_f64().ok_or_else(|| PlotError::NonNumericCondition {
                column: row.x_values.clone(),
                condition: id.clone(),
                value: cell.to_string(),
            })
        }
    }
}

fn mean_and_sd(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn describe(row: &VisSpecRow) -> String {
    let mut parts = vec![format!("plot '{}'", row.plot_id)];
    if let Some(d) = &row.dataset_id {
        parts.push(format!("dataset '{d}'"));
    }
    if let Some(o) = &row.y_values {
        parts.push(format!("observable '{o}'"));
    }
    if let Some(c) = &row.condition_id {
        parts.push(format!("condition '{c}'"));
    }
    parts.join(", ")
}
