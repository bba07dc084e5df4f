//! Typed visualization specification: parsing, default filling, dataset
//! expansion, and synthesis from grouping lists when no table is given.

use std::str::FromStr;

use crate::data::model::Table;
use crate::error::{PlotError, Result};

use super::{
    AxisScale, PlotKind, PlotTypeData, DATASET_ID, LEGEND_ENTRY, OBSERVABLE_ID, PLOT_ID,
    PLOT_NAME, PLOT_TYPE_DATA, PLOT_TYPE_SIMULATION, TIME, X_LABEL,
    X_OFFSET, X_SCALE, X_VALUES, Y_LABEL, Y_OFFSET, Y_SCALE, Y_VALUES,
};

/// One (subplot, data series) row of the visualization specification with
/// every optional column resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct VisSpecRow {
    pub plot_id: String,
    pub plot_name: String,
    pub plot_type_simulation: PlotKind,
    pub plot_type_data: PlotTypeData,
    pub dataset_id: Option<String>,
    /// Restricts the series to one simulation condition. Only produced by
    /// condition grouping; not a visualization-table column.
    pub condition_id: Option<String>,
    /// `time` or a parameter column of the condition table.
    pub x_values: String,
    pub x_offset: f64,
    pub x_label: String,
    pub x_scale: AxisScale,
    /// Observable plotted by this series; `None` selects every observable.
    pub y_values: Option<String>,
    pub y_offset: f64,
    pub y_label: String,
    pub y_scale: AxisScale,
    pub legend_entry: String,
}

impl VisSpecRow {
    /// A line-plot row over time with every column at its default.
    pub fn new(plot_id: &str, plot_type_data: PlotTypeData) -> Self {
        VisSpecRow {
            plot_id: plot_id.to_string(),
            plot_name: plot_id.to_string(),
            plot_type_simulation: PlotKind::Line,
            plot_type_data,
            dataset_id: None,
            condition_id: None,
            x_values: TIME.to_string(),
            x_offset: 0.0,
            x_label: TIME.to_string(),
            x_scale: AxisScale::Linear,
            y_values: None,
            y_offset: 0.0,
            y_label: "values".to_string(),
            y_scale: AxisScale::Linear,
            legend_entry: plot_id.to_string(),
        }
    }

    /// Whether the x-axis is a condition-table parameter rather than time.
    pub fn x_is_condition_parameter(&self) -> bool {
        self.x_values != TIME
    }
}

/// How plots are grouped when no visualization table is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SeriesGrouping {
    /// One subplot per inner list, one series per dataset id.
    Datasets(Vec<Vec<String>>),
    /// One subplot per inner list, one series per simulation condition.
    Conditions(Vec<Vec<String>>),
    /// One subplot per inner list, one series per observable.
    Observables(Vec<Vec<String>>),
    /// One subplot per observable, one series per dataset.
    #[default]
    ByObservable,
}

/// The resolved visualization specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualizationSpec {
    pub rows: Vec<VisSpecRow>,
}

impl VisualizationSpec {
    /// Parse a visualization table, filling defaults and expanding rows
    /// without `datasetId` into one row per dataset of the measurement table.
    pub fn from_table(
        table: &Table,
        measurements: &Table,
        default_data: PlotTypeData,
    ) -> Result<Self> {
        table.require_columns(&[PLOT_ID])?;

        let mut rows = Vec::new();
        for idx in 0..table.len() {
            let plot_id = table
                .id_at(idx, PLOT_ID)
                .ok_or_else(|| PlotError::invalid_value(&table.name, PLOT_ID, idx, ""))?;
            let mut row = VisSpecRow::new(&plot_id, default_data);

            if let Some(name) = table.id_at(idx, PLOT_NAME) {
                row.plot_name = name;
            }
            if let Some(kind) = keyword(table, idx, PLOT_TYPE_SIMULATION)? {
                row.plot_type_simulation = kind;
            }
            if let Some(data) = keyword(table, idx, PLOT_TYPE_DATA)? {
                row.plot_type_data = data;
            }
            if let Some(x_values) = table.id_at(idx, X_VALUES) {
                row.x_label = x_values.clone();
                row.x_values = x_values;
            }
            row.x_offset = offset(table, idx, X_OFFSET)?;
            if let Some(label) = table.id_at(idx, X_LABEL) {
                row.x_label = label;
            }
            if let Some(scale) = keyword(table, idx, X_SCALE)? {
                row.x_scale = scale;
            }
            row.y_values = table.id_at(idx, Y_VALUES);
            row.y_offset = offset(table, idx, Y_OFFSET)?;
            if let Some(label) = table.id_at(idx, Y_LABEL) {
                row.y_label = label;
            }
            if let Some(scale) = keyword(table, idx, Y_SCALE)? {
                row.y_scale = scale;
            }
            let legend = table.id_at(idx, LEGEND_ENTRY);

            match table.id_at(idx, DATASET_ID) {
                Some(dataset_id) => {
                    row.legend_entry = legend.unwrap_or_else(|| dataset_id.clone());
                    row.dataset_id = Some(dataset_id);
                    rows.push(row);
                }
                None => rows.extend(expand_datasets(row, legend, measurements)),
            }
        }

        Ok(VisualizationSpec { rows })
    }

    /// Synthesize a specification from grouping lists.
    pub fn from_grouping(
        grouping: &SeriesGrouping,
        measurements: &Table,
        default_data: PlotTypeData,
    ) -> Self {
        let mut rows = Vec::new();

        let plot_id = |i: usize| format!("plot{}", i + 1);

        match grouping {
            SeriesGrouping::Datasets(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    for dataset_id in group {
                        let mut row = VisSpecRow::new(&plot_id(i), default_data);
                        row.dataset_id = Some(dataset_id.clone());
                        row.legend_entry = dataset_id.clone();
                        rows.push(row);
                    }
                }
            }
            SeriesGrouping::Conditions(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    for condition_id in group {
                        let mut row = VisSpecRow::new(&plot_id(i), default_data);
                        row.condition_id = Some(condition_id.clone());
                        row.legend_entry = condition_id.clone();
                        rows.push(row);
                    }
                }
            }
            SeriesGrouping::Observables(groups) => {
                for (i, group) in groups.iter().enumerate() {
                    for observable_id in group {
                        let mut row = VisSpecRow::new(&plot_id(i), default_data);
                        row.y_values = Some(observable_id.clone());
                        row.legend_entry = observable_id.clone();
                        rows.push(row);
                    }
                }
            }
            SeriesGrouping::ByObservable => {
                for (i, observable_id) in measurements.unique_ids(OBSERVABLE_ID).iter().enumerate() {
                    let mut row = VisSpecRow::new(&plot_id(i), default_data);
                    row.plot_name = observable_id.clone();
                    row.y_values = Some(observable_id.clone());
                    row.legend_entry = observable_id.clone();
                    rows.extend(expand_datasets(row, None, measurements));
                }
            }
        }

        VisualizationSpec { rows }
    }

    /// Distinct plot ids in first-appearance order.
    pub fn plot_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.plot_id.as_str()) {
                ids.push(&row.plot_id);
            }
        }
        ids
    }
}

/// One row per dataset measuring the row's observable (every dataset when the
/// row names no observable). Without a `datasetId` column the row is kept
/// as a single series over all matching measurements.
fn expand_datasets(template: VisSpecRow, legend: Option<String>, measurements: &Table) -> Vec<VisSpecRow> {
    if !measurements.has_column(DATASET_ID) {
        let mut row = template;
        row.legend_entry = legend
            .or_else(|| row.y_values.clone())
            .unwrap_or_else(|| row.plot_id.clone());
        return vec![row];
    }

    let mut dataset_ids: Vec<String> = Vec::new();
    for idx in 0..measurements.len() {
        let observable = measurements.id_at(idx, OBSERVABLE_ID);
        if template.y_values.is_some() && observable != template.y_values {
            continue;
        }
        if let Some(id) = measurements.id_at(idx, DATASET_ID) {
            if !dataset_ids.contains(&id) {
                dataset_ids.push(id);
            }
        }
    }

    dataset_ids
        .into_iter()
        .map(|dataset_id| {
            let mut row = template.clone();
            row.legend_entry = match &legend {
                Some(l) => format!("{l} {dataset_id}"),
                None => dataset_id.clone(),
            };
            row.dataset_id = Some(dataset_id);
            row
        })
        .collect()
}

fn keyword<T>(table: &Table, idx: usize, column: &str) -> Result<Option<T>>
where
    T: FromStr<Err = PlotError>,
{
    match table.id_at(idx, column) {
        None => Ok(None),
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|_| PlotError::invalid_value(&table.name, column, idx, text)),
    }
}

fn offset(table: &Table, idx: usize, column: &str) -> Result<f64> {
    match table.rows[idx].get(column) {
        None => Ok(0.0),
        Some(cell) if cell.is_null() => Ok(0.0),
        Some(_) => table.f64_at(idx, column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements() -> Table {
        Table::from_records(
            "measurement",
            &["observableId", "simulationConditionId", "time", "measurement", "datasetId"],
            vec![
                vec!["obs_a".into(), "c0".into(), 0.0.into(), 1.0.into(), "d1".into()],
                vec!["obs_a".into(), "c0".into(), 1.0.into(), 2.0.into(), "d2".into()],
                vec!["obs_b".into(), "c1".into(), 0.0.into(), 3.0.into(), "d3".into()],
            ],
        )
    }

    #[test]
    fn defaults_fill_missing_columns() {
        let vis = Table::from_records(
            "visualization",
            &["plotId", "datasetId", "xScale"],
            vec![vec!["p1".into(), "d1".into(), "order".into()]],
        );
        let spec = VisualizationSpec::from_table(&vis, &measurements(), PlotTypeData::MeanAndSem)
            .unwrap();
        let row = &spec.rows[0];
        assert_eq!(row.plot_name, "p1");
        assert_eq!(row.plot_type_simulation, PlotKind::Line);
        assert_eq!(row.plot_type_data, PlotTypeData::MeanAndSem);
        assert_eq!(row.x_values, "time");
        assert_eq!(row.x_scale, AxisScale::Order);
        assert_eq!(row.y_scale, AxisScale::Linear);
        assert_eq!(row.legend_entry, "d1");
        assert_eq!(row.x_offset, 0.0);
    }

    #[test]
    fn rows_without_dataset_expand_per_observable_dataset() {
        let vis = Table::from_records(
            "visualization",
            &["plotId", "yValues"],
            vec![vec!["p1".into(), "obs_a".into()]],
        );
        let spec =
            VisualizationSpec::from_table(&vis, &measurements(), PlotTypeData::MeanAndSd).unwrap();
        let datasets: Vec<_> = spec.rows.iter().map(|r| r.dataset_id.clone().unwrap()).collect();
        assert_eq!(datasets, vec!["d1", "d2"]);
    }

    #[test]
    fn bad_scale_names_the_column() {
        let vis = Table::from_records(
            "visualization",
            &["plotId", "datasetId", "yScale"],
            vec![vec!["p1".into(), "d1".into(), "sqrt".into()]],
        );
        let err = VisualizationSpec::from_table(&vis, &measurements(), PlotTypeData::MeanAndSd)
            .unwrap_err();
        assert!(matches!(err, PlotError::InvalidValue { ref column, .. } if column == "yScale"));
    }

    #[test]
    fn default_grouping_is_one_plot_per_observable() {
        let spec = VisualizationSpec::from_grouping(
            &SeriesGrouping::ByObservable,
            &measurements(),
            PlotTypeData::MeanAndSd,
        );
        assert_eq!(spec.plot_ids(), vec!["plot1", "plot2"]);
        assert_eq!(spec.rows.len(), 3);
        assert_eq!(spec.rows[2].plot_name, "obs_b");
    }

    #[test]
    fn condition_grouping_restricts_series() {
        let grouping = SeriesGrouping::Conditions(vec![vec!["c0".into()], vec!["c1".into()]]);
        let spec =
            VisualizationSpec::from_grouping(&grouping, &measurements(), PlotTypeData::MeanAndSd);
        assert_eq!(spec.rows.len(), 2);
        assert_eq!(spec.rows[1].condition_id.as_deref(), Some("c1"));
        assert_eq!(spec.rows[1].plot_id, "plot2");
    }
}
