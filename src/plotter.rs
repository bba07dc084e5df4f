//! The plotting front-end: owns the input tables, validates and extends
//! them, derives the [`Figure`] and hands it to a renderer.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::PlotStyle;
use crate::data::loader::load_table;
use crate::data::model::Table;
use crate::error::PlotError;
use crate::figure::Figure;
use crate::petab::vis_spec::{SeriesGrouping, VisualizationSpec};
use crate::petab::{
    PlotTypeData, MEASUREMENT, MEASUREMENT_REQUIRED, OBSERVABLE_ID, SIMULATION,
    SIMULATION_CONDITION_ID, SIMULATION_REQUIRED, TIME,
};
use crate::render::bitmap::BitmapRenderer;
use crate::render::{FigureRenderer, OutputMode};
use crate::ui::DisplayRenderer;

/// A table given either as a file to load or already in memory.
#[derive(Debug, Clone)]
pub enum TableSource {
    Path(PathBuf),
    Table(Table),
}

impl TableSource {
    fn resolve(self, name: &str) -> Result<Table> {
        match self {
            TableSource::Path(path) => load_table(&path, name),
            TableSource::Table(mut table) => {
                table.name = name.to_string();
                Ok(table)
            }
        }
    }
}

impl From<PathBuf> for TableSource {
    fn from(path: PathBuf) -> Self {
        TableSource::Path(path)
    }
}

impl From<Table> for TableSource {
    fn from(table: Table) -> Self {
        TableSource::Table(table)
    }
}

/// Constructor arguments of [`Plotter`].
///
/// Filter lists hold one inner list per subplot and only apply when no
/// visualization table is given. At most one kind may be set.
#[derive(Debug, Clone)]
pub struct PlotterInput {
    pub conditions: TableSource,
    pub measurements: TableSource,
    pub simulation: Option<TableSource>,
    pub vis_spec: Option<TableSource>,
    pub dataset_id_list: Option<Vec<Vec<String>>>,
    pub sim_cond_id_list: Option<Vec<Vec<String>>>,
    pub sim_cond_num_list: Option<Vec<Vec<usize>>>,
    pub observable_id_list: Option<Vec<Vec<String>>>,
    pub observable_num_list: Option<Vec<Vec<usize>>>,
    /// Noise representation for rows that do not set `plotTypeData`.
    pub plotted_noise: PlotTypeData,
    pub style: PlotStyle,
}

impl PlotterInput {
    pub fn new(conditions: impl Into<TableSource>, measurements: impl Into<TableSource>) -> Self {
        Self {
            conditions: conditions.into(),
            measurements: measurements.into(),
            simulation: None,
            vis_spec: None,
            dataset_id_list: None,
            sim_cond_id_list: None,
            sim_cond_num_list: None,
            observable_id_list: None,
            observable_num_list: None,
            plotted_noise: PlotTypeData::MeanAndSd,
            style: PlotStyle::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plotter
// ---------------------------------------------------------------------------

/// Validated tables plus the visualization specification derived from them.
pub struct Plotter {
    conditions: Table,
    measurements: Table,
    simulation: Option<Table>,
    vis_spec: VisualizationSpec,
    style: PlotStyle,
}

impl Plotter {
    /// Load every table and run [`Plotter::check_and_extend_tables`].
    pub fn new(input: PlotterInput) -> Result<Self> {
        let conditions = input.conditions.clone().resolve("condition")?;
        let measurements = input.measurements.clone().resolve("measurement")?;
        let simulation = match input.simulation.clone() {
            Some(source) => Some(source.resolve("simulation")?),
            None => None,
        };
        let vis_table = match input.vis_spec.clone() {
            Some(source) => Some(source.resolve("visualization")?),
            None => None,
        };

        let vis_spec = check_and_extend_tables(
            &measurements,
            simulation.as_ref(),
            vis_table.as_ref(),
            &input,
        )
        .context("checking input tables")?;

        log::info!(
            "Plotter ready: {} measurements, {} visualization rows",
            measurements.len(),
            vis_spec.rows.len()
        );

        Ok(Self {
            conditions,
            measurements,
            simulation,
            vis_spec,
            style: input.style,
        })
    }

    pub fn vis_spec(&self) -> &VisualizationSpec {
        &self.vis_spec
    }

    pub fn style(&self) -> &PlotStyle {
        &self.style
    }

    /// A figure of `num_subplots` empty line-plot panels.
    pub fn create_figure(&self, num_subplots: usize) -> Figure {
        Figure::with_panels(num_subplots)
    }

    /// The figure described by the visualization specification.
    pub fn figure(&self) -> Result<Figure> {
        let figure = Figure::from_spec(
            &self.vis_spec,
            &self.conditions,
            &self.measurements,
            self.simulation.as_ref(),
        )?;
        Ok(figure)
    }

    /// Build the figure and send it to the backend selected by `mode`.
    pub fn generate_plot(&self, mode: &OutputMode) -> Result<Figure> {
        let figure = self.figure()?;
        let mut renderer: Box<dyn FigureRenderer> = match mode {
            OutputMode::Display => Box::new(DisplayRenderer::default()),
            OutputMode::File(path) => Box::new(BitmapRenderer::new(path.clone())),
        };
        renderer.render(&figure, &self.style)?;
        Ok(figure)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check required columns and numeric values, then parse the visualization
/// table or synthesize one from the filter lists.
pub fn check_and_extend_tables(
    measurements: &Table,
    simulation: Option<&Table>,
    vis_table: Option<&Table>,
    input: &PlotterInput,
) -> crate::error::Result<VisualizationSpec> {
    measurements.require_columns(MEASUREMENT_REQUIRED)?;
    check_numeric(measurements, &[TIME, MEASUREMENT])?;
    if let Some(sim) = simulation {
        sim.require_columns(SIMULATION_REQUIRED)?;
        check_numeric(sim, &[TIME, SIMULATION])?;
    }

    let grouping = grouping_from_lists(input, measurements)?;
    match vis_table {
        Some(table) => {
            if grouping != SeriesGrouping::ByObservable {
                log::warn!("filter lists are ignored when a visualization table is given");
            }
            VisualizationSpec::from_table(table, measurements, input.plotted_noise)
        }
        None => Ok(VisualizationSpec::from_grouping(
            &grouping,
            measurements,
            input.plotted_noise,
        )),
    }
}

fn check_numeric(table: &Table, columns: &[&str]) -> crate::error::Result<()> {
    for idx in 0..table.len() {
        for column in columns {
            table.f64_at(idx, column)?;
        }
    }
    Ok(())
}

/// Resolve the filter lists into a grouping. Number lists index the sorted
/// unique ids of the measurement table.
fn grouping_from_lists(
    input: &PlotterInput,
    measurements: &Table,
) -> crate::error::Result<SeriesGrouping> {
    let given = [
        input.dataset_id_list.is_some(),
        input.sim_cond_id_list.is_some(),
        input.sim_cond_num_list.is_some(),
        input.observable_id_list.is_some(),
        input.observable_num_list.is_some(),
    ];
    if given.iter().filter(|g| **g).count() > 1 {
        return Err(PlotError::InvalidFilter(
            "only one of dataset, condition or observable lists may be given".to_string(),
        ));
    }

    if let Some(groups) = &input.dataset_id_list {
        return Ok(SeriesGrouping::Datasets(groups.clone()));
    }
    if let Some(groups) = &input.sim_cond_id_list {
        return Ok(SeriesGrouping::Conditions(groups.clone()));
    }
    if let Some(groups) = &input.sim_cond_num_list {
        let ids = measurements.unique_ids(SIMULATION_CONDITION_ID);
        return Ok(SeriesGrouping::Conditions(ids_by_number(groups, &ids, "condition")?));
    }
    if let Some(groups) = &input.observable_id_list {
        return Ok(SeriesGrouping::Observables(groups.clone()));
    }
    if let Some(groups) = &input.observable_num_list {
        let ids = measurements.unique_ids(OBSERVABLE_ID);
        return Ok(SeriesGrouping::Observables(ids_by_number(groups, &ids, "observable")?));
    }
    Ok(SeriesGrouping::ByObservable)
}

fn ids_by_number(
    groups: &[Vec<usize>],
    ids: &[String],
    what: &str,
) -> crate::error::Result<Vec<Vec<String>>> {
    groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|&n| {
                    ids.get(n).cloned().ok_or_else(|| {
                        PlotError::InvalidFilter(format!(
                            "{what} number {n} out of range (0..{})",
                            ids.len()
                        ))
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn conditions() -> Table {
        Table::from_records(
            "condition",
            &["conditionId", "dose"],
            vec![
                vec!["c0".into(), 1.0.into()],
                vec!["c1".into(), 2.0.into()],
            ],
        )
    }

    fn measurements() -> Table {
        Table::from_records(
            "measurement",
            &["observableId", "simulationConditionId", "time", "measurement", "datasetId"],
            vec![
                vec!["obs_a".into(), "c0".into(), 0.0.into(), 1.0.into(), "d1".into()],
                vec!["obs_a".into(), "c1".into(), 1.0.into(), 2.0.into(), "d1".into()],
                vec!["obs_b".into(), "c0".into(), 0.0.into(), 3.0.into(), "d2".into()],
            ],
        )
    }

    #[test]
    fn default_grouping_is_one_plot_per_observable() {
        let plotter = Plotter::new(PlotterInput::new(conditions(), measurements())).unwrap();
        let figure = plotter.figure().unwrap();
        assert_eq!(figure.num_subplots(), 2);
        assert_eq!(figure.subplots[0].panel().title, "obs_a");
    }

    #[test]
    fn missing_measurement_column_is_named() {
        let table = Table::from_records(
            "measurement",
            &["observableId", "simulationConditionId", "time"],
            vec![vec!["obs_a".into(), "c0".into(), 0.0.into()]],
        );
        let err = Plotter::new(PlotterInput::new(conditions(), table))
            .err()
            .unwrap();
        match err.downcast_ref::<PlotError>() {
            Some(PlotError::MissingColumn { column, .. }) => assert_eq!(column, "measurement"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_measurement_is_rejected() {
        let mut table = measurements();
        table.rows[1].insert("measurement".to_string(), CellValue::from("high"));
        let err = Plotter::new(PlotterInput::new(conditions(), table))
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<PlotError>(),
            Some(PlotError::InvalidValue { row: 1, .. })
        ));
    }

    #[test]
    fn observable_numbers_index_sorted_ids() {
        let mut input = PlotterInput::new(conditions(), measurements());
        input.observable_num_list = Some(vec![vec![1], vec![0, 1]]);
        let plotter = Plotter::new(input).unwrap();
        let figure = plotter.figure().unwrap();
        assert_eq!(figure.num_subplots(), 2);
        assert_eq!(figure.subplots[0].panel().series[0].label(), "obs_b");
        assert_eq!(figure.subplots[1].panel().series.len(), 2);
    }

    #[test]
    fn condition_numbers_index_sorted_measured_conditions() {
        let mut input = PlotterInput::new(conditions(), measurements());
        input.sim_cond_num_list = Some(vec![vec![1, 0]]);
        let plotter = Plotter::new(input).unwrap();
        let figure = plotter.figure().unwrap();
        let labels: Vec<&str> = figure.subplots[0]
            .panel()
            .series
            .iter()
            .map(|s| s.label())
            .collect();
        assert_eq!(labels, vec!["c1", "c0"]);
    }

    #[test]
    fn condition_numbers_out_of_range_fail() {
        let mut input = PlotterInput::new(conditions(), measurements());
        input.sim_cond_num_list = Some(vec![vec![5]]);
        let err = Plotter::new(input).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<PlotError>(),
            Some(PlotError::InvalidFilter(_))
        ));
    }

    #[test]
    fn several_list_kinds_are_rejected() {
        let mut input = PlotterInput::new(conditions(), measurements());
        input.dataset_id_list = Some(vec![vec!["d1".to_string()]]);
        input.observable_id_list = Some(vec![vec!["obs_a".to_string()]]);
        assert!(Plotter::new(input).is_err());
    }

    #[test]
    fn create_figure_returns_empty_panels() {
        let plotter = Plotter::new(PlotterInput::new(conditions(), measurements())).unwrap();
        let figure = plotter.create_figure(3);
        assert_eq!(figure.num_subplots(), 3);
        assert!(figure.subplots.iter().all(|p| p.panel().series.is_empty()));
    }
}
