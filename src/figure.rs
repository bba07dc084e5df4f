//! Figure model: the ordered subplots derived from a visualization spec.

use crate::data::model::Table;
use crate::error::Result;
use crate::petab::aggregate::{data_to_plot, DataToPlot};
use crate::petab::vis_spec::{VisSpecRow, VisualizationSpec};
use crate::petab::{AxisScale, PlotKind, PlotTypeData};

/// One data series of a subplot: its visualization row and its data.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    pub vis: VisSpecRow,
    pub data: DataToPlot,
}

impl DataSeries {
    pub fn label(&self) -> &str {
        &self.vis.legend_entry
    }
}

/// Panel-level settings shared by all plot variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub series: Vec<DataSeries>,
}

impl Panel {
    /// Empty panel with settings taken from a visualization row.
    pub fn from_row(row: &VisSpecRow) -> Self {
        Panel {
            id: row.plot_id.clone(),
            title: row.plot_name.clone(),
            x_label: row.x_label.clone(),
            y_label: row.y_label.clone(),
            x_scale: row.x_scale,
            y_scale: row.y_scale,
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, vis: VisSpecRow, data: DataToPlot) {
        self.series.push(DataSeries { vis, data });
    }

    /// Whether every series carries simulated values.
    pub fn has_simulation(&self) -> bool {
        !self.series.is_empty() && self.series.iter().all(|s| s.data.has_simulation())
    }
}

/// One rendered panel, closed over the supported plot variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SinglePlot {
    Line(Panel),
    Bar(Panel),
    Scatter(Panel),
}

impl SinglePlot {
    pub fn new(kind: PlotKind, panel: Panel) -> Self {
        match kind {
            PlotKind::Line => SinglePlot::Line(panel),
            PlotKind::Bar => SinglePlot::Bar(panel),
            PlotKind::Scatter => SinglePlot::Scatter(panel),
        }
    }

    pub fn kind(&self) -> PlotKind {
        match self {
            SinglePlot::Line(_) => PlotKind::Line,
            SinglePlot::Bar(_) => PlotKind::Bar,
            SinglePlot::Scatter(_) => PlotKind::Scatter,
        }
    }

    pub fn panel(&self) -> &Panel {
        match self {
            SinglePlot::Line(p) | SinglePlot::Bar(p) | SinglePlot::Scatter(p) => p,
        }
    }
}

/// Ordered collection of subplots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    pub subplots: Vec<SinglePlot>,
}

impl Figure {
    /// A figure of `num_subplots` empty line-plot panels named `plot1`, `plot2`, ...
    pub fn with_panels(num_subplots: usize) -> Self {
        let subplots = (0..num_subplots)
            .map(|i| {
                let row = VisSpecRow::new(&format!("plot{}", i + 1), PlotTypeData::default());
                SinglePlot::Line(Panel::from_row(&row))
            })
            .collect();
        Figure { subplots }
    }

    /// One subplot per distinct `plotId` in first-appearance order, one series
    /// per visualization row. Plot type and axis scales come from the first
    /// row of each plot.
    pub fn from_spec(
        spec: &VisualizationSpec,
        conditions: &Table,
        measurements: &Table,
        simulation: Option<&Table>,
    ) -> Result<Self> {
        let mut subplots: Vec<SinglePlot> = Vec::new();

        for plot_id in spec.plot_ids() {
            let rows: Vec<&VisSpecRow> = spec.rows.iter().filter(|r| r.plot_id == plot_id).collect();
            let first = rows[0];
            let mut panel = Panel::from_row(first);

            for row in &rows {
                if row.plot_type_simulation != first.plot_type_simulation {
                    log::warn!(
                        "plot '{}' mixes {} and {}; drawing as {}",
                        plot_id,
                        first.plot_type_simulation,
                        row.plot_type_simulation,
                        first.plot_type_simulation
                    );
                }
                let data = data_to_plot(row, conditions, measurements, simulation)?;
                panel.add_series((*row).clone(), data);
            }

            subplots.push(SinglePlot::new(first.plot_type_simulation, panel));
        }

        log::debug!("figure has {} subplots", subplots.len());
        Ok(Figure { subplots })
    }

    pub fn num_subplots(&self) -> usize {
        self.subplots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (Table, Table) {
        let conditions = Table::from_records("condition", &["conditionId"], vec![vec!["c0".into()]]);
        let measurements = Table::from_records(
            "measurement",
            &["observableId", "simulationConditionId", "time", "measurement", "datasetId"],
            vec![
                vec!["obs_a".into(), "c0".into(), 0.0.into(), 1.0.into(), "d1".into()],
                vec!["obs_a".into(), "c0".into(), 1.0.into(), 2.0.into(), "d2".into()],
                vec!["obs_b".into(), "c0".into(), 0.0.into(), 3.0.into(), "d3".into()],
            ],
        );
        (conditions, measurements)
    }

    #[test]
    fn one_subplot_per_plot_id() {
        let (conditions, measurements) = tables();
        let vis = Table::from_records(
            "visualization",
            &["plotId", "datasetId", "plotTypeSimulation"],
            vec![
                vec!["p1".into(), "d1".into(), "LinePlot".into()],
                vec!["p2".into(), "d2".into(), "BarPlot".into()],
                vec!["p1".into(), "d3".into(), "BarPlot".into()],
            ],
        );
        let spec = VisualizationSpec::from_table(&vis, &measurements, PlotTypeData::MeanAndSd).unwrap();
        let figure = Figure::from_spec(&spec, &conditions, &measurements, None).unwrap();

        assert_eq!(figure.num_subplots(), 2);
        assert_eq!(figure.subplots[0].kind(), PlotKind::Line);
        assert_eq!(figure.subplots[0].panel().series.len(), 2);
        assert_eq!(figure.subplots[1].kind(), PlotKind::Bar);
    }

    #[test]
    fn empty_figure_has_requested_size() {
        let figure = Figure::with_panels(4);
        assert_eq!(figure.num_subplots(), 4);
        assert_eq!(figure.subplots[3].panel().id, "plot4");
        assert!(!figure.subplots[0].panel().has_simulation());
    }
}
