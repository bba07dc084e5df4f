//! PEtab table vocabulary: column names and the closed keyword enumerations
//! used by the visualization specification.

pub mod aggregate;
pub mod vis_spec;

use std::fmt;
use std::str::FromStr;

use crate::error::PlotError;

// -- measurement / simulation / condition tables --
pub const OBSERVABLE_ID: &str = "observableId";
pub const SIMULATION_CONDITION_ID: &str = "simulationConditionId";
pub const CONDITION_ID: &str = "conditionId";
pub const TIME: &str = "time";
pub const MEASUREMENT: &str = "measurement";
pub const SIMULATION: &str = "simulation";
pub const DATASET_ID: &str = "datasetId";
pub const NOISE_PARAMETERS: &str = "noiseParameters";

// -- visualization table --
pub const PLOT_ID: &str = "plotId";
pub const PLOT_NAME: &str = "plotName";
pub const PLOT_TYPE_SIMULATION: &str = "plotTypeSimulation";
pub const PLOT_TYPE_DATA: &str = "plotTypeData";
pub const X_VALUES: &str = "xValues";
pub const X_OFFSET: &str = "xOffset";
pub const X_LABEL: &str = "xLabel";
pub const X_SCALE: &str = "xScale";
pub const Y_VALUES: &str = "yValues";
pub const Y_OFFSET: &str = "yOffset";
pub const Y_LABEL: &str = "yLabel";
pub const Y_SCALE: &str = "yScale";
pub const LEGEND_ENTRY: &str = "legendEntry";

/// Columns every measurement table must carry.
pub const MEASUREMENT_REQUIRED: &[&str] =
    &[OBSERVABLE_ID, SIMULATION_CONDITION_ID, TIME, MEASUREMENT];
/// Columns every simulation table must carry.
pub const SIMULATION_REQUIRED: &[&str] = &[OBSERVABLE_ID, SIMULATION_CONDITION_ID, TIME, SIMULATION];

/// Implements `FromStr`/`Display` for a keyword enum from its table spelling.
macro_rules! keyword_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = PlotError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(PlotError::UnknownKeyword {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Axis scale keyword (`xScale` / `yScale`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    Log10,
    /// Natural logarithm.
    Ln,
    /// Equidistant ranks of monotonic condition values.
    Order,
}

keyword_enum!(AxisScale, "axis scale", {
    Linear => "lin",
    Log10 => "log10",
    Ln => "log",
    Order => "order",
});

/// Plot variant keyword (`plotTypeSimulation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

keyword_enum!(PlotKind, "plot type", {
    Line => "LinePlot",
    Bar => "BarPlot",
    Scatter => "ScatterPlot",
});

/// Data aggregation keyword (`plotTypeData`): which noise column drives the
/// error bars, or `replicate` for raw replicate markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotTypeData {
    #[default]
    MeanAndSd,
    MeanAndSem,
    Replicate,
    Provided,
}

keyword_enum!(PlotTypeData, "plot data type", {
    MeanAndSd => "MeanAndSD",
    MeanAndSem => "MeanAndSEM",
    Replicate => "replicate",
    Provided => "provided",
});
