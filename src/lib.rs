//! Plotting front-end for PEtab visualization data.
//!
//! Measurement, simulation and condition tables plus an optional
//! visualization table are turned into a [`Figure`] of line, bar and scatter
//! subplots, then drawn either to a PNG/SVG file or in an interactive window.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod petab;
pub mod plotter;
pub mod render;
pub mod state;
pub mod ui;

pub use config::PlotStyle;
pub use data::model::{CellValue, Table};
pub use error::PlotError;
pub use figure::{Figure, SinglePlot};
pub use petab::{AxisScale, PlotKind, PlotTypeData};
pub use plotter::{Plotter, PlotterInput, TableSource};
pub use render::OutputMode;
