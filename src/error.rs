//! Error types for petab-plot.
//!
//! Domain failures are `PlotError` values. Loading and the binary work with
//! `anyhow`, so a `PlotError` can always be recovered with `downcast_ref`.

use thiserror::Error;

/// Result type alias for plotting operations.
pub type Result<T> = std::result::Result<T, PlotError>;

/// Errors that abort figure generation.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Ordinal scaling needs strictly increasing or strictly decreasing values.
    #[error(
        "x-conditions are neither strictly increasing nor strictly decreasing: {values:?}"
    )]
    NonMonotonicConditions { values: Vec<f64> },

    /// Scatter plots compare data against simulation.
    #[error("scatter plot '{plot_id}' requires simulation data")]
    ScatterWithoutSimulation { plot_id: String },

    /// A condition-table column used as x-axis holds non-numeric values.
    #[error("condition column '{column}' has non-numeric value '{value}' for condition '{condition}'")]
    NonNumericCondition {
        column: String,
        condition: String,
        value: String,
    },

    /// A required column is absent from a table.
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A cell could not be interpreted.
    #[error("{table} table, row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// A keyword outside one of the closed PEtab enumerations.
    #[error("unknown {kind} '{value}'")]
    UnknownKeyword { kind: &'static str, value: String },

    /// A data series selects no measurement rows.
    #[error("no measurements for {what}")]
    MissingData { what: String },

    /// Filter lists are inconsistent or out of range.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

impl PlotError {
    /// Create a MissingColumn error.
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create an InvalidValue error.
    pub fn invalid_value(
        table: impl Into<String>,
        column: impl Into<String>,
        row: usize,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            table: table.into(),
            column: column.into(),
            row,
            value: value.into(),
        }
    }

    /// Create a MissingData error.
    pub fn missing_data(what: impl Into<String>) -> Self {
        Self::MissingData { what: what.into() }
    }
}
