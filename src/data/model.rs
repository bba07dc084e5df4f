use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a PEtab table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Numeric strings (as produced by
    /// hand-written tables) are accepted too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used for identifiers (`observableId`, `datasetId`, ...).
    /// Null cells have no identifier.
    pub fn as_id(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Table – one PEtab table (conditions, measurements, simulation, vis spec)
// ---------------------------------------------------------------------------

/// A single table row: column name → cell.
pub type Row = BTreeMap<String, CellValue>;

/// An in-memory table with the column order of the source file.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Human readable name used in error messages ("measurement", ...).
    pub name: String,
    /// Column names in source order.
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: &str, column_names: Vec<String>, rows: Vec<Row>) -> Self {
        Table {
            name: name.to_string(),
            column_names,
            rows,
        }
    }

    /// Build a table from string columns and rows of cells, the shape used by
    /// callers that assemble tables in memory.
    pub fn from_records(name: &str, columns: &[&str], records: Vec<Vec<CellValue>>) -> Self {
        let column_names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = records
            .into_iter()
            .map(|record| column_names.iter().cloned().zip(record).collect())
            .collect();
        Table::new(name, column_names, rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Fail with a validation error naming the first missing column.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        match columns.iter().find(|c| !self.has_column(c)) {
            Some(missing) => Err(PlotError::missing_column(&self.name, *missing)),
            None => Ok(()),
        }
    }

    /// Numeric value of `column` in `row`, failing with the offending cell.
    pub fn f64_at(&self, row: usize, column: &str) -> Result<f64> {
        let cell = self.rows[row].get(column).unwrap_or(&CellValue::Null);
        cell.as_f64()
            .ok_or_else(|| PlotError::invalid_value(&self.name, column, row, cell.to_string()))
    }

    /// Identifier value of `column` in `row`, `None` for a missing/empty cell.
    pub fn id_at(&self, row: usize, column: &str) -> Option<String> {
        self.rows[row].get(column).and_then(CellValue::as_id)
    }

    /// Sorted unique identifiers of a column (empty cells skipped).
    pub fn unique_ids(&self, column: &str) -> Vec<String> {
        let ids: BTreeSet<String> = (0..self.len())
            .filter_map(|i| self.id_at(i, column))
            .collect();
        ids.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_records(
            "measurement",
            &["observableId", "time", "measurement"],
            vec![
                vec!["obs_a".into(), 0.0.into(), 1.5.into()],
                vec!["obs_b".into(), 1.0.into(), "n/a".into()],
                vec!["obs_a".into(), 2.0.into(), CellValue::Null],
            ],
        )
    }

    #[test]
    fn require_columns_names_the_missing_one() {
        let table = sample();
        assert!(table.require_columns(&["observableId", "time"]).is_ok());
        let err = table
            .require_columns(&["observableId", "simulationConditionId"])
            .unwrap_err();
        assert!(err.to_string().contains("simulationConditionId"));
        assert!(err.to_string().contains("measurement"));
    }

    #[test]
    fn numeric_lookup_reports_bad_cells() {
        let table = sample();
        assert_eq!(table.f64_at(0, "measurement").unwrap(), 1.5);
        let err = table.f64_at(1, "measurement").unwrap_err();
        assert!(err.to_string().contains("n/a"));
    }

    #[test]
    fn unique_ids_are_sorted_and_skip_nulls() {
        let table = sample();
        assert_eq!(table.unique_ids("observableId"), vec!["obs_a", "obs_b"]);
        assert!(table.id_at(2, "measurement").is_none());
    }

    #[test]
    fn string_numbers_are_numeric() {
        assert_eq!(CellValue::from(" 2.5 ").as_f64(), Some(2.5));
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert!(CellValue::Float(f64::NAN).is_null());
    }
}
