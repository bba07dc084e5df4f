use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// Columns absent from the map are unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Build a filter selecting exactly one identifier per column.
pub fn select_ids<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> FilterState {
    pairs
        .into_iter()
        .map(|(col, id)| (col.to_string(), BTreeSet::from([CellValue::from(id)])))
        .collect()
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * The filter set for that column is empty → nothing selected → fails
/// * The row's value for that column is in the selected set → passes
/// * The row lacks the column → passes only if `Null` is selected
///
/// Values are compared by their identifier text, so a filter on `"1"`
/// matches both a string cell `"1"` and an integer cell `1`.
pub fn filtered_indices(table: &Table, filters: &FilterState) -> Vec<usize> {
    let selected_text: BTreeMap<&String, BTreeSet<String>> = filters
        .iter()
        .map(|(col, vals)| (col, vals.iter().map(|v| v.to_string()).collect()))
        .collect();

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            for (col, selected) in &selected_text {
                if selected.is_empty() {
                    // Nothing selected for this column → hide everything
                    return false;
                }
                match row.get(*col) {
                    Some(val) if !val.is_null() => {
                        if !selected.contains(&val.to_string()) {
                            return false;
                        }
                    }
                    _ => {
                        if !filters[*col].contains(&CellValue::Null) {
                            return false;
                        }
                    }
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements() -> Table {
        Table::from_records(
            "measurement",
            &["observableId", "datasetId", "time"],
            vec![
                vec!["obs_a".into(), "d1".into(), 0.0.into()],
                vec!["obs_a".into(), "d2".into(), 1.0.into()],
                vec!["obs_b".into(), CellValue::Null, 1.0.into()],
            ],
        )
    }

    #[test]
    fn no_filters_keep_every_row() {
        let table = measurements();
        let filters = FilterState::new();
        assert_eq!(filtered_indices(&table, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn id_selection_matches_rows() {
        let table = measurements();
        let filters = select_ids([("observableId", "obs_a"), ("datasetId", "d2")]);
        assert_eq!(filtered_indices(&table, &filters), vec![1]);
    }

    #[test]
    fn empty_selection_hides_everything() {
        let table = measurements();
        let mut filters = FilterState::new();
        filters.insert("datasetId".to_string(), BTreeSet::new());
        assert!(filtered_indices(&table, &filters).is_empty());
    }

    #[test]
    fn null_cells_need_null_selected() {
        let table = measurements();
        let mut filters = select_ids([("datasetId", "d1")]);
        assert_eq!(filtered_indices(&table, &filters), vec![0]);
        filters
            .get_mut("datasetId")
            .unwrap()
            .insert(CellValue::Null);
        assert_eq!(filtered_indices(&table, &filters), vec![0, 2]);
    }

    #[test]
    fn integer_cells_match_textual_ids() {
        let table = Table::from_records(
            "measurement",
            &["datasetId"],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2)]],
        );
        assert_eq!(filtered_indices(&table, &select_ids([("datasetId", "2")])), vec![1]);
    }
}
