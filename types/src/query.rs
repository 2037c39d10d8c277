//! Flattened query results
//!
//! Result batches are consumed once and immediately flattened into this
//! display form; nothing columnar is retained.

use serde::{Deserialize, Serialize};
use tsify::Tsify;

/// One query result, flattened to named columns and stringified cells
#[derive(Tsify, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct QueryTable {
    /// Column names in schema order
    pub columns: Vec<String>,
    /// One entry per row, cells in column order
    pub rows: Vec<Vec<String>>,
}

impl QueryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the first column, consuming the table
    pub fn into_first_column(self) -> Vec<String> {
        self.rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_column_preserves_row_order() {
        let table = QueryTable {
            columns: vec!["Country Name".into(), "2023".into()],
            rows: vec![
                vec!["India".into(), "1".into()],
                vec!["China".into(), "2".into()],
            ],
        };
        assert_eq!(table.into_first_column(), vec!["India", "China"]);
    }

    #[test]
    fn empty_rows_yield_empty_column() {
        let table = QueryTable::default();
        assert!(table.is_empty());
        assert!(table.into_first_column().is_empty());
    }
}
