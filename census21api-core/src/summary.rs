//! Group-by totals over a table's `count` column.

use std::collections::HashMap;

use thiserror::Error;

use crate::table::{COUNT_COLUMN, Cell, Table};

/// Errors from [`Table::summarise_by`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// The table has no column with this name.
    #[error("table has no column named {0:?}")]
    UnknownColumn(String),
    /// A `count` cell does not hold an integer.
    #[error("row {row} has a non-integer count {value:?}")]
    NonIntegerCount {
        /// Row index.
        row: usize,
        /// Offending value.
        value: String,
    },
}

/// Total count for one value of the grouping column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Grouping value.
    pub value: Cell,
    /// Sum of `count` across rows with this value.
    pub count: i64,
    /// Share of the grand total, `0.0` when the total is zero.
    pub proportion: f64,
}

impl Table {
    /// Sum `count` by the values of `column`, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::UnknownColumn`] when `column` (or `count`) is
    /// absent and [`SummaryError::NonIntegerCount`] for unreadable counts.
    pub fn summarise_by(&self, column: &str) -> Result<Vec<Summary>, SummaryError> {
        let key_index = self
            .column_index(column)
            .ok_or_else(|| SummaryError::UnknownColumn(column.to_owned()))?;
        let count_index = self
            .column_index(COUNT_COLUMN)
            .ok_or_else(|| SummaryError::UnknownColumn(COUNT_COLUMN.to_owned()))?;

        let mut positions: HashMap<&Cell, usize> = HashMap::new();
        let mut totals: Vec<(Cell, i64)> = Vec::new();
        for (row_index, row) in self.rows().iter().enumerate() {
            let (Some(key), Some(count_cell)) = (row.get(key_index), row.get(count_index)) else {
                continue;
            };
            let count = count_cell
                .as_integer()
                .ok_or_else(|| SummaryError::NonIntegerCount {
                    row: row_index,
                    value: count_cell.to_string(),
                })?;
            if let Some(&position) = positions.get(key) {
                if let Some(entry) = totals.get_mut(position) {
                    entry.1 = entry.1.saturating_add(count);
                }
            } else {
                positions.insert(key, totals.len());
                totals.push((key.clone(), count));
            }
        }

        let grand_total = totals
            .iter()
            .fold(0_i64, |acc, (_, count)| acc.saturating_add(*count));
        Ok(totals
            .into_iter()
            .map(|(value, count)| Summary {
                value,
                count,
                proportion: proportion(count, grand_total),
            })
            .collect())
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "proportions are reported as floating-point shares"
)]
fn proportion(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, TableQuery, assemble_table};
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> Table {
        let query = TableQuery::new("UR", "rgn", ["sex"]).expect("query");
        let records = [
            ("E1", "1", 30),
            ("E1", "2", 10),
            ("E2", "1", 40),
            ("E2", "2", 20),
        ]
        .map(|(area, sex, count)| Record {
            categories: vec![area.to_owned(), sex.to_owned()],
            count,
        });
        assemble_table(&query, &records, false).expect("table")
    }

    #[rstest]
    fn sums_by_dimension_in_first_seen_order(table: Table) {
        let summary = table.summarise_by("sex").expect("summary");
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].value, Cell::from("1"));
        assert_eq!(summary[0].count, 70);
        assert_eq!(summary[1].count, 30);
        assert!((summary[0].proportion - 0.7).abs() < 1e-9);
        assert!((summary[1].proportion - 0.3).abs() < 1e-9);
    }

    #[rstest]
    fn sums_by_area(table: Table) {
        let summary = table.summarise_by("rgn").expect("summary");
        let counts: Vec<i64> = summary.iter().map(|entry| entry.count).collect();
        assert_eq!(counts, [40, 60]);
    }

    #[rstest]
    fn unknown_column_is_an_error(table: Table) {
        let err = table.summarise_by("age").expect_err("should fail");
        assert_eq!(err, SummaryError::UnknownColumn("age".to_owned()));
    }

    #[rstest]
    fn zero_total_gives_zero_proportions() {
        let query = TableQuery::new("UR", "nat", ["sex"]).expect("query");
        let records = [Record {
            categories: vec!["K04000001".to_owned(), "1".to_owned()],
            count: 0,
        }];
        let table = assemble_table(&query, &records, true).expect("table");
        let summary = table.summarise_by("sex").expect("summary");
        assert_eq!(summary[0].proportion, 0.0);
    }
}
