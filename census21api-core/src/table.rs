//! Tabular results with named columns.

use std::fmt;

use serde::Serialize;

use crate::query::{QueryError, TableQuery};
use crate::records::Record;

/// Name of the observation count column.
pub const COUNT_COLUMN: &str = "count";
/// Name of the column stamped with the queried population type.
pub const POPULATION_TYPE_COLUMN: &str = "population_type";

/// A single table value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Free text, labels and non-numeric codes.
    Text(String),
    /// Counts and numeric codes.
    Integer(i64),
}

impl Cell {
    /// Integer value of the cell, parsing text when it holds a number.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.parse().ok(),
        }
    }

    /// Type `value` as an integer when it is the canonical rendering of one.
    ///
    /// Codes with leading zeros or signs stay textual so that no
    /// information is lost.
    #[must_use]
    pub fn numeric_or_text(value: &str) -> Self {
        value
            .parse::<i64>()
            .ok()
            .filter(|number| number.to_string() == value)
            .map_or_else(|| Self::Text(value.to_owned()), Self::Integer)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Typed records that can be rendered as table rows.
pub trait TableRow {
    /// Column names, in row order.
    const COLUMNS: &'static [&'static str];

    /// Cells of this record, one per entry in [`Self::COLUMNS`].
    fn cells(&self) -> Vec<Cell>;
}

/// Rows of cells under named columns.
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table from typed records.
    #[must_use]
    pub fn from_rows<R: TableRow>(records: &[R]) -> Self {
        Self {
            columns: R::COLUMNS.iter().map(|&name| name.to_owned()).collect(),
            rows: records.iter().map(TableRow::cells).collect(),
        }
    }

    /// Column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Values of the column called `name`, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }
}

/// Assemble flattened records into the observation table for `query`.
///
/// Columns are `[area_type, *dimensions, "count", "population_type"]` and
/// every row is stamped with the queried population type. With `use_id`,
/// category codes that are integers become [`Cell::Integer`].
///
/// # Errors
///
/// Returns [`QueryError::RecordWidth`] when a record does not carry one
/// category for the area type and each dimension.
///
/// # Examples
/// ```
/// use census21api_core::{Cell, Record, TableQuery, assemble_table};
///
/// let query = TableQuery::new("UR", "nat", ["sex"])?;
/// let records = vec![Record {
///     categories: vec!["K04000001".into(), "2".into()],
///     count: 30_420_202,
/// }];
/// let table = assemble_table(&query, &records, true)?;
/// assert_eq!(table.rows()[0][1], Cell::Integer(2));
/// # Ok::<(), census21api_core::QueryError>(())
/// ```
pub fn assemble_table(
    query: &TableQuery,
    records: &[Record],
    use_id: bool,
) -> Result<Table, QueryError> {
    let expected = query.category_width();
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            if record.categories.len() != expected {
                return Err(QueryError::RecordWidth {
                    index,
                    expected,
                    actual: record.categories.len(),
                });
            }
            let mut row: Vec<Cell> = record
                .categories
                .iter()
                .map(|category| {
                    if use_id {
                        Cell::numeric_or_text(category)
                    } else {
                        Cell::Text(category.clone())
                    }
                })
                .collect();
            row.push(Cell::Integer(record.count));
            row.push(Cell::Text(query.population_type().to_owned()));
            Ok(row)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table {
        columns: query.columns(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn query() -> TableQuery {
        TableQuery::new("UR", "nat", ["sex"]).expect("valid query")
    }

    fn record(area: &str, sex: &str, count: i64) -> Record {
        Record {
            categories: vec![area.to_owned(), sex.to_owned()],
            count,
        }
    }

    #[rstest]
    fn round_trip_single_observation(query: TableQuery) {
        let table = assemble_table(&query, &[record("K04000001", "2", 30_420_202)], true)
            .expect("table should assemble");

        assert_eq!(table.columns(), ["nat", "sex", "count", "population_type"]);
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row[0], Cell::Text("K04000001".to_owned()));
        assert_eq!(row[1], Cell::Integer(2));
        assert_eq!(row[1].to_string(), "2");
        assert_eq!(row[2], Cell::Integer(30_420_202));
        assert_eq!(row[3], Cell::Text("UR".to_owned()));
    }

    #[rstest]
    fn labels_stay_textual(query: TableQuery) {
        let table = assemble_table(&query, &[record("England and Wales", "1", 5)], false)
            .expect("table should assemble");
        assert_eq!(table.rows()[0][1], Cell::Text("1".to_owned()));
        assert_eq!(table.rows()[0][2], Cell::Integer(5));
    }

    #[rstest]
    fn every_row_is_stamped(query: TableQuery) {
        let records = [record("a", "1", 1), record("a", "2", 2), record("b", "1", 3)];
        let table = assemble_table(&query, &records, true).expect("table should assemble");
        let stamps = table.column(POPULATION_TYPE_COLUMN).expect("column exists");
        assert!(stamps.iter().all(|cell| **cell == Cell::Text("UR".to_owned())));
    }

    #[rstest]
    fn rejects_records_of_the_wrong_width(query: TableQuery) {
        let short = Record {
            categories: vec!["K04000001".to_owned()],
            count: 1,
        };
        let err = assemble_table(&query, &[record("a", "1", 1), short], true)
            .expect_err("width mismatch should fail");
        assert_eq!(
            err,
            QueryError::RecordWidth {
                index: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[rstest]
    #[case("2", Cell::Integer(2))]
    #[case("-7", Cell::Integer(-7))]
    #[case("02", Cell::Text("02".to_owned()))]
    #[case("+2", Cell::Text("+2".to_owned()))]
    #[case("E12000001", Cell::Text("E12000001".to_owned()))]
    fn numeric_detection(#[case] input: &str, #[case] expected: Cell) {
        assert_eq!(Cell::numeric_or_text(input), expected);
    }
}
