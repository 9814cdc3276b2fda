//! Parameters of a custom table query.

use thiserror::Error;

use crate::table::{COUNT_COLUMN, POPULATION_TYPE_COLUMN};

/// Errors raised while building a query or assembling its table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// A table query needs at least one dimension.
    #[error("a table query requires at least one dimension")]
    NoDimensions,
    /// A flattened record does not have one category per requested column.
    #[error("record {index} has {actual} categories but the query expects {expected}")]
    RecordWidth {
        /// Position of the offending record.
        index: usize,
        /// Categories implied by the query (area type plus dimensions).
        expected: usize,
        /// Categories present in the record.
        actual: usize,
    },
}

/// A population type, area type and ordered dimension list.
///
/// Identifiers are not checked against the API; callers consult the
/// metadata fetchers (or [`crate::constants`]) for valid values.
///
/// # Examples
/// ```
/// use census21api_core::TableQuery;
///
/// let query = TableQuery::new("UR", "nat", ["sex"])?;
/// assert_eq!(query.columns(), ["nat", "sex", "count", "population_type"]);
/// # Ok::<(), census21api_core::QueryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableQuery {
    population_type: String,
    area_type: String,
    dimensions: Vec<String>,
}

impl TableQuery {
    /// Build a query, rejecting an empty dimension list.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NoDimensions`] when `dimensions` is empty.
    pub fn new<I, S>(
        population_type: impl Into<String>,
        area_type: impl Into<String>,
        dimensions: I,
    ) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dimensions: Vec<String> = dimensions.into_iter().map(Into::into).collect();
        if dimensions.is_empty() {
            return Err(QueryError::NoDimensions);
        }
        Ok(Self {
            population_type: population_type.into(),
            area_type: area_type.into(),
            dimensions,
        })
    }

    /// Population type the observations are drawn from.
    #[must_use]
    pub fn population_type(&self) -> &str {
        &self.population_type
    }

    /// Geographic aggregation level.
    #[must_use]
    pub fn area_type(&self) -> &str {
        &self.area_type
    }

    /// Requested dimensions in request order.
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Number of category values each observation carries: the area plus
    /// one per dimension.
    #[must_use]
    pub fn category_width(&self) -> usize {
        self.dimensions.len() + 1
    }

    /// Column names of the assembled table.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.dimensions.len() + 3);
        columns.push(self.area_type.clone());
        columns.extend(self.dimensions.iter().cloned());
        columns.push(COUNT_COLUMN.to_owned());
        columns.push(POPULATION_TYPE_COLUMN.to_owned());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_empty_dimensions() {
        let err = TableQuery::new("UR", "nat", Vec::<String>::new()).expect_err("should fail");
        assert_eq!(err, QueryError::NoDimensions);
    }

    #[rstest]
    fn columns_follow_fixed_order() {
        let query = TableQuery::new("HH", "rgn", ["hh_size_5a", "hh_tenure_9a"]).expect("query");
        assert_eq!(
            query.columns(),
            ["rgn", "hh_size_5a", "hh_tenure_9a", "count", "population_type"]
        );
        assert_eq!(query.category_width(), 3);
    }
}
