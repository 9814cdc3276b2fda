//! Flatten nested observations into flat records.

use crate::payload::ObservationEntry;

/// One flattened observation: a category per dimension, then the count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Category codes or labels in the order the API listed the dimensions.
    pub categories: Vec<String>,
    /// Observed count.
    pub count: i64,
}

impl Record {
    /// Number of fields in the record, counting the trailing count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len() + 1
    }

    /// Always `false`: a record carries at least its count.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Flatten observations, selecting category codes when `use_id` is set and
/// labels otherwise. Observation and dimension order are preserved.
///
/// # Examples
/// ```
/// use census21api_core::{DimensionOption, ObservationEntry, flatten_observations};
///
/// let entries = vec![ObservationEntry {
///     dimensions: vec![DimensionOption {
///         dimension_id: Some("sex".into()),
///         option: "Female".into(),
///         option_id: "2".into(),
///     }],
///     observation: 10,
/// }];
/// let records = flatten_observations(&entries, true);
/// assert_eq!(records[0].categories, ["2"]);
/// assert_eq!(records[0].count, 10);
/// ```
#[must_use]
pub fn flatten_observations(entries: &[ObservationEntry], use_id: bool) -> Vec<Record> {
    entries
        .iter()
        .map(|entry| Record {
            categories: entry
                .dimensions
                .iter()
                .map(|option| {
                    if use_id {
                        option.option_id.clone()
                    } else {
                        option.option.clone()
                    }
                })
                .collect(),
            count: entry.observation,
        })
        .collect()
}
