//! Query every unordered pair of dimensions and persist the results.

use std::collections::BTreeSet;

use census21api_core::TableQuery;

use crate::client::CensusClient;
use crate::diagnostics::Diagnostics;
use crate::error::TableQueryError;
use crate::output::TableSink;
use crate::transport::Transport;

/// Outcome counts of a pair sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Tables persisted.
    pub written: usize,
    /// Pairs withheld for disclosure control.
    pub blocked: usize,
    /// Pairs that could not be fetched, assembled or persisted.
    pub unavailable: usize,
}

impl SweepReport {
    /// Pairs attempted.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.written + self.blocked + self.unavailable
    }
}

/// Every unordered pair of distinct dimensions, each once, in sorted order.
///
/// # Examples
/// ```
/// use census21api_data::dimension_pairs;
///
/// let pairs = dimension_pairs(&["sex", "age", "sex"]);
/// assert_eq!(pairs, [("age".to_owned(), "sex".to_owned())]);
/// ```
#[must_use]
pub fn dimension_pairs<S: AsRef<str>>(dimensions: &[S]) -> Vec<(String, String)> {
    let unique: Vec<&str> = dimensions
        .iter()
        .map(AsRef::as_ref)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    unique
        .iter()
        .enumerate()
        .flat_map(|(position, first)| {
            unique
                .iter()
                .skip(position + 1)
                .map(move |second| ((*first).to_owned(), (*second).to_owned()))
        })
        .collect()
}

/// Query each pair of `dimensions` for `population_type` at `area_type`,
/// persisting every table obtained.
///
/// Failures are reported through the client's diagnostics and skipped;
/// the sweep always visits every pair.
pub fn sweep_pairs<T, D, K, S>(
    client: &CensusClient<T, D>,
    sink: &mut K,
    population_type: &str,
    area_type: &str,
    dimensions: &[S],
    use_id: bool,
) -> SweepReport
where
    T: Transport,
    D: Diagnostics,
    K: TableSink + ?Sized,
    S: AsRef<str>,
{
    let mut report = SweepReport::default();
    for (first, second) in dimension_pairs(dimensions) {
        let outcome = TableQuery::new(population_type, area_type, [first, second])
            .map_err(TableQueryError::from)
            .and_then(|query| {
                client
                    .try_query_table(&query, use_id)
                    .map(|table| (query, table))
            });
        match outcome {
            Ok((query, table)) => match sink.persist(&query, &table) {
                Ok(()) => report.written += 1,
                Err(err) => {
                    client.diagnostics().report(&err);
                    report.unavailable += 1;
                }
            },
            Err(err) => {
                client.diagnostics().report(&err);
                if err.is_blocked() {
                    report.blocked += 1;
                } else {
                    report.unavailable += 1;
                }
            }
        }
    }
    log::info!(
        "swept {} pairs for {population_type} at {area_type}: {} written, {} blocked, {} unavailable",
        report.attempted(),
        report.written,
        report.blocked,
        report.unavailable
    );
    report
}
