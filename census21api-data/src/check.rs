//! Compare the recorded constants with what the API currently lists.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use census21api_core::{Feature, Identified, constants};

use crate::client::CensusClient;
use crate::diagnostics::Diagnostics;
use crate::error::FetchError;
use crate::transport::Transport;

/// Identifier lists to verify against the API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedConstants {
    /// Microdata population types.
    pub population_types: Vec<String>,
    /// Area types keyed by population type.
    pub area_types: BTreeMap<String, Vec<String>>,
    /// Dimensions keyed by population type.
    pub dimensions: BTreeMap<String, Vec<String>>,
}

impl RecordedConstants {
    /// The lists shipped in [`census21api_core::constants`].
    #[must_use]
    pub fn current() -> Self {
        let owned = |ids: &[&str]| ids.iter().map(|&id| id.to_owned()).collect::<Vec<_>>();
        let population_types = owned(constants::POPULATION_TYPES);
        let area_types = population_types
            .iter()
            .map(|pt| (pt.clone(), owned(constants::area_types_for(pt))))
            .collect();
        let dimensions = population_types
            .iter()
            .map(|pt| (pt.clone(), owned(constants::dimensions_for(pt))))
            .collect();
        Self {
            population_types,
            area_types,
            dimensions,
        }
    }

    fn feature(&self, feature: Feature) -> &BTreeMap<String, Vec<String>> {
        match feature {
            Feature::AreaTypes => &self.area_types,
            Feature::Dimensions => &self.dimensions,
        }
    }
}

/// What a check entry compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSubject {
    /// The microdata population types.
    PopulationTypes,
    /// A feature listing of one population type.
    Feature {
        /// Population type whose listing was compared.
        population_type: String,
        /// Listing compared.
        feature: Feature,
    },
}

impl fmt::Display for CheckSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PopulationTypes => f.write_str("population types"),
            Self::Feature {
                population_type,
                feature,
            } => {
                let label = match feature {
                    Feature::AreaTypes => "area types",
                    Feature::Dimensions => "dimensions",
                };
                write!(f, "{label} for {population_type}")
            }
        }
    }
}

/// Result of comparing one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Recorded and live identifiers agree.
    UpToDate,
    /// The sets differ.
    Drifted {
        /// Live identifiers missing from the constants.
        unrecorded: Vec<String>,
        /// Recorded identifiers the API no longer lists.
        withdrawn: Vec<String>,
    },
    /// The live listing could not be fetched.
    Unreachable(String),
}

/// One compared subject and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// What was compared.
    pub subject: CheckSubject,
    /// How it compared.
    pub outcome: CheckOutcome,
}

impl fmt::Display for CheckEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CheckOutcome::UpToDate => write!(f, "{}: up to date", self.subject),
            CheckOutcome::Drifted {
                unrecorded,
                withdrawn,
            } => write!(
                f,
                "{}: unrecorded [{}], withdrawn [{}]",
                self.subject,
                unrecorded.join(", "),
                withdrawn.join(", ")
            ),
            CheckOutcome::Unreachable(reason) => {
                write!(f, "{}: unreachable: {reason}", self.subject)
            }
        }
    }
}

/// Outcome of [`check_constants`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantsReport {
    /// Entries in check order.
    pub entries: Vec<CheckEntry>,
}

impl ConstantsReport {
    /// Whether every subject was reachable and agreed.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.outcome == CheckOutcome::UpToDate)
    }

    /// Entries whose sets differ.
    pub fn drifted(&self) -> impl Iterator<Item = &CheckEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, CheckOutcome::Drifted { .. }))
    }

    /// Entries that could not be fetched.
    pub fn unreachable(&self) -> impl Iterator<Item = &CheckEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, CheckOutcome::Unreachable(_)))
    }
}

/// Compare `recorded` with the live microdata population types and the
/// area types and dimensions of each recorded population type.
///
/// Unreachable listings are recorded and the check carries on.
pub fn check_constants<T, D>(
    client: &CensusClient<T, D>,
    recorded: &RecordedConstants,
) -> ConstantsReport
where
    T: Transport,
    D: Diagnostics,
{
    let mut entries = vec![CheckEntry {
        subject: CheckSubject::PopulationTypes,
        outcome: compare(
            client.try_population_types(true),
            &recorded.population_types,
        ),
    }];

    for feature in [Feature::AreaTypes, Feature::Dimensions] {
        for population_type in &recorded.population_types {
            let expected = recorded
                .feature(feature)
                .get(population_type)
                .map_or(&[][..], Vec::as_slice);
            let outcome = match feature {
                Feature::AreaTypes => compare(
                    client.try_area_types(population_type, &[] as &[&str]),
                    expected,
                ),
                Feature::Dimensions => compare(
                    client.try_dimensions(population_type, &[] as &[&str]),
                    expected,
                ),
            };
            entries.push(CheckEntry {
                subject: CheckSubject::Feature {
                    population_type: population_type.clone(),
                    feature,
                },
                outcome,
            });
        }
    }

    for entry in &entries {
        match entry.outcome {
            CheckOutcome::UpToDate => log::info!("{entry}"),
            _ => log::warn!("{entry}"),
        }
    }
    ConstantsReport { entries }
}

fn compare<I: Identified>(live: Result<Vec<I>, FetchError>, recorded: &[String]) -> CheckOutcome {
    let items = match live {
        Ok(items) => items,
        Err(err) => return CheckOutcome::Unreachable(err.to_string()),
    };
    let available: BTreeSet<&str> = items.iter().map(Identified::id).collect();
    let expected: BTreeSet<&str> = recorded.iter().map(String::as_str).collect();
    if available == expected {
        return CheckOutcome::UpToDate;
    }
    CheckOutcome::Drifted {
        unrecorded: available
            .difference(&expected)
            .map(|&id| id.to_owned())
            .collect(),
        withdrawn: expected
            .difference(&available)
            .map(|&id| id.to_owned())
            .collect(),
    }
}
