//! Metadata entities listed by the API.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::payload::text_or_number;
use crate::table::{Cell, TableRow};

/// Entities addressed by a string identifier.
pub trait Identified {
    /// Identifier unique within the entity's scope.
    fn id(&self) -> &str;
}

/// A census cohort definition such as usual residents or households.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PopulationType {
    /// Identifier used in URLs (`name` in the API).
    #[serde(rename = "name")]
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Kind of population type (`type` in the API), e.g. `microdata`.
    #[serde(rename = "type", default)]
    pub category: String,
}

impl PopulationType {
    /// Whether custom tables can be built from this population type.
    #[must_use]
    pub fn is_microdata(&self) -> bool {
        self.category == "microdata"
    }
}

/// A geographic aggregation level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AreaType {
    /// Identifier, unique within the population type.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Number of areas of this type.
    #[serde(default)]
    pub total_count: Option<i64>,
    /// Position in the geographic hierarchy.
    #[serde(default)]
    pub hierarchy_order: Option<i64>,
}

/// A census variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Dimension {
    /// Identifier, unique within the population type.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Number of categories.
    #[serde(default)]
    pub total_count: Option<i64>,
}

/// One coded value of a dimension or area type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    /// Category code.
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
}

/// A grouping of a dimension's categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Categorisation {
    /// Categorisation identifier.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Categories in API order.
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Categorisation {
    /// Categories of the categorisation matching `dimension`, falling back
    /// to the first one listed.
    #[must_use]
    pub fn preferred(categorisations: Vec<Self>, dimension: &str) -> Vec<Category> {
        let position = categorisations
            .iter()
            .position(|categorisation| categorisation.id == dimension)
            .unwrap_or(0);
        categorisations
            .into_iter()
            .nth(position)
            .map(|categorisation| categorisation.categories)
            .unwrap_or_default()
    }
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

identified!(PopulationType, AreaType, Dimension, Category, Categorisation);

fn optional(value: Option<i64>) -> Cell {
    value.map_or_else(|| Cell::Text(String::new()), Cell::Integer)
}

impl TableRow for PopulationType {
    const COLUMNS: &'static [&'static str] = &["id", "label", "description", "type"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(self.id.as_str()),
            Cell::from(self.label.as_str()),
            Cell::from(self.description.as_str()),
            Cell::from(self.category.as_str()),
        ]
    }
}

impl TableRow for AreaType {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "label",
        "description",
        "total_count",
        "hierarchy_order",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(self.id.as_str()),
            Cell::from(self.label.as_str()),
            Cell::from(self.description.as_str()),
            optional(self.total_count),
            optional(self.hierarchy_order),
        ]
    }
}

impl TableRow for Dimension {
    const COLUMNS: &'static [&'static str] = &["id", "label", "description", "total_count"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(self.id.as_str()),
            Cell::from(self.label.as_str()),
            Cell::from(self.description.as_str()),
            optional(self.total_count),
        ]
    }
}

impl TableRow for Category {
    const COLUMNS: &'static [&'static str] = &["id", "label"];

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::from(self.id.as_str()), Cell::from(self.label.as_str())]
    }
}

/// Drop entities whose id was already seen, keeping the first occurrence.
#[must_use]
pub fn dedup_by_id<T: Identified>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_owned()))
        .collect()
}

/// Keep entities whose id is in `allowed`; an empty allow-list keeps all.
///
/// # Examples
/// ```
/// use census21api_core::{Category, retain_allowed};
///
/// let categories = vec![
///     Category { id: "1".into(), label: "Female".into() },
///     Category { id: "2".into(), label: "Male".into() },
/// ];
/// let kept = retain_allowed(categories, &["2"]);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].label, "Male");
/// ```
#[must_use]
pub fn retain_allowed<T, S>(items: Vec<T>, allowed: &[S]) -> Vec<T>
where
    T: Identified,
    S: AsRef<str>,
{
    if allowed.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| allowed.iter().any(|id| id.as_ref() == item.id()))
        .collect()
}
