//! URL construction for the population-type endpoints.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::constants::API_ROOT;
use crate::query::TableQuery;

/// Listing endpoints scoped to a single population type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `/{population_type}/area-types`
    AreaTypes,
    /// `/{population_type}/dimensions`
    Dimensions,
}

impl Feature {
    /// Path segment used by the API for this feature.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AreaTypes => "area-types",
            Self::Dimensions => "dimensions",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised when parsing an [`ApiRoot`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiRootError {
    /// The root was empty once trailing slashes were removed.
    #[error("API root must not be empty")]
    Empty,
    /// The root is not an absolute URL.
    #[error("API root {value:?} is not a valid URL: {source}")]
    Invalid {
        /// Rejected input.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
}

/// Root URL of the population-types API, without a trailing slash.
///
/// # Examples
/// ```
/// use census21api_core::ApiRoot;
///
/// let root = ApiRoot::parse("https://example.test/v1/population-types/")?;
/// assert_eq!(
///     root.area_type_categories("UR", "nat"),
///     "https://example.test/v1/population-types/UR/area-types/nat/areas",
/// );
/// # Ok::<(), census21api_core::ApiRootError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoot(String);

impl ApiRoot {
    /// Validate `value` as an absolute URL and strip trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiRootError`] when the value is empty or not a URL.
    pub fn parse(value: impl Into<String>) -> Result<Self, ApiRootError> {
        let raw = value.into();
        let trimmed = raw.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ApiRootError::Empty);
        }
        Url::parse(trimmed).map_err(|source| ApiRootError::Invalid {
            value: raw.clone(),
            source,
        })?;
        Ok(Self(trimmed.to_owned()))
    }

    /// URL of the population-type listing itself.
    #[must_use]
    pub fn population_types(&self) -> String {
        self.0.clone()
    }

    /// URL of a feature listing for `population_type`.
    #[must_use]
    pub fn feature(&self, population_type: &str, feature: Feature) -> String {
        format!("{}/{population_type}/{feature}", self.0)
    }

    /// URL listing the areas (categories) of an area type.
    #[must_use]
    pub fn area_type_categories(&self, population_type: &str, area_type: &str) -> String {
        format!("{}/{population_type}/area-types/{area_type}/areas", self.0)
    }

    /// URL listing the categorisations of a dimension.
    #[must_use]
    pub fn dimension_categories(&self, population_type: &str, dimension: &str) -> String {
        format!(
            "{}/{population_type}/dimensions/{dimension}/categorisations",
            self.0
        )
    }

    /// Observations URL for a custom table query.
    ///
    /// Dimensions keep their order and are joined with commas.
    #[must_use]
    pub fn observations(&self, query: &TableQuery) -> String {
        format!(
            "{}/{}/census-observations?area-type={}&dimensions={}",
            self.0,
            query.population_type(),
            query.area_type(),
            query.dimensions().join(",")
        )
    }
}

impl Default for ApiRoot {
    fn default() -> Self {
        Self(API_ROOT.to_owned())
    }
}

impl AsRef<str> for ApiRoot {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
