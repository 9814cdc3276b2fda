//! Blocking client over the population-types API.
//!
//! Every operation comes in two forms. The `try_*` form returns a
//! `Result` so callers can tell disclosure control from connectivity
//! problems. The plain form reports the error once through the client's
//! [`Diagnostics`] sink and returns `None`, which suits exploratory probing
//! where "no data" is an expected outcome.
//!
//! # Example
//!
//! ```no_run
//! use census21api_core::TableQuery;
//! use census21api_data::{CensusClient, HttpTransport};
//!
//! let client = CensusClient::new(HttpTransport::new()?);
//! let query = TableQuery::new("UR", "nat", ["sex"])?;
//! if let Some(table) = client.query_table(&query, true) {
//!     assert_eq!(table.columns(), ["nat", "sex", "count", "population_type"]);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use census21api_core::{
    ApiRoot, AreaType, Categorisation, Category, Dimension, Feature, Identified, Payload,
    PopulationType, Table, TableQuery, assemble_table, dedup_by_id, flatten_observations,
    retain_allowed,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::diagnostics::{Diagnostics, LogDiagnostics};
use crate::error::{FetchError, TableQueryError};
use crate::paginate::{DEFAULT_MAX_PAGES, fetch_all_items, with_query_param};
use crate::transport::Transport;
use crate::validate::validate_response;

/// Settings shared by every request a [`CensusClient`] makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the population-types API.
    pub api_root: ApiRoot,
    /// Page size requested from listing endpoints; `None` leaves it to the API.
    pub page_limit: Option<u32>,
    /// Ceiling on pages fetched for a single listing.
    pub max_pages: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: ApiRoot::default(),
            page_limit: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl ClientConfig {
    /// Set the API root.
    #[must_use]
    pub fn with_api_root(mut self, api_root: ApiRoot) -> Self {
        self.api_root = api_root;
        self
    }

    /// Request `limit` items per listing page.
    #[must_use]
    pub const fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Set the page ceiling.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// Client for the Census 2021 dataset API.
///
/// Holds no state between calls: each operation is a fresh request whose
/// result is returned to the caller.
#[derive(Debug)]
pub struct CensusClient<T, D = LogDiagnostics> {
    transport: T,
    config: ClientConfig,
    diagnostics: D,
}

impl<T: Transport> CensusClient<T> {
    /// Create a client with default settings that logs recovered failures.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a client with explicit settings.
    #[must_use]
    pub const fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            diagnostics: LogDiagnostics,
        }
    }
}

impl<T: Transport, D: Diagnostics> CensusClient<T, D> {
    /// Replace the diagnostics sink.
    #[must_use]
    pub fn with_diagnostics<E: Diagnostics>(self, diagnostics: E) -> CensusClient<T, E> {
        CensusClient {
            transport: self.transport,
            config: self.config,
            diagnostics,
        }
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Diagnostics sink.
    #[must_use]
    pub const fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// GET `url` and decode the body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when no response arrives, the status is not
    /// 2xx or the body is not JSON.
    pub fn try_get(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.transport.get(url)?;
        validate_response(url, &response)
    }

    /// GET `url` and decode the body, reporting failures.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<Value> {
        self.quietly(self.try_get(url))
    }

    /// List population types, optionally only those with microdata.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when any page of the listing fails.
    pub fn try_population_types(
        &self,
        microdata_only: bool,
    ) -> Result<Vec<PopulationType>, FetchError> {
        let url = self.config.api_root.population_types();
        let mut population_types: Vec<PopulationType> = self.try_items(&url)?;
        if microdata_only {
            population_types.retain(PopulationType::is_microdata);
        }
        Ok(population_types)
    }

    /// List population types, reporting failures.
    ///
    /// Returns `None` when the listing fails or lists nothing.
    #[must_use]
    pub fn population_types(&self, microdata_only: bool) -> Option<Vec<PopulationType>> {
        self.quietly_listing(self.try_population_types(microdata_only))
    }

    /// List the area types of `population_type`, keeping ids in `allowed`
    /// (everything when empty).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when any page of the listing fails.
    pub fn try_area_types<S: AsRef<str>>(
        &self,
        population_type: &str,
        allowed: &[S],
    ) -> Result<Vec<AreaType>, FetchError> {
        self.try_feature(population_type, Feature::AreaTypes, allowed)
    }

    /// List area types, reporting failures.
    ///
    /// Returns `None` when the listing fails or lists nothing.
    #[must_use]
    pub fn area_types<S: AsRef<str>>(
        &self,
        population_type: &str,
        allowed: &[S],
    ) -> Option<Vec<AreaType>> {
        self.quietly_listing(self.try_area_types(population_type, allowed))
    }

    /// List the dimensions of `population_type`, keeping ids in `allowed`
    /// (everything when empty).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when any page of the listing fails.
    pub fn try_dimensions<S: AsRef<str>>(
        &self,
        population_type: &str,
        allowed: &[S],
    ) -> Result<Vec<Dimension>, FetchError> {
        self.try_feature(population_type, Feature::Dimensions, allowed)
    }

    /// List dimensions, reporting failures.
    ///
    /// Returns `None` when the listing fails or lists nothing.
    #[must_use]
    pub fn dimensions<S: AsRef<str>>(
        &self,
        population_type: &str,
        allowed: &[S],
    ) -> Option<Vec<Dimension>> {
        self.quietly_listing(self.try_dimensions(population_type, allowed))
    }

    /// List the areas of `area_type`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when any page of the listing fails.
    pub fn try_area_type_categories<S: AsRef<str>>(
        &self,
        population_type: &str,
        area_type: &str,
        allowed: &[S],
    ) -> Result<Vec<Category>, FetchError> {
        let url = self
            .config
            .api_root
            .area_type_categories(population_type, area_type);
        let areas = self.try_items(&url)?;
        Ok(retain_allowed(areas, allowed))
    }

    /// List the areas of `area_type`, reporting failures.
    ///
    /// Returns `None` when the listing fails or lists nothing.
    #[must_use]
    pub fn area_type_categories<S: AsRef<str>>(
        &self,
        population_type: &str,
        area_type: &str,
        allowed: &[S],
    ) -> Option<Vec<Category>> {
        self.quietly_listing(self.try_area_type_categories(population_type, area_type, allowed))
    }

    /// List the categories of `dimension`.
    ///
    /// The categorisation named after the dimension is used when present,
    /// otherwise the first one listed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when any page of the listing fails.
    pub fn try_dimension_categories<S: AsRef<str>>(
        &self,
        population_type: &str,
        dimension: &str,
        allowed: &[S],
    ) -> Result<Vec<Category>, FetchError> {
        let url = self
            .config
            .api_root
            .dimension_categories(population_type, dimension);
        let categorisations: Vec<Categorisation> = self.try_items(&url)?;
        let categories = dedup_by_id(Categorisation::preferred(categorisations, dimension));
        Ok(retain_allowed(categories, allowed))
    }

    /// List the categories of `dimension`, reporting failures.
    ///
    /// Returns `None` when the listing fails or lists nothing.
    #[must_use]
    pub fn dimension_categories<S: AsRef<str>>(
        &self,
        population_type: &str,
        dimension: &str,
        allowed: &[S],
    ) -> Option<Vec<Category>> {
        self.quietly_listing(self.try_dimension_categories(population_type, dimension, allowed))
    }

    /// Fetch the observations for `query` and assemble them into a table.
    ///
    /// With `use_id`, category codes are used and integer codes become
    /// integer cells; otherwise category labels are used.
    ///
    /// # Errors
    ///
    /// Returns [`TableQueryError::Blocked`] when the combination is withheld
    /// for disclosure control, [`TableQueryError::Fetch`] when the
    /// observations cannot be fetched, and [`TableQueryError::Assemble`]
    /// when they do not match the requested columns.
    pub fn try_query_table(
        &self,
        query: &TableQuery,
        use_id: bool,
    ) -> Result<Table, TableQueryError> {
        let url = self.config.api_root.observations(query);
        let body = self.try_get(&url)?;
        match Payload::classify(body) {
            Payload::Observations(entries) => {
                let records = flatten_observations(&entries, use_id);
                Ok(assemble_table(query, &records, use_id)?)
            }
            Payload::Blocked { blocked_areas } => {
                Err(TableQueryError::Blocked { url, blocked_areas })
            }
            Payload::ErrorMarker(messages) => Err(FetchError::Api { url, messages }.into()),
            Payload::Malformed { key, message } => {
                Err(FetchError::Malformed { url, key, message }.into())
            }
            other @ (Payload::Listing(_) | Payload::Unrecognised { .. }) => {
                Err(FetchError::UnexpectedPayload {
                    url,
                    kind: other.kind(),
                }
                .into())
            }
        }
    }

    /// Fetch and assemble the table for `query`, reporting failures.
    #[must_use]
    pub fn query_table(&self, query: &TableQuery, use_id: bool) -> Option<Table> {
        self.quietly(self.try_query_table(query, use_id))
    }

    fn try_feature<R, S>(
        &self,
        population_type: &str,
        feature: Feature,
        allowed: &[S],
    ) -> Result<Vec<R>, FetchError>
    where
        R: DeserializeOwned + Identified,
        S: AsRef<str>,
    {
        let url = self.config.api_root.feature(population_type, feature);
        let items = self.try_items(&url)?;
        Ok(retain_allowed(items, allowed))
    }

    /// Fetch every page at `url` and decode the items, dropping repeated ids.
    fn try_items<R>(&self, url: &str) -> Result<Vec<R>, FetchError>
    where
        R: DeserializeOwned + Identified,
    {
        let first_page = self.config.page_limit.map_or_else(
            || url.to_owned(),
            |limit| with_query_param(url, "limit", limit),
        );
        let items = fetch_all_items(&self.transport, &first_page, self.config.max_pages)?;
        let decoded = items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|source| FetchError::InvalidItem {
                    url: url.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<R>, _>>()?;
        Ok(dedup_by_id(decoded))
    }

    /// An empty listing, or one without `items`, is no data rather than a
    /// failure and is not reported.
    fn quietly_listing<V>(&self, result: Result<Vec<V>, FetchError>) -> Option<Vec<V>> {
        match result {
            Ok(items) if items.is_empty() => None,
            Ok(items) => Some(items),
            Err(FetchError::MissingItems { url }) => {
                log::debug!("no items listed at {url}");
                None
            }
            Err(err) => {
                self.diagnostics.report(&err);
                None
            }
        }
    }

    fn quietly<V, E>(&self, result: Result<V, E>) -> Option<V>
    where
        E: std::error::Error + 'static,
    {
        result.inspect_err(|err| self.diagnostics.report(err)).ok()
    }
}

#[cfg(test)]
mod tests;
