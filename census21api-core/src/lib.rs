//! Core domain types for the Census 2021 dataset API client.
//!
//! Responsibilities:
//! - Model population types, area types, dimensions and categories.
//! - Build query URLs for the observations and metadata endpoints.
//! - Classify decoded payloads into a closed set of shapes.
//! - Flatten observations into records and assemble them into tables.
//!
//! Boundaries:
//! - No I/O. Fetching lives in `census21api-data`.
//!
//! Invariants:
//! - A table's columns are fixed by the query, never by response content.
#![forbid(unsafe_code)]

pub mod constants;
mod endpoint;
mod metadata;
mod payload;
mod query;
mod records;
mod summary;
mod table;

pub use endpoint::{ApiRoot, ApiRootError, Feature};
pub use metadata::{
    AreaType, Categorisation, Category, Dimension, Identified, PopulationType, dedup_by_id,
    retain_allowed,
};
pub use payload::{DimensionOption, Listing, ObservationEntry, Payload};
pub use query::{QueryError, TableQuery};
pub use records::{Record, flatten_observations};
pub use summary::{Summary, SummaryError};
pub use table::{COUNT_COLUMN, Cell, POPULATION_TYPE_COLUMN, Table, TableRow, assemble_table};
