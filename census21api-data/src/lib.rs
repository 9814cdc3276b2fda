//! Data access for the Census 2021 dataset API.
//!
//! Responsibilities:
//! - Issue GET requests and decide which responses carry usable data.
//! - Accumulate paginated listings and decode metadata entities.
//! - Run table queries and hand the assembled tables to sinks.
//! - Verify the recorded constants against the live service.
//!
//! Boundaries:
//! - Domain rules (URL shapes, payload classification, flattening) live in
//!   `census21api-core`.
//! - No retries, authentication, rate limiting or caching.
//!
//! Invariants:
//! - The client holds no state between calls.
//! - A failing page fails the whole listing; partial results are never
//!   returned.
#![forbid(unsafe_code)]

mod check;
mod client;
mod diagnostics;
mod error;
mod output;
mod paginate;
mod sweep;
#[doc(hidden)]
pub mod test_support;
mod transport;
mod validate;

pub use check::{
    CheckEntry, CheckOutcome, CheckSubject, ConstantsReport, RecordedConstants, check_constants,
};
pub use client::{CensusClient, ClientConfig};
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use error::{FetchError, TableQueryError, TransportError};
pub use output::{
    CsvDirectorySink, DEFAULT_OUTPUT_DIR, SinkError, TableSink, csv_file_name, write_csv,
};
pub use paginate::{DEFAULT_MAX_PAGES, fetch_all_items, fetch_listing, with_query_param};
pub use sweep::{SweepReport, dimension_pairs, sweep_pairs};
pub use transport::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpTransport, HttpTransportConfig, RawResponse,
    Transport, TransportBuildError,
};
pub use validate::validate_response;
