//! Error types emitted by the `census21` CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use census21api_core::{ApiRootError, QueryError, SummaryError};
use census21api_data::{FetchError, SinkError, TableQueryError, TransportBuildError};
use thiserror::Error;

/// Errors emitted by the `census21` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass <{field}> or set {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A connection setting that must be at least one was zero.
    #[error("--{field} must be at least 1")]
    ZeroSetting {
        /// Flag name.
        field: &'static str,
    },
    /// The configured API root is not a URL.
    #[error(transparent)]
    InvalidApiRoot(#[from] ApiRootError),
    /// The HTTP transport could not be built.
    #[error("failed to build HTTP transport: {0}")]
    BuildTransport(#[from] TransportBuildError),
    /// A listing could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A table query yielded no table.
    #[error(transparent)]
    Query(#[from] TableQueryError),
    /// The query parameters were rejected.
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
    /// A summary could not be computed.
    #[error(transparent)]
    Summarise(#[from] SummaryError),
    /// A table could not be persisted.
    #[error(transparent)]
    Persist(#[from] SinkError),
    /// A table could not be written to the output stream.
    #[error("failed to write output: {0}")]
    WriteTable(#[from] csv::Error),
    /// A report line could not be written to the output stream.
    #[error("failed to write output: {0}")]
    WriteReport(#[from] std::io::Error),
    /// No dimensions are recorded for the population type.
    #[error("no dimensions are recorded for population type {population_type}")]
    UnknownPopulationType {
        /// Requested population type.
        population_type: String,
    },
    /// The recorded constants disagree with the API.
    #[error("recorded constants are out of date: {drifted} drifted, {unreachable} unreachable")]
    ConstantsOutOfDate {
        /// Subjects whose identifiers differ.
        drifted: usize,
        /// Subjects that could not be fetched.
        unreachable: usize,
    },
}
