//! Facade crate for the Census 2021 dataset API client.
//!
//! This crate re-exports the core domain types and, behind the `http`
//! feature, the client that fetches them.

#![forbid(unsafe_code)]

pub use census21api_core::{
    ApiRoot, AreaType, Categorisation, Category, Cell, Dimension, Feature, Identified,
    PopulationType, QueryError, Summary, SummaryError, Table, TableQuery, TableRow, constants,
};

#[cfg(feature = "http")]
pub use census21api_data::{
    CensusClient, ClientConfig, CsvDirectorySink, Diagnostics, FetchError, HttpTransport,
    HttpTransportConfig, LogDiagnostics, SweepReport, TableQueryError, TableSink, Transport,
    TransportError, sweep_pairs,
};
