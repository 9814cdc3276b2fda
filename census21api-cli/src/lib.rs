//! Command-line interface for the Census 2021 dataset API.
#![forbid(unsafe_code)]

use std::io::Write;
use std::time::Duration;

use census21api_core::{ApiRoot, Table};
use census21api_data::{
    CensusClient, ClientConfig, HttpTransport, HttpTransportConfig, Transport, write_csv,
};
use clap::{Args, Parser, Subcommand};

mod check;
mod error;
mod metadata;
mod query;

pub use error::CliError;

use check::run_check_constants;
use metadata::{
    AreaCategoriesArgs, AreaTypesArgs, DimensionCategoriesArgs, DimensionsArgs,
    PopulationTypesArgs,
};
use query::{QueryArgs, SweepArgs};

const ARG_POPULATION_TYPE: &str = "population-type";
const ARG_AREA_TYPE: &str = "area-type";
const ARG_DIMENSION: &str = "dimension";
const ARG_DIMENSIONS: &str = "dimensions";
const ARG_API_ROOT: &str = "api-root";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_PAGE_LIMIT: &str = "page-limit";
const ARG_MAX_PAGES: &str = "max-pages";

/// Client over whichever transport the builder produced.
type Client = CensusClient<Box<dyn Transport>>;

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid or the command fails.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let mut stdout = std::io::stdout().lock();
    run_with(cli, &DefaultTransportBuilder, &mut stdout)
}

fn run_with(
    cli: Cli,
    builder: &dyn TransportBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let connection = ConnectionConfig::try_from(cli.connection)?;
    let transport = builder.build(&connection.transport)?;
    let client: Client = CensusClient::with_config(transport, connection.client);
    match cli.command {
        Command::PopulationTypes(args) => metadata::run_population_types(&client, args, writer),
        Command::AreaTypes(args) => metadata::run_area_types(&client, args, writer),
        Command::Dimensions(args) => metadata::run_dimensions(&client, args, writer),
        Command::AreaCategories(args) => metadata::run_area_categories(&client, args, writer),
        Command::DimensionCategories(args) => {
            metadata::run_dimension_categories(&client, args, writer)
        }
        Command::Query(args) => query::run_query(&client, args, writer),
        Command::Sweep(args) => query::run_sweep(&client, args, writer),
        Command::CheckConstants => run_check_constants(&client, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "census21",
    about = "Explore and query the England & Wales Census 2021 dataset API",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List population types.
    PopulationTypes(PopulationTypesArgs),
    /// List the area types of a population type.
    AreaTypes(AreaTypesArgs),
    /// List the dimensions of a population type.
    Dimensions(DimensionsArgs),
    /// List the areas of an area type.
    AreaCategories(AreaCategoriesArgs),
    /// List the categories of a dimension.
    DimensionCategories(DimensionCategoriesArgs),
    /// Build a custom table.
    Query(QueryArgs),
    /// Build a table for every pair of recorded dimensions.
    Sweep(SweepArgs),
    /// Compare the recorded constants with the live API.
    CheckConstants,
}

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
struct ConnectionArgs {
    /// Root URL of the population-types API.
    #[arg(long = ARG_API_ROOT, value_name = "url", global = true)]
    api_root: Option<String>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds", global = true)]
    timeout_secs: Option<u64>,
    /// Items requested per listing page.
    #[arg(long = ARG_PAGE_LIMIT, value_name = "items", global = true)]
    page_limit: Option<u32>,
    /// Maximum pages fetched for one listing.
    #[arg(long = ARG_MAX_PAGES, value_name = "pages", global = true)]
    max_pages: Option<usize>,
}

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConnectionConfig {
    client: ClientConfig,
    transport: HttpTransportConfig,
}

impl TryFrom<ConnectionArgs> for ConnectionConfig {
    type Error = CliError;

    fn try_from(args: ConnectionArgs) -> Result<Self, Self::Error> {
        let mut client = ClientConfig::default();
        if let Some(root) = args.api_root {
            client = client.with_api_root(ApiRoot::parse(root)?);
        }
        if let Some(limit) = positive(args.page_limit, ARG_PAGE_LIMIT)? {
            client = client.with_page_limit(limit);
        }
        if let Some(max_pages) = positive(args.max_pages, ARG_MAX_PAGES)? {
            client = client.with_max_pages(max_pages);
        }
        let mut transport = HttpTransportConfig::default();
        if let Some(secs) = positive(args.timeout_secs, ARG_TIMEOUT_SECS)? {
            transport = transport.with_timeout(Duration::from_secs(secs));
        }
        Ok(Self { client, transport })
    }
}

/// Builds the transport for the current invocation.
trait TransportBuilder {
    fn build(&self, config: &HttpTransportConfig) -> Result<Box<dyn Transport>, CliError>;
}

struct DefaultTransportBuilder;

impl TransportBuilder for DefaultTransportBuilder {
    fn build(&self, config: &HttpTransportConfig) -> Result<Box<dyn Transport>, CliError> {
        let transport = HttpTransport::with_config(config.clone())?;
        Ok(Box::new(transport))
    }
}

fn positive<T: Default + PartialEq>(
    value: Option<T>,
    field: &'static str,
) -> Result<Option<T>, CliError> {
    match value {
        Some(zero) if zero == T::default() => Err(CliError::ZeroSetting { field }),
        other => Ok(other),
    }
}

fn require<T>(value: Option<T>, field: &'static str, env: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::MissingArgument { field, env })
}

fn write_table(writer: &mut dyn Write, table: &Table) -> Result<(), CliError> {
    write_csv(writer, table)?;
    Ok(())
}

#[cfg(test)]
mod tests;
