//! `query` and `sweep` subcommands.

use std::io::Write;

use camino::Utf8PathBuf;
use census21api_core::{Summary, Table, TableQuery, constants};
use census21api_data::{CsvDirectorySink, DEFAULT_OUTPUT_DIR, TableSink, sweep_pairs};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_AREA_TYPE, ARG_DIMENSIONS, ARG_POPULATION_TYPE, CliError, Client, require, write_table,
};

pub(crate) const ARG_LABELS: &str = "labels";
pub(crate) const ARG_SUMMARISE: &str = "summarise";
pub(crate) const ARG_NO_CSV: &str = "no-csv";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";

pub(crate) const ENV_QUERY_POPULATION_TYPE: &str = "CENSUS21_CMDS_QUERY_POPULATION_TYPE";
pub(crate) const ENV_QUERY_AREA_TYPE: &str = "CENSUS21_CMDS_QUERY_AREA_TYPE";
pub(crate) const ENV_QUERY_DIMENSIONS: &str = "CENSUS21_CMDS_QUERY_DIMENSIONS";
pub(crate) const ENV_SWEEP_POPULATION_TYPE: &str = "CENSUS21_CMDS_SWEEP_POPULATION_TYPE";
pub(crate) const ENV_SWEEP_AREA_TYPE: &str = "CENSUS21_CMDS_SWEEP_AREA_TYPE";

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Build a custom table of counts for a population type, \
                 broken down by area and up to several dimensions. The table \
                 is printed as CSV and saved under the output directory.",
    about = "Build a custom table"
)]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct QueryArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Area type, e.g. `rgn`.
    #[arg(value_name = ARG_AREA_TYPE)]
    #[serde(default)]
    pub(crate) area_type: Option<String>,
    /// Dimensions to break the counts down by.
    #[arg(value_name = ARG_DIMENSIONS)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[ortho_config(merge_strategy = "replace")]
    pub(crate) dimensions: Vec<String>,
    /// Emit category labels instead of identifiers.
    #[arg(long = ARG_LABELS, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) labels: Option<bool>,
    /// Print totals grouped by this column instead of the table.
    #[arg(long = ARG_SUMMARISE, value_name = "column")]
    #[serde(default)]
    pub(crate) summarise: Option<String>,
    /// Do not save the table to the output directory.
    #[arg(long = ARG_NO_CSV, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) no_csv: Option<bool>,
    /// Directory receiving saved tables.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl QueryArgs {
    pub(crate) fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryConfig {
    pub(crate) query: TableQuery,
    pub(crate) use_id: bool,
    pub(crate) summarise: Option<String>,
    /// Directory receiving the table, `None` when saving is disabled.
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let population_type = require(
            args.population_type,
            ARG_POPULATION_TYPE,
            ENV_QUERY_POPULATION_TYPE,
        )?;
        let area_type = require(args.area_type, ARG_AREA_TYPE, ENV_QUERY_AREA_TYPE)?;
        if args.dimensions.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_DIMENSIONS,
                env: ENV_QUERY_DIMENSIONS,
            });
        }
        let query = TableQuery::new(population_type, area_type, args.dimensions)?;
        let output_dir = if args.no_csv.unwrap_or(false) {
            None
        } else {
            Some(
                args.output_dir
                    .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
            )
        };
        Ok(Self {
            query,
            use_id: !args.labels.unwrap_or(false),
            summarise: args.summarise,
            output_dir,
        })
    }
}

pub(crate) fn run_query(
    client: &Client,
    args: QueryArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let table = client.try_query_table(&config.query, config.use_id)?;
    log::debug!(
        "{} rows for {} by {} at {}",
        table.len(),
        config.query.population_type(),
        config.query.dimensions().join(", "),
        config.query.area_type()
    );
    let summary = config
        .summarise
        .as_deref()
        .map(|column| table.summarise_by(column).map(|summary| (column, summary)))
        .transpose()?;
    if let Some(dir) = config.output_dir {
        let mut sink = CsvDirectorySink::new(dir);
        sink.persist(&config.query, &table)?;
    }
    match summary {
        Some((column, summary)) => write_summary(writer, column, &summary),
        None => write_table(writer, &table),
    }
}

fn write_summary(
    writer: &mut dyn Write,
    column: &str,
    summary: &[Summary],
) -> Result<(), CliError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([column, "count", "proportion"])?;
    for entry in summary {
        csv_writer.write_record([
            entry.value.to_string(),
            entry.count.to_string(),
            format!("{:.6}", entry.proportion),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// CLI arguments for the `sweep` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Query every pair of the dimensions recorded for a \
                 population type and save each table obtained. Withheld \
                 and failing pairs are reported and skipped.",
    about = "Build a table for every pair of recorded dimensions"
)]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct SweepArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Area type, e.g. `rgn`.
    #[arg(value_name = ARG_AREA_TYPE)]
    #[serde(default)]
    pub(crate) area_type: Option<String>,
    /// Emit category labels instead of identifiers.
    #[arg(long = ARG_LABELS, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) labels: Option<bool>,
    /// Directory receiving saved tables.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl SweepArgs {
    pub(crate) fn into_config(self) -> Result<SweepConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SweepConfig::try_from(merged)
    }
}

/// Resolved `sweep` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SweepConfig {
    pub(crate) population_type: String,
    pub(crate) area_type: String,
    pub(crate) use_id: bool,
    pub(crate) output_dir: Utf8PathBuf,
}

impl TryFrom<SweepArgs> for SweepConfig {
    type Error = CliError;

    fn try_from(args: SweepArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            population_type: require(
                args.population_type,
                ARG_POPULATION_TYPE,
                ENV_SWEEP_POPULATION_TYPE,
            )?,
            area_type: require(args.area_type, ARG_AREA_TYPE, ENV_SWEEP_AREA_TYPE)?,
            use_id: !args.labels.unwrap_or(false),
            output_dir: args
                .output_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }
}

pub(crate) fn run_sweep(
    client: &Client,
    args: SweepArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let dimensions = constants::dimensions_for(&config.population_type);
    if dimensions.is_empty() {
        return Err(CliError::UnknownPopulationType {
            population_type: config.population_type,
        });
    }
    let mut sink = CsvDirectorySink::new(config.output_dir);
    let report = sweep_pairs(
        client,
        &mut sink,
        &config.population_type,
        &config.area_type,
        dimensions,
        config.use_id,
    );
    writeln!(
        writer,
        "{} pairs: {} written, {} blocked, {} unavailable",
        report.attempted(),
        report.written,
        report.blocked,
        report.unavailable
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<QueryConfig, CliError> {
    let merged = QueryArgs::merge_from_layers(layers).map_err(CliError::from)?;
    QueryConfig::try_from(merged)
}
