//! Listing subcommands: population types, area types, dimensions and
//! their categories.

use std::io::Write;

use census21api_core::Table;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_AREA_TYPE, ARG_DIMENSION, ARG_POPULATION_TYPE, CliError, Client, require, write_table,
};

pub(crate) const ENV_AREA_TYPES_POPULATION_TYPE: &str = "CENSUS21_CMDS_AREA_TYPES_POPULATION_TYPE";
pub(crate) const ENV_DIMENSIONS_POPULATION_TYPE: &str = "CENSUS21_CMDS_DIMENSIONS_POPULATION_TYPE";
pub(crate) const ENV_AREA_CATEGORIES_POPULATION_TYPE: &str =
    "CENSUS21_CMDS_AREA_CATEGORIES_POPULATION_TYPE";
pub(crate) const ENV_AREA_CATEGORIES_AREA_TYPE: &str = "CENSUS21_CMDS_AREA_CATEGORIES_AREA_TYPE";
pub(crate) const ENV_DIMENSION_CATEGORIES_POPULATION_TYPE: &str =
    "CENSUS21_CMDS_DIMENSION_CATEGORIES_POPULATION_TYPE";
pub(crate) const ENV_DIMENSION_CATEGORIES_DIMENSION: &str =
    "CENSUS21_CMDS_DIMENSION_CATEGORIES_DIMENSION";

/// CLI arguments for the `population-types` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List population types (microdata only unless --all)")]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct PopulationTypesArgs {
    /// Include population types without microdata.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    #[serde(default)]
    pub(crate) all: Option<bool>,
}

/// CLI arguments for the `area-types` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the area types of a population type")]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct AreaTypesArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Only list these area types.
    #[arg(value_name = "id")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[ortho_config(merge_strategy = "replace")]
    pub(crate) ids: Vec<String>,
}

/// CLI arguments for the `dimensions` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the dimensions of a population type")]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct DimensionsArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Only list these dimensions.
    #[arg(value_name = "id")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[ortho_config(merge_strategy = "replace")]
    pub(crate) ids: Vec<String>,
}

/// CLI arguments for the `area-categories` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the areas of an area type")]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct AreaCategoriesArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Area type, e.g. `rgn`.
    #[arg(value_name = ARG_AREA_TYPE)]
    #[serde(default)]
    pub(crate) area_type: Option<String>,
}

/// CLI arguments for the `dimension-categories` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the categories of a dimension")]
#[ortho_config(prefix = "CENSUS21")]
pub(crate) struct DimensionCategoriesArgs {
    /// Population type, e.g. `UR`.
    #[arg(value_name = ARG_POPULATION_TYPE)]
    #[serde(default)]
    pub(crate) population_type: Option<String>,
    /// Dimension, e.g. `sex`.
    #[arg(value_name = ARG_DIMENSION)]
    #[serde(default)]
    pub(crate) dimension: Option<String>,
}

/// Resolved arguments of a metadata listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListingConfig {
    pub(crate) population_type: String,
    /// Area type or dimension whose categories are listed.
    pub(crate) parent: Option<String>,
    pub(crate) ids: Vec<String>,
}

impl TryFrom<AreaTypesArgs> for ListingConfig {
    type Error = CliError;

    fn try_from(args: AreaTypesArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            population_type: require(
                args.population_type,
                ARG_POPULATION_TYPE,
                ENV_AREA_TYPES_POPULATION_TYPE,
            )?,
            parent: None,
            ids: args.ids,
        })
    }
}

impl TryFrom<DimensionsArgs> for ListingConfig {
    type Error = CliError;

    fn try_from(args: DimensionsArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            population_type: require(
                args.population_type,
                ARG_POPULATION_TYPE,
                ENV_DIMENSIONS_POPULATION_TYPE,
            )?,
            parent: None,
            ids: args.ids,
        })
    }
}

impl TryFrom<AreaCategoriesArgs> for ListingConfig {
    type Error = CliError;

    fn try_from(args: AreaCategoriesArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            population_type: require(
                args.population_type,
                ARG_POPULATION_TYPE,
                ENV_AREA_CATEGORIES_POPULATION_TYPE,
            )?,
            parent: Some(require(
                args.area_type,
                ARG_AREA_TYPE,
                ENV_AREA_CATEGORIES_AREA_TYPE,
            )?),
            ids: Vec::new(),
        })
    }
}

impl TryFrom<DimensionCategoriesArgs> for ListingConfig {
    type Error = CliError;

    fn try_from(args: DimensionCategoriesArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            population_type: require(
                args.population_type,
                ARG_POPULATION_TYPE,
                ENV_DIMENSION_CATEGORIES_POPULATION_TYPE,
            )?,
            parent: Some(require(
                args.dimension,
                ARG_DIMENSION,
                ENV_DIMENSION_CATEGORIES_DIMENSION,
            )?),
            ids: Vec::new(),
        })
    }
}

macro_rules! into_listing_config {
    ($($args:ty),+ $(,)?) => {
        $(impl $args {
            pub(crate) fn into_config(self) -> Result<ListingConfig, CliError> {
                let merged = self.load_and_merge().map_err(CliError::Configuration)?;
                ListingConfig::try_from(merged)
            }
        })+
    };
}

into_listing_config!(
    AreaTypesArgs,
    DimensionsArgs,
    AreaCategoriesArgs,
    DimensionCategoriesArgs,
);

pub(crate) fn run_population_types(
    client: &Client,
    args: PopulationTypesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let microdata_only = !merged.all.unwrap_or(false);
    let population_types = client.try_population_types(microdata_only)?;
    write_table(writer, &Table::from_rows(&population_types))
}

pub(crate) fn run_area_types(
    client: &Client,
    args: AreaTypesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let area_types = client.try_area_types(&config.population_type, &config.ids)?;
    write_table(writer, &Table::from_rows(&area_types))
}

pub(crate) fn run_dimensions(
    client: &Client,
    args: DimensionsArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let dimensions = client.try_dimensions(&config.population_type, &config.ids)?;
    write_table(writer, &Table::from_rows(&dimensions))
}

pub(crate) fn run_area_categories(
    client: &Client,
    args: AreaCategoriesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let area_type = config.parent.unwrap_or_default();
    let areas = client.try_area_type_categories(
        &config.population_type,
        &area_type,
        &config.ids,
    )?;
    write_table(writer, &Table::from_rows(&areas))
}

pub(crate) fn run_dimension_categories(
    client: &Client,
    args: DimensionCategoriesArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let dimension = config.parent.unwrap_or_default();
    let categories = client.try_dimension_categories(
        &config.population_type,
        &dimension,
        &config.ids,
    )?;
    write_table(writer, &Table::from_rows(&categories))
}

#[cfg(test)]
pub(crate) fn dimensions_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ListingConfig, CliError> {
    let merged = DimensionsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ListingConfig::try_from(merged)
}
