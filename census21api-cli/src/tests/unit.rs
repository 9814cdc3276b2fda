//! Focused unit tests covering CLI configuration validation.

use super::*;
use crate::metadata::{
    ENV_AREA_CATEGORIES_AREA_TYPE, ENV_AREA_TYPES_POPULATION_TYPE,
    ENV_DIMENSION_CATEGORIES_DIMENSION, ListingConfig, dimensions_config_from_layers_for_test,
};
use crate::query::{
    ENV_QUERY_AREA_TYPE, ENV_QUERY_DIMENSIONS, ENV_SWEEP_POPULATION_TYPE, QueryConfig,
    SweepConfig, config_from_layers_for_test,
};
use camino::Utf8PathBuf;
use census21api_data::{DEFAULT_MAX_PAGES, DEFAULT_OUTPUT_DIR};
use rstest::rstest;

fn expect_missing(result: Result<impl std::fmt::Debug, CliError>, field: &str, env_var: &str) {
    match result.expect_err("missing field should error") {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn connection_defaults_match_library_defaults() {
    let config = ConnectionConfig::try_from(ConnectionArgs::default()).expect("defaults");
    assert_eq!(config.client, ClientConfig::default());
    assert_eq!(config.transport, HttpTransportConfig::default());
    assert_eq!(config.client.max_pages, DEFAULT_MAX_PAGES);
}

#[rstest]
fn connection_flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "census21",
        "dimensions",
        "UR",
        "--timeout-secs",
        "5",
        "--page-limit",
        "50",
        "--max-pages",
        "3",
        "--api-root",
        "http://localhost:8080/v1/population-types/",
    ])
    .expect("arguments should parse");
    let config = ConnectionConfig::try_from(cli.connection).expect("config");
    assert_eq!(config.transport.timeout, Duration::from_secs(5));
    assert_eq!(config.client.page_limit, Some(50));
    assert_eq!(config.client.max_pages, 3);
    assert_eq!(
        config.client.api_root,
        ApiRoot::parse("http://localhost:8080/v1/population-types").expect("root")
    );
}

#[rstest]
fn invalid_api_root_is_rejected() {
    let args = ConnectionArgs {
        api_root: Some("not a url".to_owned()),
        ..ConnectionArgs::default()
    };
    let err = ConnectionConfig::try_from(args).expect_err("invalid root should error");
    assert!(matches!(err, CliError::InvalidApiRoot(_)), "got {err:?}");
}

#[rstest]
#[case(&["--max-pages", "0"], ARG_MAX_PAGES)]
#[case(&["--page-limit", "0"], ARG_PAGE_LIMIT)]
#[case(&["--timeout-secs", "0"], ARG_TIMEOUT_SECS)]
fn zero_connection_settings_are_rejected(#[case] flags: &[&str], #[case] expected: &str) {
    let args = ["census21", "dimensions", "UR"]
        .into_iter()
        .chain(flags.iter().copied());
    let cli = Cli::try_parse_from(args).expect("arguments should parse");
    match ConnectionConfig::try_from(cli.connection).expect_err("zero should be rejected") {
        CliError::ZeroSetting { field } => assert_eq!(field, expected),
        other => panic!("expected ZeroSetting, found {other:?}"),
    }
}

#[rstest]
fn area_types_require_a_population_type() {
    expect_missing(
        ListingConfig::try_from(AreaTypesArgs::default()),
        ARG_POPULATION_TYPE,
        ENV_AREA_TYPES_POPULATION_TYPE,
    );
}

#[rstest]
fn area_categories_require_an_area_type() {
    let args = AreaCategoriesArgs {
        population_type: Some("UR".to_owned()),
        ..AreaCategoriesArgs::default()
    };
    expect_missing(
        ListingConfig::try_from(args),
        ARG_AREA_TYPE,
        ENV_AREA_CATEGORIES_AREA_TYPE,
    );
}

#[rstest]
fn dimension_categories_require_a_dimension() {
    let args = DimensionCategoriesArgs {
        population_type: Some("UR".to_owned()),
        ..DimensionCategoriesArgs::default()
    };
    expect_missing(
        ListingConfig::try_from(args),
        ARG_DIMENSION,
        ENV_DIMENSION_CATEGORIES_DIMENSION,
    );
}

#[rstest]
#[case(Some("UR"), None, &["sex"], ARG_AREA_TYPE, ENV_QUERY_AREA_TYPE)]
#[case(Some("UR"), Some("nat"), &[], ARG_DIMENSIONS, ENV_QUERY_DIMENSIONS)]
fn query_requires_every_positional(
    #[case] population_type: Option<&str>,
    #[case] area_type: Option<&str>,
    #[case] dimensions: &[&str],
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = QueryArgs {
        population_type: population_type.map(str::to_owned),
        area_type: area_type.map(str::to_owned),
        dimensions: dimensions.iter().map(|&d| d.to_owned()).collect(),
        ..QueryArgs::default()
    };
    expect_missing(QueryConfig::try_from(args), field, env_var);
}

#[rstest]
fn query_defaults_to_ids_and_the_default_output_dir() {
    let args = QueryArgs {
        population_type: Some("UR".to_owned()),
        area_type: Some("nat".to_owned()),
        dimensions: vec!["sex".to_owned()],
        ..QueryArgs::default()
    };
    let config = QueryConfig::try_from(args).expect("config");
    assert!(config.use_id);
    assert_eq!(config.output_dir, Some(Utf8PathBuf::from(DEFAULT_OUTPUT_DIR)));
    assert_eq!(config.query.dimensions(), ["sex"]);
}

#[rstest]
fn query_flags_parse_and_disable_saving() {
    let cli = Cli::try_parse_from([
        "census21", "query", "UR", "nat", "sex", "--labels", "--no-csv",
    ])
    .expect("arguments should parse");
    let Command::Query(args) = cli.command else {
        panic!("expected the query subcommand");
    };
    let config = QueryConfig::try_from(args).expect("config");
    assert!(!config.use_id);
    assert_eq!(config.output_dir, None);
}

#[rstest]
fn sweep_requires_a_population_type() {
    expect_missing(
        SweepConfig::try_from(SweepArgs::default()),
        ARG_POPULATION_TYPE,
        ENV_SWEEP_POPULATION_TYPE,
    );
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "population_type": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "population_type": "HH",
            "area_type": "ltla",
            "dimensions": ["hh_size_5a"],
            "output_dir": "from-file",
        }),
        None,
    );
    composer.push_environment(json!({
        "area_type": "rgn",
        "output_dir": "from-env",
    }));
    composer.push_cli(json!({
        "population_type": "UR",
        "dimensions": ["sex"],
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.query.population_type(), "UR");
    assert_eq!(config.query.area_type(), "rgn");
    assert_eq!(config.query.dimensions(), ["sex"]);
    assert_eq!(config.output_dir, Some(Utf8PathBuf::from("from-env")));
}

#[rstest]
fn merge_layers_replace_the_allow_list() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "population_type": "UR",
            "ids": ["resident_age_6a"],
        }),
        None,
    );
    composer.push_environment(json!({ "ids": ["religion_tb"] }));
    composer.push_cli(json!({ "ids": ["sex", "hh_size_5a"] }));

    let config = dimensions_config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.population_type, "UR");
    assert_eq!(config.ids, ["sex", "hh_size_5a"]);
}

#[rstest]
fn merge_layers_keep_lower_allow_list_when_cli_is_silent() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(json!({ "population_type": "UR", "ids": ["sex"] }), None);
    composer.push_cli(json!({ "population_type": "HH" }));

    let config = dimensions_config_from_layers_for_test(composer.layers())
        .expect("merged config should build");
    assert_eq!(config.population_type, "HH");
    assert_eq!(config.ids, ["sex"]);
}
