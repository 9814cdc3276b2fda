//! Tests for the census client.

use super::*;
use crate::test_support::{
    RecordingDiagnostics, StubTransport, blocked_body, labelled, listing_page, observations_body,
};
use crate::output::write_csv;
use crate::transport::RawResponse;
use census21api_core::Cell;
use rstest::{fixture, rstest};
use serde_json::json;

const ROOT: &str = "https://api.beta.ons.gov.uk/v1/population-types";
const UR_NAT_SEX: &str = "https://api.beta.ons.gov.uk/v1/population-types/UR/census-observations?area-type=nat&dimensions=sex";

#[fixture]
fn query() -> TableQuery {
    TableQuery::new("UR", "nat", ["sex"]).expect("valid query")
}

fn ur_nat_sex() -> Value {
    observations_body(&[
        (&[("nat", "K04000001", "England and Wales"), ("sex", "1", "Female")], 30_420_202),
        (&[("nat", "K04000001", "England and Wales"), ("sex", "2", "Male")], 29_177_340),
    ])
}

fn client(transport: StubTransport) -> CensusClient<StubTransport> {
    CensusClient::new(transport)
}

#[rstest]
fn query_round_trip_types_codes(query: TableQuery) {
    let client = client(StubTransport::new().with_json(UR_NAT_SEX, &ur_nat_sex()));

    let table = client.try_query_table(&query, true).expect("table");

    assert_eq!(table.columns(), ["nat", "sex", "count", "population_type"]);
    assert_eq!(table.len(), 2);
    let row = &table.rows()[0];
    assert_eq!(row[0], Cell::Text("K04000001".to_owned()));
    assert_eq!(row[1], Cell::Integer(1));
    assert_eq!(row[2], Cell::Integer(30_420_202));
    assert_eq!(row[3], Cell::Text("UR".to_owned()));
}

#[rstest]
fn query_with_labels_keeps_text(query: TableQuery) {
    let client = client(StubTransport::new().with_json(UR_NAT_SEX, &ur_nat_sex()));

    let table = client.try_query_table(&query, false).expect("table");

    assert_eq!(table.rows()[1][0], Cell::Text("England and Wales".to_owned()));
    assert_eq!(table.rows()[1][1], Cell::Text("Male".to_owned()));
}

#[rstest]
fn repeated_queries_give_equal_tables(query: TableQuery) {
    let client = client(StubTransport::new().with_json(UR_NAT_SEX, &ur_nat_sex()));

    let first = client.query_table(&query, true);
    let second = client.query_table(&query, true);

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(client.transport().requests().len(), 2);
}

#[rstest]
fn blocked_and_transport_failures_are_distinguishable(query: TableQuery) {
    let blocked = client(StubTransport::new().with_json(UR_NAT_SEX, &blocked_body(12)));
    let offline = client(StubTransport::new().with_network_failure(UR_NAT_SEX));

    let blocked_err = blocked.try_query_table(&query, true).expect_err("blocked");
    let offline_err = offline.try_query_table(&query, true).expect_err("offline");

    assert!(blocked_err.is_blocked());
    assert!(!offline_err.is_blocked());
    assert!(matches!(
        offline_err,
        TableQueryError::Fetch(FetchError::Transport(_))
    ));
    assert_ne!(blocked_err.to_string(), offline_err.to_string());
    assert!(blocked_err.to_string().starts_with("blocked pair"));
}

#[rstest]
fn blocked_query_reports_once(query: TableQuery) {
    let recorder = RecordingDiagnostics::new();
    let client =
        client(StubTransport::new().with_json(UR_NAT_SEX, &blocked_body(3))).with_diagnostics(&recorder);

    assert_eq!(client.query_table(&query, true), None);

    let messages = recorder.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("3 areas"));
}

#[rstest]
#[case::server_error(RawResponse::new(500, "oops"), "status code 500")]
#[case::not_json(RawResponse::new(200, "<html></html>"), "error decoding data")]
#[case::not_found(RawResponse::new(404, "{}"), "status code 404")]
fn unusable_responses_report_exactly_once(
    query: TableQuery,
    #[case] response: RawResponse,
    #[case] fragment: &str,
) {
    let recorder = RecordingDiagnostics::new();
    let client =
        client(StubTransport::new().with_response(UR_NAT_SEX, response)).with_diagnostics(&recorder);

    assert_eq!(client.query_table(&query, true), None);

    let messages = recorder.messages();
    assert_eq!(messages.len(), 1, "messages: {messages:?}");
    assert!(messages[0].contains(fragment), "message: {}", messages[0]);
}

#[rstest]
fn api_error_marker_yields_no_table(query: TableQuery) {
    let client = client(
        StubTransport::new().with_json(UR_NAT_SEX, &json!({"errors": ["invalid dimension"]})),
    );
    let err = client.try_query_table(&query, true).expect_err("error marker");
    assert!(matches!(err, TableQueryError::Fetch(FetchError::Api { .. })));
}

#[rstest]
fn mismatched_observations_yield_no_table(query: TableQuery) {
    let body = observations_body(&[(&[("nat", "K04000001", "England and Wales")], 1)]);
    let client = client(StubTransport::new().with_json(UR_NAT_SEX, &body));
    let err = client.try_query_table(&query, true).expect_err("width mismatch");
    assert!(matches!(err, TableQueryError::Assemble(_)));
}

#[rstest]
fn population_types_filter_to_microdata() {
    let body = listing_page(
        &[
            json!({"name": "UR", "label": "Usual residents", "type": "microdata"}),
            json!({"name": "UR_LSOA", "label": "Residents by LSOA", "type": "other"}),
            json!({"name": "UR", "label": "duplicate", "type": "microdata"}),
        ],
        Some(3),
    );
    let client = client(StubTransport::new().with_json(ROOT, &body));

    let all = client.try_population_types(false).expect("listing");
    let microdata = client.try_population_types(true).expect("listing");

    assert_eq!(all.len(), 2);
    assert_eq!(microdata.len(), 1);
    assert_eq!(microdata[0].id, "UR");
    assert_eq!(microdata[0].label, "Usual residents");
}

#[rstest]
fn allow_list_is_applied_after_fetch() {
    let url = format!("{ROOT}/UR/dimensions");
    let body = listing_page(
        &[labelled("sex", "Sex"), labelled("resident_age_6a", "Age")],
        Some(2),
    );
    let client = client(StubTransport::new().with_json(url.as_str(), &body));

    let dimensions = client.try_dimensions("UR", &["sex"]).expect("listing");

    assert_eq!(dimensions.len(), 1);
    assert_eq!(dimensions[0].id, "sex");
    assert_eq!(client.transport().requests(), [url]);
}

#[rstest]
fn page_limit_is_requested_on_listings() {
    let url = format!("{ROOT}/UR/area-types?limit=2");
    let body = listing_page(&[labelled("nat", "National"), labelled("rgn", "Regions")], Some(2));
    let config = ClientConfig::default().with_page_limit(2);
    let client = CensusClient::with_config(StubTransport::new().with_json(url.as_str(), &body), config);

    let area_types = client.try_area_types("UR", &[] as &[&str]).expect("listing");

    assert_eq!(area_types.len(), 2);
    assert_eq!(client.transport().requests(), [url]);
}

#[rstest]
fn area_type_categories_list_areas() {
    let url = format!("{ROOT}/UR/area-types/rgn/areas");
    let body = listing_page(
        &[labelled("E12000001", "North East"), labelled("W92000004", "Wales")],
        Some(2),
    );
    let client = client(StubTransport::new().with_json(url.as_str(), &body));

    let areas = client
        .try_area_type_categories("UR", "rgn", &["W92000004"])
        .expect("listing");

    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].label, "Wales");
}

#[rstest]
fn dimension_categories_flatten_the_matching_categorisation() {
    let url = format!("{ROOT}/UR/dimensions/sex/categorisations");
    let body = listing_page(
        &[json!({
            "id": "sex",
            "label": "Sex",
            "categories": [
                {"id": 1, "label": "Female"},
                {"id": 2, "label": "Male"}
            ]
        })],
        Some(1),
    );
    let client = client(StubTransport::new().with_json(url.as_str(), &body));

    let categories = client
        .try_dimension_categories("UR", "sex", &[] as &[&str])
        .expect("listing");

    let ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
}

#[rstest]
fn invalid_items_fail_the_listing() {
    let url = format!("{ROOT}/UR/dimensions");
    let body = listing_page(&[json!({"label": "no id"})], Some(1));
    let client = client(StubTransport::new().with_json(url.as_str(), &body));

    let err = client.try_dimensions("UR", &[] as &[&str]).expect_err("invalid item");
    assert!(matches!(err, FetchError::InvalidItem { .. }));
}

#[rstest]
fn plain_listing_reports_and_returns_none() {
    let recorder = RecordingDiagnostics::new();
    let client = client(StubTransport::new()).with_diagnostics(&recorder);

    assert_eq!(client.area_types("UR", &[] as &[&str]), None);
    assert_eq!(recorder.messages().len(), 1);
}

#[rstest]
fn get_returns_decoded_bodies() {
    let client = client(StubTransport::new().with_json(ROOT, &json!({"items": []})));
    assert_eq!(client.get(ROOT), Some(json!({"items": []})));
}

#[rstest]
#[case::empty_items(json!({"items": [], "count": 0, "total_count": 0}))]
#[case::no_items(json!({"count": 0}))]
fn listing_without_entries_is_no_data(#[case] body: Value) {
    let url = format!("{ROOT}/UR/dimensions");
    let recorder = RecordingDiagnostics::new();
    let client =
        client(StubTransport::new().with_json(url.as_str(), &body)).with_diagnostics(&recorder);

    assert_eq!(client.dimensions("UR", &[] as &[&str]), None);
    assert!(recorder.messages().is_empty(), "messages: {:?}", recorder.messages());
}

#[rstest]
fn empty_allow_list_match_is_no_data() {
    let url = format!("{ROOT}/UR/dimensions");
    let body = listing_page(&[labelled("sex", "Sex")], Some(1));
    let client = client(StubTransport::new().with_json(url.as_str(), &body));

    assert_eq!(client.dimensions("UR", &["religion_tb"]), None);
    assert!(
        client
            .try_dimensions("UR", &["religion_tb"])
            .expect("listing")
            .is_empty()
    );
}

#[rstest]
fn repeated_listings_give_identical_tables() {
    let url = format!("{ROOT}/UR/dimensions");
    let transport = StubTransport::new()
        .with_json(
            url.as_str(),
            &listing_page(&[labelled("sex", "Sex"), labelled("resident_age_6a", "Age")], Some(3)),
        )
        .with_json(
            format!("{url}?offset=2"),
            &listing_page(&[labelled("religion_tb", "Religion")], Some(3)),
        );
    let client = client(transport);

    let render = || {
        let dimensions = client.try_dimensions("UR", &[] as &[&str]).expect("listing");
        let mut bytes = Vec::new();
        write_csv(&mut bytes, &Table::from_rows(&dimensions)).expect("write csv");
        bytes
    };
    let first = render();
    let second = render();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(client.transport().requests().len(), 4);
}
