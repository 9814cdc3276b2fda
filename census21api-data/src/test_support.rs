//! Test doubles for the census client.
//!
//! [`StubTransport`] answers GET requests from a fixed routing table and
//! records every URL it was asked for, so tests can assert on request
//! counts and offsets without a running API. [`RecordingDiagnostics`] and
//! [`MemorySink`] capture what the client reports and persists.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error as StdError;

use census21api_core::{Table, TableQuery};
use serde_json::{Value, json};

use crate::diagnostics::Diagnostics;
use crate::error::TransportError;
use crate::output::{SinkError, TableSink};
use crate::transport::{RawResponse, Transport};

/// Stub [`Transport`] serving canned responses per URL.
///
/// Unrouted URLs answer `404` with an empty JSON object.
///
/// # Example
///
/// ```
/// use census21api_data::test_support::StubTransport;
/// use census21api_data::Transport;
/// use serde_json::json;
///
/// let transport = StubTransport::new().with_json("https://example.test/a", &json!({"items": []}));
/// let response = transport.get("https://example.test/a").expect("routed");
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.requests(), ["https://example.test/a"]);
/// ```
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: HashMap<String, Result<RawResponse, TransportError>>,
    requests: RefCell<Vec<String>>,
}

impl StubTransport {
    /// Create a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `200` and `body` serialised as JSON.
    #[must_use]
    pub fn with_json(self, url: impl Into<String>, body: &Value) -> Self {
        self.with_response(url, RawResponse::new(200, body.to_string()))
    }

    /// Answer `url` with an arbitrary response.
    #[must_use]
    pub fn with_response(mut self, url: impl Into<String>, response: RawResponse) -> Self {
        self.routes.insert(url.into(), Ok(response));
        self
    }

    /// Fail requests for `url` with a transport error.
    #[must_use]
    pub fn with_error(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.routes.insert(url.into(), Err(error));
        self
    }

    /// Fail requests for `url` as though the network were down.
    #[must_use]
    pub fn with_network_failure(self, url: impl Into<String>) -> Self {
        let url = url.into();
        let error = TransportError::Network {
            url: url.clone(),
            message: "connection refused".to_owned(),
        };
        self.with_error(url, error)
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(url.to_owned());
        self.routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| Ok(RawResponse::new(404, "{}")))
    }
}

/// [`Diagnostics`] sink that keeps every reported message.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    messages: RefCell<Vec<String>>,
}

impl RecordingDiagnostics {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages reported so far, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, error: &(dyn StdError + 'static)) {
        self.messages.borrow_mut().push(error.to_string());
    }
}

/// [`TableSink`] that keeps persisted tables in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Persisted queries and tables, in order.
    pub tables: Vec<(TableQuery, Table)>,
}

impl TableSink for MemorySink {
    fn persist(&mut self, query: &TableQuery, table: &Table) -> Result<(), SinkError> {
        self.tables.push((query.clone(), table.clone()));
        Ok(())
    }
}

/// A listing page body.
#[must_use]
pub fn listing_page(items: &[Value], total_count: Option<usize>) -> Value {
    let mut body = json!({
        "items": items,
        "count": items.len(),
        "limit": items.len(),
        "offset": 0,
    });
    if let (Some(total), Value::Object(map)) = (total_count, &mut body) {
        map.insert("total_count".to_owned(), json!(total));
    }
    body
}

/// An item carrying only an `id` and `label`.
#[must_use]
pub fn labelled(id: &str, label: &str) -> Value {
    json!({"id": id, "label": label})
}

/// An observations body from `(categories, count)` pairs, where each
/// category is `(dimension_id, option_id, option)`.
#[must_use]
pub fn observations_body(rows: &[(&[(&str, &str, &str)], i64)]) -> Value {
    let observations: Vec<Value> = rows
        .iter()
        .map(|(categories, count)| {
            let dimensions: Vec<Value> = categories
                .iter()
                .map(|(dimension_id, option_id, option)| {
                    json!({
                        "dimension_id": dimension_id,
                        "option_id": option_id,
                        "option": option,
                    })
                })
                .collect();
            json!({"dimensions": dimensions, "observation": count})
        })
        .collect();
    json!({
        "observations": observations,
        "total_observations": rows.len(),
    })
}

/// A disclosure-control body reporting `blocked_areas` withheld areas.
#[must_use]
pub fn blocked_body(blocked_areas: u64) -> Value {
    json!({
        "blocked_areas": blocked_areas,
        "observations": null,
        "total_observations": 0,
    })
}
