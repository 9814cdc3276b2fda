//! Closed classification of decoded API payloads.
//!
//! Every usable response body is resolved into exactly one [`Payload`]
//! variant by inspecting a fixed set of keys, in this order:
//!
//! | precedence | condition                                             | variant          |
//! |------------|-------------------------------------------------------|------------------|
//! | 1          | `errors` present                                      | `ErrorMarker`    |
//! | 2          | `blocked_areas` non-zero, or present with no `observations` | `Blocked`  |
//! | 3          | `observations` is an array                            | `Observations`   |
//! | 4          | `items` is an array                                   | `Listing`        |
//! | 5          | anything else (including non-objects)                 | `Unrecognised`   |
//!
//! Arrays that fail to decode into their typed form yield `Malformed`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Raw items in arrival order.
    pub items: Vec<Value>,
    /// Items on this page, when reported.
    pub count: Option<u64>,
    /// Items across all pages, when reported.
    pub total_count: Option<u64>,
}

impl Listing {
    /// Items on this page, falling back to the length of `items`.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.count
            .unwrap_or_else(|| u64::try_from(self.items.len()).unwrap_or(u64::MAX))
    }
}

/// The category selected for one dimension of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DimensionOption {
    /// Dimension (or area type) the option belongs to.
    #[serde(default)]
    pub dimension_id: Option<String>,
    /// Human-readable category label.
    #[serde(deserialize_with = "text_or_number")]
    pub option: String,
    /// Category code.
    #[serde(deserialize_with = "text_or_number")]
    pub option_id: String,
}

/// A single cross-tabulated count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObservationEntry {
    /// Selected categories, area type first, then dimensions in query order.
    pub dimensions: Vec<DimensionOption>,
    /// Number of people or households in this cell.
    pub observation: i64,
}

/// Shapes a usable response body can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A page of a listing endpoint.
    Listing(Listing),
    /// Observations of a custom table query.
    Observations(Vec<ObservationEntry>),
    /// The API reported errors in the body.
    ErrorMarker(Vec<String>),
    /// The combination was withheld for disclosure control.
    Blocked {
        /// Number of areas reported as blocked.
        blocked_areas: u64,
    },
    /// A recognised key held data of the wrong shape.
    Malformed {
        /// Key whose value failed to decode.
        key: &'static str,
        /// Decoder message.
        message: String,
    },
    /// None of the known keys were present.
    Unrecognised {
        /// Top-level keys of the body, for diagnostics.
        keys: Vec<String>,
    },
}

impl Payload {
    /// Resolve a decoded body into its payload variant.
    ///
    /// # Examples
    /// ```
    /// use census21api_core::Payload;
    /// use serde_json::json;
    ///
    /// let payload = Payload::classify(json!({"blocked_areas": 3, "observations": null}));
    /// assert_eq!(payload, Payload::Blocked { blocked_areas: 3 });
    /// ```
    #[must_use]
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::Unrecognised { keys: Vec::new() };
        };
        let keys: Vec<String> = map.keys().cloned().collect();

        if let Some(errors) = map.remove("errors") {
            return Self::ErrorMarker(error_messages(errors));
        }
        if let Some(blocked_areas) = blocked_areas(&map) {
            return Self::Blocked { blocked_areas };
        }
        if let Some(Value::Array(entries)) = map.remove("observations") {
            return serde_json::from_value(Value::Array(entries)).map_or_else(
                |err| Self::Malformed {
                    key: "observations",
                    message: err.to_string(),
                },
                Self::Observations,
            );
        }
        if let Some(Value::Array(items)) = map.remove("items") {
            return Self::Listing(Listing {
                items,
                count: map.get("count").and_then(Value::as_u64),
                total_count: map.get("total_count").and_then(Value::as_u64),
            });
        }
        Self::Unrecognised { keys }
    }

    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Listing(_) => "listing",
            Self::Observations(_) => "observations",
            Self::ErrorMarker(_) => "error marker",
            Self::Blocked { .. } => "blocked marker",
            Self::Malformed { .. } => "malformed payload",
            Self::Unrecognised { .. } => "unrecognised payload",
        }
    }
}

fn blocked_areas(map: &Map<String, Value>) -> Option<u64> {
    let marker = map.get("blocked_areas")?;
    let count = match marker {
        Value::Number(number) => number.as_u64().unwrap_or(0),
        Value::Array(entries) => u64::try_from(entries.len()).unwrap_or(u64::MAX),
        Value::Object(entries) => u64::try_from(entries.len()).unwrap_or(u64::MAX),
        Value::Bool(true) => 1,
        _ => 0,
    };
    let observations_missing = map.get("observations").is_none_or(Value::is_null);
    (count > 0 || observations_missing).then_some(count)
}

fn error_messages(errors: Value) -> Vec<String> {
    match errors {
        Value::Array(entries) => entries.into_iter().map(message_text).collect(),
        other => vec![message_text(other)],
    }
}

fn message_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Accept identifiers the API sometimes encodes as numbers.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}
