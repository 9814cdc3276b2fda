//! Error types produced while talking to the census API.

use census21api_core::QueryError;
use thiserror::Error;

/// Transport-level failures: no HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Error reported by the HTTP client.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The response body could not be read.
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// Fully qualified request URL.
        url: String,
        /// Error reported by the HTTP client.
        message: String,
    },
}

/// Reasons a fetch yields no data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The server answered with a status outside 200-299.
    #[error("unsuccessful GET from {url}: status code {status}: {body}")]
    Status {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },
    /// A successful response did not contain JSON.
    #[error("error decoding data from {url}: {source}")]
    Decode {
        /// Fully qualified request URL.
        url: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// The body carried an `errors` marker.
    #[error("API reported errors for {url}: {}", .messages.join("; "))]
    Api {
        /// Fully qualified request URL.
        url: String,
        /// Messages from the `errors` marker.
        messages: Vec<String>,
    },
    /// A listing response had no `items` array.
    #[error("no items listed at {url}")]
    MissingItems {
        /// Fully qualified request URL.
        url: String,
    },
    /// The body was JSON of an unexpected shape.
    #[error("unexpected {kind} from {url}")]
    UnexpectedPayload {
        /// Fully qualified request URL.
        url: String,
        /// Kind of payload received.
        kind: &'static str,
    },
    /// A recognised key held data of the wrong shape.
    #[error("malformed {key} from {url}: {message}")]
    Malformed {
        /// Fully qualified request URL.
        url: String,
        /// Key whose value failed to decode.
        key: &'static str,
        /// Decoder message.
        message: String,
    },
    /// A listed item could not be decoded into its typed form.
    #[error("failed to decode an item listed at {url}: {source}")]
    InvalidItem {
        /// Fully qualified request URL.
        url: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A page reported no items before the advertised total was reached.
    #[error("pagination stalled at {url}: offset {offset} of {total_count} items")]
    StalledPagination {
        /// URL of the empty page.
        url: String,
        /// Items accumulated so far.
        offset: u64,
        /// Total advertised by the API.
        total_count: u64,
    },
    /// The listing needed more pages than the configured ceiling.
    #[error("listing at {url} exceeded {max_pages} pages")]
    PageLimitExceeded {
        /// URL of the first page.
        url: String,
        /// Configured ceiling.
        max_pages: usize,
    },
}

/// Reasons a table query yields no table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TableQueryError {
    /// The observations could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The dimension combination is withheld for disclosure control.
    #[error("blocked pair: {url} withheld {blocked_areas} areas for disclosure control")]
    Blocked {
        /// Observations URL.
        url: String,
        /// Number of blocked areas reported.
        blocked_areas: u64,
    },
    /// The observations did not fit the requested columns.
    #[error(transparent)]
    Assemble(#[from] QueryError),
}

impl TableQueryError {
    /// Whether the failure is disclosure control rather than connectivity.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}
