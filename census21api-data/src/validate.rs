//! Decide whether a raw response carries usable data.

use serde_json::Value;

use crate::error::FetchError;
use crate::transport::RawResponse;

/// Characters of an unsuccessful body kept for diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

/// Decode a response body when the status is in 200-299.
///
/// # Errors
///
/// Returns [`FetchError::Status`] for any other status and
/// [`FetchError::Decode`] when a successful body is not JSON.
pub fn validate_response(url: &str, response: &RawResponse) -> Result<Value, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Status {
            url: url.to_owned(),
            status: response.status,
            body: excerpt(&response.body),
        });
    }
    serde_json::from_str(&response.body).map_err(|source| FetchError::Decode {
        url: url.to_owned(),
        source,
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
