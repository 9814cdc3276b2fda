//! Accumulate listing items across `count`/`total_count`/`offset` pages.

use census21api_core::{Listing, Payload};
use serde_json::Value;

use crate::error::FetchError;
use crate::transport::Transport;
use crate::validate::validate_response;

/// Default ceiling on pages fetched for one listing.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Append `key=value` to `url`, choosing `?` or `&` as needed.
///
/// # Examples
/// ```
/// use census21api_data::with_query_param;
///
/// assert_eq!(with_query_param("https://x.test/a", "limit", 100), "https://x.test/a?limit=100");
/// assert_eq!(with_query_param("https://x.test/a?limit=100", "offset", 5), "https://x.test/a?limit=100&offset=5");
/// ```
#[must_use]
pub fn with_query_param(url: &str, key: &str, value: impl std::fmt::Display) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{key}={value}")
}

/// Fetch one page and require it to be a listing.
///
/// # Errors
///
/// Returns [`FetchError`] when the request fails, the response is unusable
/// or the body is not a listing.
pub fn fetch_listing<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
) -> Result<Listing, FetchError> {
    let response = transport.get(url)?;
    let body = validate_response(url, &response)?;
    match Payload::classify(body) {
        Payload::Listing(listing) => Ok(listing),
        Payload::ErrorMarker(messages) => Err(FetchError::Api {
            url: url.to_owned(),
            messages,
        }),
        Payload::Unrecognised { .. } => Err(FetchError::MissingItems {
            url: url.to_owned(),
        }),
        other => Err(FetchError::UnexpectedPayload {
            url: url.to_owned(),
            kind: other.kind(),
        }),
    }
}

/// Fetch every page of the listing at `url` and concatenate the items.
///
/// The first page is requested as given. While the items gathered so far
/// fall short of `total_count`, the same URL is requested again with
/// `offset` set to that running count. A listing without `total_count` is
/// complete after its first page.
///
/// # Errors
///
/// Any failing page fails the whole listing; no partial result is
/// returned. A page reporting zero items before the total is reached
/// yields [`FetchError::StalledPagination`], and needing more than
/// `max_pages` pages yields [`FetchError::PageLimitExceeded`].
pub fn fetch_all_items<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    max_pages: usize,
) -> Result<Vec<Value>, FetchError> {
    let mut items = Vec::new();
    let mut gathered: u64 = 0;
    let mut page_url = url.to_owned();

    for _ in 0..max_pages {
        let listing = fetch_listing(transport, &page_url)?;
        let page_count = listing.page_count();
        let total_count = listing.total_count;
        items.extend(listing.items);
        gathered = gathered.saturating_add(page_count);

        let Some(total) = total_count else {
            return Ok(items);
        };
        if gathered >= total {
            return Ok(items);
        }
        if page_count == 0 {
            return Err(FetchError::StalledPagination {
                url: page_url,
                offset: gathered,
                total_count: total,
            });
        }
        log::debug!("fetched {gathered} of {total} items from {url}");
        page_url = with_query_param(url, "offset", gathered);
    }

    Err(FetchError::PageLimitExceeded {
        url: url.to_owned(),
        max_pages,
    })
}
