//! Bounded-time retrieval of raw calendar text from an external source.
//!
//! A failing source must never fail the aggregation it is part of, so this
//! module logs and returns `None` instead of erroring: timeout, transport
//! failure and non-2xx status all collapse into an empty result.

use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::warn;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Several providers reject requests with a default client identification.
static USER_AGENT: &str = "Mozilla/5.0";

static ACCEPT_CALENDAR: &str = "text/calendar, text/plain, */*";

/// Build the shared HTTP client used for all feed fetches.
pub fn feed_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}

/// Fetch raw feed text from `url`, or `None` on any failure.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = match client.get(url).header(ACCEPT, ACCEPT_CALENDAR).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(url, error = %err, "feed fetch failed");
            return None;
        }
    };
    if !response.status().is_success() {
        warn!(url, status = %response.status(), "feed fetch returned an error status");
        return None;
    }
    match response.text().await {
        Ok(text) => Some(text),
        Err(err) => {
            warn!(url, error = %err, "feed body could not be read");
            None
        }
    }
}
