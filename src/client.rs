//! PHIVOLCS seismic feed client.
//!
//! Provides blocking HTTP access to the seismic scrape API.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::LindolError;
use crate::models::SeismicResponse;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("lindol/", env!("CARGO_PKG_VERSION"));

/// Default deployment of the PHIVOLCS scrape API.
pub const DEFAULT_BASE_URL: &str = "https://phivolcs-seismic-api.onrender.com";

/// Source of seismic feed data.
///
/// `month` is `None` to track the current month (the server-side default) or
/// a `Month YYYY` label for a historical month. `cache_bust` appends a
/// throwaway query parameter so intermediaries cannot serve a stale body on
/// a user-initiated refresh.
pub trait SeismicSource {
    /// Fetch one month of events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    fn fetch_month(
        &self,
        month: Option<&str>,
        cache_bust: Option<i64>,
    ) -> Result<SeismicResponse, LindolError>;
}

/// Client for the seismic feed API.
pub struct SeismicClient {
    client: Client,
    base_url: String,
}

impl SeismicClient {
    /// Create a client against the default deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, LindolError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a specific deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_base_url(base_url: &str) -> Result<Self, LindolError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl SeismicSource for SeismicClient {
    #[instrument(skip(self), fields(month = month.unwrap_or("current")))]
    fn fetch_month(
        &self,
        month: Option<&str>,
        cache_bust: Option<i64>,
    ) -> Result<SeismicResponse, LindolError> {
        let url = format!("{}/seismic", self.base_url);

        // Body carries the month only when one is pinned; the server
        // resolves an empty body to the current month.
        let body = match month {
            Some(m) => json!({ "month": m }),
            None => json!({}),
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = cache_bust {
            request = request.query(&[("t", token.to_string())]);
        }

        debug!("fetching seismic feed from {}", url);

        let response = request.send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(LindolError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text()?;
        let feed: SeismicResponse = serde_json::from_str(&body)?;

        debug!("fetched {} events", feed.events().len());
        Ok(feed)
    }
}
