//! Cache-aware seismic data fetcher.
//!
//! Resolves a query identity `(month, refresh_token)` to displayable data.
//! A fresh cache hit never touches the network; a bumped refresh token is a
//! new identity and therefore always does. Results land only in their own
//! cache slot, so a superseded request can never overwrite newer data.

use std::time::Instant;

use tracing::{debug, warn};

use crate::cache::{CachedPayload, FetchCache, Lookup, QueryKey};
use crate::client::SeismicSource;
use crate::models::SeismicEvent;

/// Outcome of resolving a query identity.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Events to display. On failure this falls back to the last successful
    /// payload, or stays empty if none existed yet.
    pub events: Vec<SeismicEvent>,

    /// Error message when the transport, the API, or the feed itself failed
    pub error: Option<String>,

    /// Whether the result was served without a network round trip
    pub served_from_cache: bool,
}

/// Fetcher combining a transport with the identity-keyed cache.
pub struct DataFetcher<S: SeismicSource> {
    source: S,
    cache: FetchCache,
    /// Last successfully displayed events, kept for stale-if-error display
    last_good: Vec<SeismicEvent>,
}

impl<S: SeismicSource> DataFetcher<S> {
    /// Create a fetcher with the standard cache windows.
    pub fn new(source: S) -> Self {
        Self::with_cache(source, FetchCache::new())
    }

    /// Create a fetcher over an explicit cache.
    pub fn with_cache(source: S, cache: FetchCache) -> Self {
        Self {
            source,
            cache,
            last_good: Vec::new(),
        }
    }

    /// Resolve a query identity to displayable events.
    ///
    /// `month` is `None` to track the current month. `refresh_token` is any
    /// comparable value; changing it forces a full re-fetch even when a
    /// fresh entry exists for the same month.
    pub fn resolve(
        &mut self,
        month: Option<&str>,
        refresh_token: i64,
        now: Instant,
    ) -> FetchResult {
        self.cache.sweep(now);

        let key = QueryKey::new(month, refresh_token);
        let stale = match self.cache.lookup(&key, now) {
            Lookup::Fresh(payload) => {
                debug!(month = month.unwrap_or("current"), "serving fresh cached result");
                if payload.error.is_none() {
                    self.last_good = payload.events.clone();
                }
                return FetchResult {
                    events: payload.events,
                    error: payload.error,
                    served_from_cache: true,
                };
            }
            Lookup::Stale(payload) => Some(payload),
            Lookup::Miss => None,
        };

        // A nonzero token marks a user-initiated refresh; carry it through
        // as a cache-busting query parameter.
        let cache_bust = (refresh_token != 0).then_some(refresh_token);

        match self.source.fetch_month(month, cache_bust) {
            Ok(resp) => {
                let payload = CachedPayload {
                    events: resp.all_this_month.unwrap_or_default(),
                    error: resp.error,
                };
                self.cache.insert(key, payload.clone(), now);

                if let Some(message) = payload.error {
                    warn!("feed reported an error: {}", message);
                    return FetchResult {
                        events: payload.events,
                        error: Some(message),
                        served_from_cache: false,
                    };
                }

                self.last_good = payload.events.clone();
                FetchResult {
                    events: payload.events,
                    error: None,
                    served_from_cache: false,
                }
            }
            Err(e) => {
                warn!("fetch failed: {}", e);
                let events = match stale {
                    Some(payload) if !payload.events.is_empty() => payload.events,
                    _ => self.last_good.clone(),
                };
                FetchResult {
                    events,
                    error: Some(e.to_string()),
                    served_from_cache: false,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::cache::{FRESH_WINDOW, IDLE_WINDOW};
    use crate::errors::LindolError;
    use crate::models::SeismicResponse;

    fn event(magnitude: f64) -> SeismicEvent {
        SeismicEvent {
            datetime: "15 March 2024 - 02:30 PM".into(),
            magnitude,
            depth: 10.0,
            location: "test".into(),
            longitude: 121.0,
            latitude: 14.0,
            month: "March 2024".into(),
        }
    }

    /// Transport double: counts calls, can fail or report feed errors.
    struct ScriptedSource {
        calls: Cell<usize>,
        fail: Cell<bool>,
        feed_error: Cell<bool>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: Cell::new(false),
                feed_error: Cell::new(false),
            }
        }
    }

    impl SeismicSource for &ScriptedSource {
        fn fetch_month(
            &self,
            _month: Option<&str>,
            _cache_bust: Option<i64>,
        ) -> Result<SeismicResponse, LindolError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);

            if self.fail.get() {
                return Err(LindolError::Api {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            if self.feed_error.get() {
                return Ok(SeismicResponse {
                    all_this_month: None,
                    error: Some("Max retries exceeded".into()),
                });
            }
            Ok(SeismicResponse {
                all_this_month: Some(vec![event(n as f64)]),
                error: None,
            })
        }
    }

    #[test]
    fn test_fresh_hit_skips_network() {
        let source = ScriptedSource::new();
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let first = fetcher.resolve(None, 0, t0);
        assert!(!first.served_from_cache);

        let second = fetcher.resolve(None, 0, t0 + Duration::from_secs(60));
        assert!(second.served_from_cache);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(second.events.len(), first.events.len());
    }

    #[test]
    fn test_refresh_token_forces_fetch() {
        let source = ScriptedSource::new();
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let _ = fetcher.resolve(None, 0, t0);
        // Fresh entry exists for (None, 0); a new token must still fetch.
        let refreshed = fetcher.resolve(None, 1_700_000_000, t0 + Duration::from_secs(1));

        assert_eq!(source.calls.get(), 2);
        assert!(!refreshed.served_from_cache);
    }

    #[test]
    fn test_stale_entry_refetches() {
        let source = ScriptedSource::new();
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let _ = fetcher.resolve(Some("March 2024"), 0, t0);
        let later = t0 + FRESH_WINDOW + Duration::from_secs(1);
        let second = fetcher.resolve(Some("March 2024"), 0, later);

        assert_eq!(source.calls.get(), 2);
        assert!(!second.served_from_cache);
    }

    #[test]
    fn test_transport_failure_keeps_last_good() {
        let source = ScriptedSource::new();
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let good = fetcher.resolve(None, 0, t0);
        assert!(good.error.is_none());

        source.fail.set(true);
        let failed = fetcher.resolve(None, 42, t0 + Duration::from_secs(1));

        assert!(failed.error.as_deref().is_some_and(|e| e.contains("503")));
        assert_eq!(failed.events.len(), good.events.len());
    }

    #[test]
    fn test_failure_with_no_prior_data_is_empty() {
        let source = ScriptedSource::new();
        source.fail.set(true);
        let mut fetcher = DataFetcher::new(&source);

        let failed = fetcher.resolve(None, 0, Instant::now());
        assert!(failed.error.is_some());
        assert!(failed.events.is_empty());
    }

    #[test]
    fn test_feed_error_is_surfaced_and_cached() {
        let source = ScriptedSource::new();
        source.feed_error.set(true);
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let first = fetcher.resolve(None, 0, t0);
        assert_eq!(first.error.as_deref(), Some("Max retries exceeded"));
        assert!(first.events.is_empty());

        // Within the freshness window the error result is served from cache.
        let second = fetcher.resolve(None, 0, t0 + Duration::from_secs(30));
        assert!(second.served_from_cache);
        assert!(second.error.is_some());
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_idle_entries_are_swept() {
        let source = ScriptedSource::new();
        let mut fetcher = DataFetcher::new(&source);
        let t0 = Instant::now();

        let _ = fetcher.resolve(Some("January 2024"), 0, t0);
        // Well past the idle window the slot is gone and a fetch recurs.
        let later = t0 + IDLE_WINDOW + Duration::from_secs(1);
        let second = fetcher.resolve(Some("January 2024"), 0, later);

        assert_eq!(source.calls.get(), 2);
        assert!(!second.served_from_cache);
    }
}
