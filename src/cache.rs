//! Identity-keyed fetch cache.
//!
//! Replaces the reactive query cache the browser build leaned on with an
//! explicit map of query identity to payload. Two lookups with equal keys
//! share one cached result; unequal keys are independent entries, so a
//! bumped refresh token is a structural miss and always reaches the network.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::SeismicEvent;

/// How long a cached result counts as fresh (no refetch needed).
pub const FRESH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// How long an unused entry survives before a sweep drops it.
pub const IDLE_WINDOW: Duration = Duration::from_secs(10 * 60);

/// The key distinguishing independent cached fetch results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Pinned `Month YYYY` label, or `None` for the current month
    pub month: Option<String>,

    /// Changing this value forces a fetch even for an unchanged month
    pub refresh_token: i64,
}

impl QueryKey {
    /// Build a key from a month selector and refresh token.
    #[must_use]
    pub fn new(month: Option<&str>, refresh_token: i64) -> Self {
        Self {
            month: month.map(str::to_string),
            refresh_token,
        }
    }
}

/// The cached outcome of one fetch: a month of events, or the error
/// descriptor the feed reported in its place.
#[derive(Debug, Clone)]
pub struct CachedPayload {
    pub events: Vec<SeismicEvent>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct CacheEntry {
    payload: CachedPayload,
    fetched_at: Instant,
    last_used: Instant,
}

/// Lookup outcome for a query key.
#[derive(Debug)]
pub enum Lookup {
    /// Inside the freshness window; display as-is, no fetch
    Fresh(CachedPayload),
    /// Past the freshness window; displayable while a refetch runs
    Stale(CachedPayload),
    /// Nothing cached for this key
    Miss,
}

/// Bounded-lifetime store of fetch results keyed by query identity.
#[derive(Debug)]
pub struct FetchCache {
    entries: HashMap<QueryKey, CacheEntry>,
    fresh_window: Duration,
    idle_window: Duration,
}

impl FetchCache {
    /// Create a cache with the standard freshness and idle windows.
    #[must_use]
    pub fn new() -> Self {
        Self::with_windows(FRESH_WINDOW, IDLE_WINDOW)
    }

    /// Create a cache with explicit windows.
    #[must_use]
    pub fn with_windows(fresh_window: Duration, idle_window: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            fresh_window,
            idle_window,
        }
    }

    /// Look up a key, marking the entry as used.
    pub fn lookup(&mut self, key: &QueryKey, now: Instant) -> Lookup {
        match self.entries.get_mut(key) {
            None => Lookup::Miss,
            Some(entry) => {
                entry.last_used = now;
                let age = now.saturating_duration_since(entry.fetched_at);
                if age <= self.fresh_window {
                    Lookup::Fresh(entry.payload.clone())
                } else {
                    Lookup::Stale(entry.payload.clone())
                }
            }
        }
    }

    /// Store a fetch outcome for a key, replacing any prior entry.
    pub fn insert(&mut self, key: QueryKey, payload: CachedPayload, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                fetched_at: now,
                last_used: now,
            },
        );
    }

    /// Drop entries not used within the idle window.
    pub fn sweep(&mut self, now: Instant) {
        let idle_window = self.idle_window;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_used) <= idle_window);
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(n: usize) -> CachedPayload {
        CachedPayload {
            events: vec![SeismicEvent {
                datetime: String::new(),
                magnitude: n as f64,
                depth: 0.0,
                location: String::new(),
                longitude: 0.0,
                latitude: 0.0,
                month: String::new(),
            }],
            error: None,
        }
    }

    #[test]
    fn test_fresh_within_window() {
        let mut cache = FetchCache::new();
        let key = QueryKey::new(None, 0);
        let t0 = Instant::now();

        cache.insert(key.clone(), payload(1), t0);

        let t1 = t0 + Duration::from_secs(60);
        assert!(matches!(cache.lookup(&key, t1), Lookup::Fresh(_)));
    }

    #[test]
    fn test_stale_after_window() {
        let mut cache = FetchCache::new();
        let key = QueryKey::new(Some("March 2024"), 0);
        let t0 = Instant::now();

        cache.insert(key.clone(), payload(1), t0);

        let t1 = t0 + FRESH_WINDOW + Duration::from_secs(1);
        assert!(matches!(cache.lookup(&key, t1), Lookup::Stale(_)));
    }

    #[test]
    fn test_refresh_token_is_independent_identity() {
        let mut cache = FetchCache::new();
        let t0 = Instant::now();

        cache.insert(QueryKey::new(None, 0), payload(1), t0);

        // Same month, different token: structurally a miss.
        assert!(matches!(
            cache.lookup(&QueryKey::new(None, 1), t0),
            Lookup::Miss
        ));
        assert!(matches!(
            cache.lookup(&QueryKey::new(None, 0), t0),
            Lookup::Fresh(_)
        ));
    }

    #[test]
    fn test_sweep_evicts_idle_entries() {
        let mut cache = FetchCache::new();
        let t0 = Instant::now();

        cache.insert(QueryKey::new(None, 0), payload(1), t0);
        cache.insert(QueryKey::new(Some("March 2024"), 0), payload(2), t0);

        // Touch one entry late so only the other goes idle.
        let t1 = t0 + Duration::from_secs(9 * 60);
        let _ = cache.lookup(&QueryKey::new(None, 0), t1);

        let t2 = t0 + IDLE_WINDOW + Duration::from_secs(1);
        cache.sweep(t2);

        assert_eq!(cache.len(), 1);
        assert!(matches!(
            cache.lookup(&QueryKey::new(Some("March 2024"), 0), t2),
            Lookup::Miss
        ));
        assert!(!matches!(
            cache.lookup(&QueryKey::new(None, 0), t2),
            Lookup::Miss
        ));
    }

    #[test]
    fn test_insert_replaces_entry() {
        let mut cache = FetchCache::new();
        let key = QueryKey::new(None, 0);
        let t0 = Instant::now();

        cache.insert(key.clone(), payload(1), t0);
        cache.insert(key.clone(), payload(2), t0 + Duration::from_secs(1));

        assert_eq!(cache.len(), 1);
        match cache.lookup(&key, t0 + Duration::from_secs(2)) {
            Lookup::Fresh(p) => assert!((p.events[0].magnitude - 2.0).abs() < 1e-9),
            other => panic!("expected fresh hit, got {other:?}"),
        }
    }
}
