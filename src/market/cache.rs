//! Time-bounded memoization of market data fetches

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{MarketDataProvider, MarketSnapshot};
use crate::error::ProviderError;

/// Default time-to-live for cached snapshots (one hour)
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: MarketSnapshot,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Provider wrapper that reuses snapshots until their TTL lapses
///
/// Only successful fetches are cached.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    /// Wrap with the default one-hour TTL
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL_SECS)
    }

    /// Wrap with a custom TTL in seconds
    pub fn with_ttl(inner: P, ttl_secs: i64) -> Self {
        Self {
            inner,
            ttl: Duration::seconds(ttl_secs),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Fetch as of `now`, serving from cache when fresh
    pub fn fetch_at(&self, ticker: &str, now: DateTime<Utc>) -> Result<MarketSnapshot, ProviderError> {
        let key = cache_key(ticker);

        if let Some(entry) = self.read_entries().get(&key) {
            if !entry.is_expired(now) {
                debug!("cache hit for {}", key);
                return Ok(entry.snapshot.clone());
            }
        }

        debug!("cache miss for {}", key);
        let snapshot = self.inner.fetch(ticker)?;

        // TTLs reaching past the representable range never expire
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.write_entries().insert(
            key,
            CacheEntry {
                snapshot: snapshot.clone(),
                expires_at,
            },
        );

        Ok(snapshot)
    }

    /// Drop the cached snapshot for a ticker
    pub fn invalidate(&self, ticker: &str) {
        self.write_entries().remove(&cache_key(ticker));
    }

    /// Drop every expired entry
    pub fn clear_expired(&self) {
        let now = Utc::now();
        self.write_entries().retain(|_, entry| !entry.is_expired(now));
    }

    /// Drop everything
    pub fn clear(&self) {
        self.write_entries().clear();
    }

    /// Number of cached entries, expired or not
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are plain snapshots, so a map left behind by a panicking writer is still usable.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("market data cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("market data cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn fetch(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
        self.fetch_at(ticker, Utc::now())
    }
}

fn cache_key(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls; fails for "FAIL"
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MarketDataProvider for CountingProvider {
        fn fetch(&self, ticker: &str) -> Result<MarketSnapshot, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "FAIL" {
                return Err(ProviderError::Unavailable("connection reset".to_string()));
            }
            MarketSnapshot::resolve(ticker, 10.0, 1_000.0, Some(500.0), Some(1.1))
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = CachedProvider::with_ttl(CountingProvider::new(), 60);
        let t0 = Utc::now();

        cache.fetch_at("ACME", t0).unwrap();
        cache.fetch_at("acme", t0 + Duration::seconds(59)).unwrap();

        assert_eq!(cache.inner().calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_refetch_after_expiry() {
        let cache = CachedProvider::with_ttl(CountingProvider::new(), 60);
        let t0 = Utc::now();

        cache.fetch_at("ACME", t0).unwrap();
        cache.fetch_at("ACME", t0 + Duration::seconds(60)).unwrap();
        assert_eq!(cache.inner().calls(), 2);

        // Refreshed entry is valid for another full TTL
        cache.fetch_at("ACME", t0 + Duration::seconds(100)).unwrap();
        assert_eq!(cache.inner().calls(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let cache = CachedProvider::new(CountingProvider::new());
        let t0 = Utc::now();

        assert!(cache.fetch_at("FAIL", t0).is_err());
        assert!(cache.fetch_at("FAIL", t0).is_err());
        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = CachedProvider::new(CountingProvider::new());

        cache.fetch("ACME").unwrap();
        cache.fetch("BETA").unwrap();
        cache.invalidate("acme");
        assert_eq!(cache.len(), 1);

        cache.fetch("ACME").unwrap();
        assert_eq!(cache.inner().calls(), 3);

        cache.clear_expired();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = CachedProvider::with_ttl(CountingProvider::new(), 10_000_000_000_000);
        let t0 = Utc::now();

        cache.fetch_at("ACME", t0).unwrap();
        cache.fetch("ACME").unwrap();
        cache.fetch_at("ACME", t0 + Duration::days(365 * 1000)).unwrap();

        assert_eq!(cache.inner().calls(), 1);
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let cache = Arc::new(CachedProvider::new(CountingProvider::new()));
        cache.fetch("ACME").unwrap();

        let writer = Arc::clone(&cache);
        let handle = std::thread::spawn(move || {
            let _guard = writer.entries.write().unwrap();
            panic!("writer died holding the cache lock");
        });
        assert!(handle.join().is_err());
        assert!(cache.entries.is_poisoned());

        assert_eq!(cache.len(), 1);
        cache.fetch("ACME").unwrap();
        assert_eq!(cache.inner().calls(), 1);

        cache.invalidate("ACME");
        assert!(cache.is_empty());
    }
}
