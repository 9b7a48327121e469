//! Explanation Store
//!
//! Capacity-bounded, time-expiring key/value store shared by every request
//! handler in the process.
//!
//! ## Policy
//!
//! - **Touch on read**: a successful `get` makes the entry most recently used
//! - **Evict oldest on overflow**: inserting a new key at capacity evicts
//!   exactly one entry, the least recently touched
//! - **Lazy expiry**: entries past `insert time + TTL` read as absent and are
//!   removed on that read; nothing sweeps proactively
//!
//! Overwriting an existing key replaces the value and refreshes its expiry
//! (last write wins).

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, error};

use super::clock::{Clock, SystemClock};
use super::key::CacheKey;
use crate::constants::cache as cache_constants;

/// Store sizing and lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: cache_constants::MAX_ENTRIES,
            ttl: Duration::from_secs(cache_constants::TTL_SECS),
        }
    }
}

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent
    expiry: Option<Instant>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

impl CacheStats {
    /// Cache hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner<V> {
    entries: LruCache<CacheKey, CacheEntry<V>>,
    stats: CacheStats,
}

/// LRU + TTL store keyed by [`CacheKey`]
pub struct ExplanationStore<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ExplanationStore<V> {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            ttl: config.ttl,
            capacity: capacity.get(),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            error!("Explanation store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Value for `key` if present and unexpired; refreshes its recency
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        let mut inner = self.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) if entry.expiry.is_none_or(|expiry| now <= expiry) => {
                let value = entry.value.clone();
                inner.stats.hits += 1;
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.pop(key);
            inner.stats.expirations += 1;
            debug!(%key, "Cache entry expired");
        }
        inner.stats.misses += 1;
        None
    }

    /// Insert or overwrite; evicts the least recently used entry when full
    pub fn set(&self, key: CacheKey, value: V) {
        let expiry = self.clock.now().checked_add(self.ttl);
        let mut inner = self.lock();

        let replaced = inner.entries.push(key.clone(), CacheEntry { value, expiry });
        if let Some((old_key, _)) = replaced
            && old_key != key
        {
            inner.stats.evictions += 1;
            debug!(evicted = %old_key, "Cache at capacity, evicted oldest entry");
        }
    }

    pub fn has(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Entries currently held, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

impl<V: Clone> Default for ExplanationStore<V> {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::types::RepoId;
    use proptest::prelude::*;

    fn key(name: &str) -> CacheKey {
        CacheKey::item(&RepoId::new("owner", "repo"), "src", name)
    }

    fn store_with_clock(capacity: usize, ttl_ms: u64) -> (ExplanationStore<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let store = ExplanationStore::with_clock(
            StoreConfig {
                capacity,
                ttl: Duration::from_millis(ttl_ms),
            },
            clock.clone(),
        );
        (store, clock)
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (store, _) = store_with_clock(10, 1000);
        assert_eq!(store.get(&key("lib")), None);
        assert!(!store.has(&key("lib")));
        assert_eq!(store.stats().misses, 2);
    }

    #[test]
    fn test_ttl_beyond_instant_range_never_expires() {
        let clock = Arc::new(ManualClock::new());
        let store = ExplanationStore::with_clock(
            StoreConfig {
                capacity: 4,
                ttl: Duration::from_secs(u64::MAX),
            },
            clock.clone(),
        );
        store.set(key("lib"), "forever".to_string());
        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert_eq!(store.get(&key("lib")).as_deref(), Some("forever"));
    }

    #[test]
    fn test_hit_rate() {
        let (store, _) = store_with_clock(4, 1000);
        assert_eq!(store.stats().hit_rate(), 0.0);

        store.set(key("lib"), "x".to_string());
        store.get(&key("lib"));
        store.get(&key("lib"));
        store.get(&key("lib"));
        store.get(&key("missing"));
        assert_eq!(store.stats().hit_rate(), 0.75);
    }

    #[test]
    fn test_set_then_get() {
        let (store, _) = store_with_clock(10, 1000);
        store.set(key("lib"), "Shared helpers".to_string());
        assert_eq!(store.get(&key("lib")).as_deref(), Some("Shared helpers"));
        assert!(store.has(&key("lib")));
    }

    #[test]
    fn test_ttl_boundary() {
        let (store, clock) = store_with_clock(10, 60_000);
        store.set(key("lib"), "value".to_string());

        clock.advance(Duration::from_millis(59_999));
        assert!(store.get(&key("lib")).is_some());

        clock.advance(Duration::from_millis(2));
        assert!(store.get(&key("lib")).is_none());
        assert_eq!(store.len(), 0, "expired entry is purged on read");
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_entry_visible_exactly_at_expiry() {
        let (store, clock) = store_with_clock(10, 1000);
        store.set(key("lib"), "value".to_string());
        clock.advance(Duration::from_millis(1000));
        assert!(store.get(&key("lib")).is_some());
    }

    #[test]
    fn test_capacity_evicts_first_inserted() {
        let (store, _) = store_with_clock(3, 60_000);
        for name in ["a", "b", "c", "d"] {
            store.set(key(name), name.to_string());
        }

        assert_eq!(store.len(), 3);
        assert!(!store.has(&key("a")));
        assert!(store.has(&key("b")));
        assert!(store.has(&key("c")));
        assert!(store.has(&key("d")));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_read_refreshes_recency() {
        let (store, _) = store_with_clock(2, 60_000);
        store.set(key("a"), "a".to_string());
        store.set(key("b"), "b".to_string());

        // Touch "a" so "b" becomes the oldest
        assert!(store.get(&key("a")).is_some());
        store.set(key("c"), "c".to_string());

        assert!(store.has(&key("a")));
        assert!(!store.has(&key("b")));
        assert!(store.has(&key("c")));
    }

    #[test]
    fn test_overwrite_same_key_does_not_evict() {
        let (store, _) = store_with_clock(2, 60_000);
        store.set(key("a"), "first".to_string());
        store.set(key("b"), "b".to_string());
        store.set(key("a"), "second".to_string());

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&key("a")).as_deref(), Some("second"));
        assert!(store.has(&key("b")));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite_refreshes_expiry() {
        let (store, clock) = store_with_clock(10, 1000);
        store.set(key("a"), "first".to_string());
        clock.advance(Duration::from_millis(800));
        store.set(key("a"), "second".to_string());
        clock.advance(Duration::from_millis(800));
        assert_eq!(store.get(&key("a")).as_deref(), Some("second"));
    }

    #[test]
    fn test_concurrent_writes_same_key() {
        let store = Arc::new(ExplanationStore::<String>::new(StoreConfig::default()));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&store);
                std::thread::spawn(move || s.set(key("shared"), format!("writer {i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 1);
        let value = store.get(&key("shared")).unwrap();
        assert!(value.starts_with("writer "));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (store, _) = store_with_clock(0, 1000);
        assert_eq!(store.capacity(), 1);
        store.set(key("a"), "a".to_string());
        assert!(store.has(&key("a")));
    }

    proptest! {
        #[test]
        fn prop_size_never_exceeds_capacity(capacity in 1usize..16, names in proptest::collection::vec("[a-z]{1,4}", 0..64)) {
            let (store, _) = store_with_clock(capacity, 60_000);
            for name in &names {
                store.set(key(name), name.clone());
                prop_assert!(store.len() <= capacity);
            }
        }

        #[test]
        fn prop_overflow_by_one_drops_only_first(capacity in 1usize..32) {
            let (store, _) = store_with_clock(capacity, 60_000);
            for i in 0..=capacity {
                let name = format!("k{}", i);
                store.set(key(&name), i.to_string());
            }
            prop_assert_eq!(store.len(), capacity);
            prop_assert!(!store.has(&key("k0")));
            for i in 1..=capacity {
                let name = format!("k{}", i);
                prop_assert!(store.has(&key(&name)));
            }
        }
    }
}
