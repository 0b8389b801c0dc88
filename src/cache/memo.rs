//! Synchronous memoization cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::config::CacheSettings;

use super::store::{EntryStore, Lookup};
use super::{CacheStats, Clock, SystemClock};

/// A TTL cache for computed results.
///
/// `get` returns `None` for absent and expired keys alike, so callers always
/// recompute rather than see a stale result. Instances are independent:
/// each owner constructs its own and may [`clear`](MemoCache::clear) it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use workforce_stats::cache::{ManualClock, MemoCache};
/// use workforce_stats::config::CacheSettings;
///
/// let clock = Arc::new(ManualClock::new(0));
/// let cache = MemoCache::with_clock(&CacheSettings::default(), clock.clone());
///
/// cache.set("answer", 42);
/// assert_eq!(cache.get("answer"), Some(42));
///
/// clock.advance(CacheSettings::default().ttl_ms);
/// assert_eq!(cache.get("answer"), None);
/// ```
#[derive(Debug)]
pub struct MemoCache<V> {
    store: Mutex<EntryStore<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> MemoCache<V> {
    /// Creates a cache aged by the system clock.
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock::new()))
    }

    /// Creates a cache aged by the given clock.
    pub fn with_clock(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(EntryStore::new(settings)),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EntryStore<V>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached value if present and fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        match self.lock().lookup(key, now) {
            Lookup::Fresh(value) => Some(value),
            Lookup::Stale(_) | Lookup::Missing => None,
        }
    }

    /// Stores a value, purging expired entries first.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let now = self.clock.now_ms();
        let mut store = self.lock();
        store.purge_expired(now);
        store.insert(key.into(), value, now);
    }

    /// Returns the fresh cached value, or computes, stores and returns a new one.
    ///
    /// The computation runs without holding the cache lock.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        debug!(key, "Computing cache entry");
        let value = compute();
        self.set(key, value.clone());
        value
    }

    /// Removes an entry, returning its value whether fresh or not.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.lock().remove(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size, age and hit statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        self.lock().stats(now)
    }
}
