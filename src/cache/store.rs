//! Timestamped entry storage shared by the sync and async caches.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::round_one_decimal;
use crate::config::CacheSettings;

/// A stored value and when it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at_ms: u64,
}

/// Result of looking a key up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup<V> {
    /// Present and younger than the TTL.
    Fresh(V),
    /// Present but older than the TTL.
    Stale(V),
    /// Not present.
    Missing,
}

/// Point-in-time view of a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Stored entries, fresh or expired.
    pub size: usize,
    /// Capacity that triggers eviction.
    pub max_entries: usize,
    /// Entries younger than the TTL.
    pub fresh: usize,
    /// Entries older than the TTL that have not been purged yet.
    pub expired: usize,
    /// Lookups that returned a fresh value.
    pub hits: u64,
    /// Lookups that found nothing fresh.
    pub misses: u64,
    /// Timestamp of the oldest entry.
    pub oldest_ms: Option<u64>,
    /// Timestamp of the newest entry.
    pub newest_ms: Option<u64>,
}

impl CacheStats {
    /// Share of lookups that hit, as a percentage rounded to one decimal.
    pub fn hit_rate_percent(&self) -> Decimal {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return Decimal::ZERO;
        }
        round_one_decimal(Decimal::from(self.hits) * Decimal::ONE_HUNDRED / Decimal::from(lookups))
    }
}

/// Key/value entries with TTL ageing and batch eviction.
#[derive(Debug)]
pub(crate) struct EntryStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl_ms: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl<V: Clone> EntryStore<V> {
    pub(crate) fn new(settings: &CacheSettings) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: settings.ttl_ms,
            max_entries: settings.max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.stored_at_ms) < self.ttl_ms
    }

    /// Looks a key up, counting the lookup as a hit or a miss.
    pub(crate) fn lookup(&mut self, key: &str, now_ms: u64) -> Lookup<V> {
        let found = match self.entries.get(key) {
            Some(entry) if self.is_fresh(entry, now_ms) => Lookup::Fresh(entry.value.clone()),
            Some(entry) => Lookup::Stale(entry.value.clone()),
            None => Lookup::Missing,
        };
        if matches!(found, Lookup::Fresh(_)) {
            self.hits += 1;
            debug!(key, "Cache hit");
        } else {
            self.misses += 1;
            debug!(key, stale = matches!(found, Lookup::Stale(_)), "Cache miss");
        }
        found
    }

    /// The stored value regardless of age, without counting a lookup.
    pub(crate) fn peek(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores a value, evicting the oldest half first when a new key would
    /// exceed capacity. Returns the number of evicted entries.
    pub(crate) fn insert(&mut self, key: String, value: V, now_ms: u64) -> usize {
        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries
        {
            self.evict_oldest((self.max_entries / 2).max(1))
        } else {
            0
        };
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at_ms: now_ms,
            },
        );
        evicted
    }

    fn evict_oldest(&mut self, count: usize) -> usize {
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.stored_at_ms, key.clone()))
            .collect();
        by_age.sort_unstable();

        let count = count.min(by_age.len());
        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
        debug!(evicted = count, remaining = self.entries.len(), "Cache batch eviction");
        count
    }

    /// Drops every entry older than the TTL. Returns how many were dropped.
    pub(crate) fn purge_expired(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        let ttl_ms = self.ttl_ms;
        self.entries
            .retain(|_, entry| now_ms.saturating_sub(entry.stored_at_ms) < ttl_ms);
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, "Expired cache entries purged");
        }
        purged
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn stats(&self, now_ms: u64) -> CacheStats {
        let fresh = self
            .entries
            .values()
            .filter(|entry| self.is_fresh(entry, now_ms))
            .count();
        CacheStats {
            size: self.entries.len(),
            max_entries: self.max_entries,
            fresh,
            expired: self.entries.len() - fresh,
            hits: self.hits,
            misses: self.misses,
            oldest_ms: self.entries.values().map(|e| e.stored_at_ms).min(),
            newest_ms: self.entries.values().map(|e| e.stored_at_ms).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl_ms: u64, max_entries: usize) -> EntryStore<u32> {
        EntryStore::new(&CacheSettings {
            ttl_ms,
            max_entries,
            stale_while_revalidate: false,
        })
    }

    #[test]
    fn test_lookup_fresh_stale_missing() {
        let mut store = store(100, 10);
        store.insert("a".to_string(), 1, 0);

        assert_eq!(store.lookup("a", 99), Lookup::Fresh(1));
        assert_eq!(store.lookup("a", 100), Lookup::Stale(1));
        assert_eq!(store.lookup("b", 0), Lookup::Missing);

        let stats = store.stats(0);
        assert_eq!((stats.hits, stats.misses), (1, 2));
        assert_eq!(stats.hit_rate_percent(), Decimal::new(333, 1));
    }

    #[test]
    fn test_batch_eviction_removes_oldest_half() {
        let mut store = store(1_000, 4);
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            store.insert(key.to_string(), i as u32, i as u64);
        }

        let evicted = store.insert("e".to_string(), 4, 10);
        assert_eq!(evicted, 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.peek("a"), None);
        assert_eq!(store.peek("b"), None);
        assert_eq!(store.peek("c"), Some(2));
        assert_eq!(store.peek("e"), Some(4));
    }

    #[test]
    fn test_overwriting_existing_key_does_not_evict() {
        let mut store = store(1_000, 2);
        store.insert("a".to_string(), 1, 0);
        store.insert("b".to_string(), 2, 1);
        assert_eq!(store.insert("a".to_string(), 3, 2), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.peek("a"), Some(3));
    }

    #[test]
    fn test_capacity_of_one_still_evicts() {
        let mut store = store(1_000, 1);
        store.insert("a".to_string(), 1, 0);
        assert_eq!(store.insert("b".to_string(), 2, 1), 1);
        assert_eq!(store.peek("b"), Some(2));
    }

    #[test]
    fn test_purge_expired_and_stats() {
        let mut store = store(50, 10);
        store.insert("old".to_string(), 1, 0);
        store.insert("new".to_string(), 2, 40);

        let stats = store.stats(60);
        assert_eq!((stats.size, stats.fresh, stats.expired), (2, 1, 1));
        assert_eq!((stats.oldest_ms, stats.newest_ms), (Some(0), Some(40)));

        assert_eq!(store.purge_expired(60), 1);
        assert_eq!(store.peek("old"), None);
        assert_eq!(store.remove("new"), Some(2));
        assert_eq!(store.stats(60).oldest_ms, None);
    }
}
