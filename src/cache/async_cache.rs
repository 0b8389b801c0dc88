//! Asynchronous fetch cache with request coalescing.
//!
//! Concurrent fetches of a key that is not cached share one loader task.
//! The loader runs on its own spawned task, so a caller that gives up
//! waiting does not cancel it: the result is still cached for later callers.
//! With stale-while-revalidate enabled, an expired value is returned at once
//! while a refresh runs in the background and replaces it when it resolves.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::CacheSettings;
use crate::error::{EngineError, EngineResult};

use super::store::{EntryStore, Lookup};
use super::{CacheStats, Clock, SystemClock};

type LoadOutcome<V> = Option<Result<V, String>>;

/// How a fetched value was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<V> {
    /// Served from the cache within its TTL.
    Fresh(V),
    /// Served past its TTL while a refresh runs in the background.
    Stale(V),
    /// Produced by a loader run, possibly one started by another caller.
    Loaded(V),
}

impl<V> Fetched<V> {
    /// The value, however it was obtained.
    pub fn into_value(self) -> V {
        match self {
            Fetched::Fresh(value) | Fetched::Stale(value) | Fetched::Loaded(value) => value,
        }
    }

    /// Returns true if the value is past its TTL.
    pub fn is_stale(&self) -> bool {
        matches!(self, Fetched::Stale(_))
    }
}

#[derive(Debug)]
struct State<V> {
    store: EntryStore<V>,
    in_flight: HashMap<String, watch::Receiver<LoadOutcome<V>>>,
    generation: u64,
}

#[derive(Debug)]
struct Shared<V> {
    state: Mutex<State<V>>,
    clock: Arc<dyn Clock>,
    stale_while_revalidate: bool,
}

impl<V> Shared<V> {
    fn lock(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache for asynchronously loaded values.
///
/// Cloning an `AsyncCache` yields another handle to the same cache.
#[derive(Debug)]
pub struct AsyncCache<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for AsyncCache<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> AsyncCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache aged by the system clock.
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock::new()))
    }

    /// Creates a cache aged by the given clock.
    pub fn with_clock(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    store: EntryStore::new(settings),
                    in_flight: HashMap::new(),
                    generation: 0,
                }),
                clock,
                stale_while_revalidate: settings.stale_while_revalidate,
            }),
        }
    }

    /// Fetches a value, loading it with `loader` when nothing fresh is cached.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// - `Fresh` when a value within its TTL is cached
    /// - `Stale` when stale-while-revalidate applies; a refresh is started
    ///   unless one is already running
    /// - `Loaded` after waiting for a loader, shared with any concurrent
    ///   callers for the same key
    ///
    /// A failed load is not cached and is reported as
    /// [`EngineError::FetchFailed`] to every waiting caller.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_stats::cache::{AsyncCache, Fetched};
    /// use workforce_stats::config::CacheSettings;
    ///
    /// let runtime = tokio::runtime::Runtime::new().unwrap();
    /// runtime.block_on(async {
    ///     let cache: AsyncCache<u32> = AsyncCache::new(&CacheSettings::default());
    ///
    ///     let first = cache.fetch("2026-01", || async { Ok(7) }).await.unwrap();
    ///     assert_eq!(first, Fetched::Loaded(7));
    ///
    ///     let second = cache.fetch("2026-01", || async { Ok(8) }).await.unwrap();
    ///     assert_eq!(second, Fetched::Fresh(7));
    /// });
    /// ```
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> EngineResult<Fetched<V>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = EngineResult<V>> + Send + 'static,
    {
        let now = self.shared.clock.now_ms();

        let receiver = {
            let mut state = self.shared.lock();
            match state.store.lookup(key, now) {
                Lookup::Fresh(value) => return Ok(Fetched::Fresh(value)),
                Lookup::Stale(value) if self.shared.stale_while_revalidate => {
                    if Self::live_load(&state, key).is_none() {
                        debug!(key, "Serving stale value; refreshing in background");
                        self.spawn_load(&mut state, key, loader);
                    }
                    return Ok(Fetched::Stale(value));
                }
                Lookup::Stale(_) | Lookup::Missing => {}
            }

            match Self::live_load(&state, key) {
                Some(receiver) => {
                    debug!(key, "Joining in-flight fetch");
                    receiver
                }
                None => self.spawn_load(&mut state, key, loader),
            }
        };

        Self::wait(receiver)
            .await
            .map(Fetched::Loaded)
            .map_err(|message| EngineError::FetchFailed {
                key: key.to_string(),
                message,
            })
    }

    /// The in-flight load for `key`, unless its task has died without reporting.
    fn live_load(state: &State<V>, key: &str) -> Option<watch::Receiver<LoadOutcome<V>>> {
        state
            .in_flight
            .get(key)
            .filter(|receiver| receiver.has_changed().is_ok())
            .cloned()
    }

    fn spawn_load<F, Fut>(
        &self,
        state: &mut State<V>,
        key: &str,
        loader: F,
    ) -> watch::Receiver<LoadOutcome<V>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = EngineResult<V>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(None);
        state.in_flight.insert(key.to_string(), receiver.clone());

        let generation = state.generation;
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();

        tokio::spawn(async move {
            let outcome = loader().await.map_err(|e| e.to_string());
            {
                let mut state = shared.lock();
                if state.generation == generation {
                    state.in_flight.remove(&key);
                    match &outcome {
                        Ok(value) => {
                            let now = shared.clock.now_ms();
                            if !shared.stale_while_revalidate {
                                state.store.purge_expired(now);
                            }
                            state.store.insert(key.clone(), value.clone(), now);
                        }
                        Err(message) => warn!(key = %key, error = %message, "Fetch failed"),
                    }
                } else {
                    debug!(key = %key, "Cache cleared during fetch; result discarded");
                }
            }
            sender.send_replace(Some(outcome));
        });

        receiver
    }

    async fn wait(mut receiver: watch::Receiver<LoadOutcome<V>>) -> Result<V, String> {
        loop {
            let current = receiver.borrow_and_update().clone();
            if let Some(outcome) = current {
                return outcome;
            }
            if receiver.changed().await.is_err() {
                return Err("loader task ended without a result".to_string());
            }
        }
    }

    /// The stored value for `key`, fresh or stale, without loading.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.shared.lock().store.peek(key)
    }

    /// Stores a value directly.
    pub fn insert(&self, key: &str, value: V) {
        let now = self.shared.clock.now_ms();
        self.shared.lock().store.insert(key.to_string(), value, now);
    }

    /// Removes one entry.
    pub fn invalidate(&self, key: &str) -> Option<V> {
        self.shared.lock().store.remove(key)
    }

    /// Removes every entry and detaches in-flight loads, whose results are
    /// then delivered to their waiting callers but not cached.
    pub fn clear(&self) {
        let mut state = self.shared.lock();
        state.store.clear();
        state.in_flight.clear();
        state.generation += 1;
    }

    /// Number of loads currently running.
    pub fn in_flight(&self) -> usize {
        self.shared.lock().in_flight.len()
    }

    /// Stored entries.
    pub fn len(&self) -> usize {
        self.shared.lock().store.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size, age and hit statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.shared.clock.now_ms();
        self.shared.lock().store.stats(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const TTL_MS: u64 = 1_000;

    fn cache(stale_while_revalidate: bool) -> (AsyncCache<u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let settings = CacheSettings {
            ttl_ms: TTL_MS,
            max_entries: 10,
            stale_while_revalidate,
        };
        (AsyncCache::with_clock(&settings, clock.clone()), clock)
    }

    type TestLoad = Pin<Box<dyn Future<Output = EngineResult<u32>> + Send>>;

    /// A loader that counts its calls and sleeps before returning `value`.
    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        delay_ms: u64,
        value: u32,
    ) -> impl FnOnce() -> TestLoad + Send + 'static {
        let calls = Arc::clone(calls);
        move || -> TestLoad {
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(value)
            })
        }
    }

    #[tokio::test]
    async fn test_fetch_loads_then_serves_fresh() {
        let (cache, _clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.fetch("k", counting_loader(&calls, 0, 1)).await.unwrap();
        let second = cache.fetch("k", counting_loader(&calls, 0, 2)).await.unwrap();

        assert_eq!(first, Fetched::Loaded(1));
        assert_eq!(second, Fetched::Fresh(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_coalesce() {
        let (cache, _clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b, c) = tokio::join!(
            cache.fetch("k", counting_loader(&calls, 20, 1)),
            cache.fetch("k", counting_loader(&calls, 20, 2)),
            cache.fetch("k", counting_loader(&calls, 20, 3)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in [a, b, c] {
            assert_eq!(result.unwrap(), Fetched::Loaded(1));
        }
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_reloads_without_swr() {
        let (cache, clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counting_loader(&calls, 0, 1)).await.unwrap();
        clock.advance(TTL_MS);
        let refreshed = cache.fetch("k", counting_loader(&calls, 0, 2)).await.unwrap();

        assert_eq!(refreshed, Fetched::Loaded(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate() {
        let (cache, clock) = cache(true);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counting_loader(&calls, 0, 1)).await.unwrap();
        clock.advance(TTL_MS);

        let stale = cache.fetch("k", counting_loader(&calls, 20, 2)).await.unwrap();
        assert_eq!(stale, Fetched::Stale(1));
        assert!(stale.is_stale());

        // A second caller during the refresh does not start another load.
        let again = cache.fetch("k", counting_loader(&calls, 20, 3)).await.unwrap();
        assert_eq!(again, Fetched::Stale(1));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.fetch("k", counting_loader(&calls, 0, 4)).await.unwrap(), Fetched::Fresh(2));
    }

    #[tokio::test]
    async fn test_abandoned_fetch_still_populates_cache() {
        let (cache, _clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(5),
            cache.fetch("k", counting_loader(&calls, 40, 9)),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(cache.peek("k"), None);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.peek("k"), Some(9));
        assert_eq!(
            cache.fetch("k", counting_loader(&calls, 0, 10)).await.unwrap(),
            Fetched::Fresh(9)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_discards_in_flight_result() {
        let (cache, _clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = {
            let cache = cache.clone();
            let loader = counting_loader(&calls, 30, 5);
            tokio::spawn(async move { cache.fetch("k", loader).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.in_flight(), 1);

        cache.clear();
        assert_eq!(cache.in_flight(), 0);

        // The waiting caller still receives its value.
        assert_eq!(handle.await.unwrap().unwrap(), Fetched::Loaded(5));
        assert_eq!(cache.peek("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_and_not_cached() {
        let (cache, _clock) = cache(false);

        let result = cache
            .fetch("2026-01", || async {
                Err(EngineError::InvalidScheduleDocument {
                    message: "backend unavailable".to_string(),
                })
            })
            .await;

        match result {
            Err(EngineError::FetchFailed { key, message }) => {
                assert_eq!(key, "2026-01");
                assert!(message.contains("backend unavailable"));
            }
            other => panic!("Expected FetchFailed, got {other:?}"),
        }
        assert_eq!(cache.peek("2026-01"), None);
        assert_eq!(cache.in_flight(), 0);

        let retried = cache.fetch("2026-01", || async { Ok(3) }).await.unwrap();
        assert_eq!(retried, Fetched::Loaded(3));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let (cache, _clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", counting_loader(&calls, 0, 1)).await.unwrap();
        assert_eq!(cache.invalidate("k"), Some(1));
        assert_eq!(cache.invalidate("k"), None);
        assert!(cache.is_empty());

        let reloaded = cache.fetch("k", counting_loader(&calls, 0, 2)).await.unwrap();
        assert_eq!(reloaded, Fetched::Loaded(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inserted_value_is_served_fresh() {
        let (cache, clock) = cache(false);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.insert("k", 7);
        assert_eq!(cache.peek("k"), Some(7));
        assert_eq!(
            cache.fetch("k", counting_loader(&calls, 0, 8)).await.unwrap(),
            Fetched::Fresh(7)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Inserted values age like loaded ones.
        clock.advance(TTL_MS);
        assert_eq!(
            cache.fetch("k", counting_loader(&calls, 0, 8)).await.unwrap(),
            Fetched::Loaded(8)
        );
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_misses() {
        let (cache, _clock) = cache(false);
        cache.fetch("k", || async { Ok(1) }).await.unwrap();
        cache.fetch("k", || async { Ok(1) }).await.unwrap();

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }
}
