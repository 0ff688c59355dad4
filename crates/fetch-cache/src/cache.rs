//! Read-through cache with stale-while-revalidate and request de-duplication

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::{CacheError, ConfigError};
use crate::types::{CacheStats, CacheStatus, GetOptions};

type Payload = Arc<dyn Any + Send + Sync>;
type SharedFetch<E> = Shared<BoxFuture<'static, Result<Payload, CacheError<E>>>>;

struct Entry {
    payload: Payload,
    fetched_at: Instant,
    refreshing: bool,
}

struct InFlight<E> {
    /// Distinguishes this request from one issued for the same key after a `clear`
    ticket: u64,
    future: SharedFetch<E>,
}

struct State<E> {
    /// Unbounded; `store` enforces `max_entries` itself
    entries: LruCache<String, Entry>,
    in_flight: HashMap<String, InFlight<E>>,
    next_ticket: u64,
}

#[derive(Default)]
struct Counters {
    fresh_hits: AtomicU64,
    stale_hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    revalidations: AtomicU64,
    revalidation_failures: AtomicU64,
}

struct Inner<E> {
    config: CacheConfig,
    state: Mutex<State<E>>,
    counters: Counters,
}

enum Lookup {
    Fresh(Payload),
    Stale { payload: Payload, refreshing: bool },
    Miss,
}

/// In-memory read-through cache keyed by request identity (usually a URL)
///
/// Values of any `Send + Sync` type can be stored; a key is read back as the
/// type it was fetched as. `E` is the error type produced by fetchers.
///
/// Cloning is cheap and yields a handle to the same cache.
pub struct FetchCache<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for FetchCache<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> FetchCache<E>
where
    E: Send + Sync + 'static,
{
    /// Create an empty cache
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State {
                    entries: LruCache::unbounded(),
                    in_flight: HashMap::new(),
                    next_ticket: 0,
                }),
                counters: Counters::default(),
            }),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Return the value for `key`, calling `fetcher` only when needed
    ///
    /// Fresh entries are returned directly. Stale entries are returned directly
    /// and revalidated in the background. Expired or missing entries (or any
    /// entry when `options.force` is set) wait on the network; if a request
    /// for `key` is already in flight, this call joins it instead of issuing
    /// another.
    ///
    /// Fetches run on spawned Tokio tasks, so this must be called from within
    /// a Tokio runtime. Dropping the returned future does not cancel the fetch.
    pub async fn get<T, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: GetOptions,
    ) -> Result<Arc<T>, CacheError<E>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.get_with_status(key, fetcher, options)
            .await
            .map(|(value, _)| value)
    }

    /// Like [`get`](Self::get), also reporting whether the value was fresh,
    /// stale, or fetched
    pub async fn get_with_status<T, F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: GetOptions,
    ) -> Result<(Arc<T>, CacheStatus), CacheError<E>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let pending = {
            let mut state = self.inner.lock();

            if !options.force {
                match self.inner.lookup(&mut state, key) {
                    Lookup::Fresh(payload) => {
                        self.inner.counters.fresh_hits.fetch_add(1, Ordering::Relaxed);
                        debug!(key, "Cache hit (fresh)");
                        return downcast(key, payload).map(|v| (v, CacheStatus::Fresh));
                    }
                    Lookup::Stale {
                        payload,
                        refreshing,
                    } => {
                        self.inner.counters.stale_hits.fetch_add(1, Ordering::Relaxed);
                        let value = downcast(key, payload)?;
                        if !refreshing && !state.in_flight.contains_key(key) {
                            debug!(key, "Cache hit (stale), revalidating in background");
                            self.inner.counters.revalidations.fetch_add(1, Ordering::Relaxed);
                            start_fetch(&self.inner, &mut state, key, fetcher, true);
                            // Only once the request is registered; a fetcher that
                            // panics must not leave the flag set
                            if let Some(entry) = state.entries.peek_mut(key) {
                                entry.refreshing = true;
                            }
                        } else {
                            debug!(key, "Cache hit (stale), revalidation already running");
                        }
                        return Ok((value, CacheStatus::Stale));
                    }
                    Lookup::Miss => {}
                }
            }

            self.inner.counters.misses.fetch_add(1, Ordering::Relaxed);
            let joined = state.in_flight.get(key).map(|f| f.future.clone());
            match joined {
                Some(future) => {
                    debug!(key, "Joining in-flight request");
                    drop(fetcher);
                    future
                }
                None => {
                    debug!(key, force = options.force, "Cache miss, fetching");
                    start_fetch(&self.inner, &mut state, key, fetcher, false)
                }
            }
        };

        let payload = pending.await?;
        downcast(key, payload).map(|v| (v, CacheStatus::Miss))
    }

    /// Remove all entries and forget all in-flight requests
    ///
    /// Requests already issued still complete and store their results.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        let entries = state.entries.len();
        state.entries.clear();
        state.in_flight.clear();
        debug!(entries, "Cache cleared");
    }

    /// Remove entries strictly older than the stale window.
    /// Returns the number removed.
    pub fn prune(&self) -> usize {
        let stale_window = self.inner.config.stale_window;
        let now = Instant::now();
        let removed = {
            let mut state = self.inner.lock();
            let expired: Vec<String> = state
                .entries
                .iter()
                .filter(|(_, e)| now.saturating_duration_since(e.fetched_at) > stale_window)
                .map(|(k, _)| k.clone())
                .collect();
            for key in &expired {
                state.entries.pop(key.as_str());
            }
            expired.len()
        };
        if removed > 0 {
            debug!(removed, "Pruned expired cache entries");
        }
        removed
    }

    /// Spawn a task that calls [`prune`](Self::prune) every `period`
    ///
    /// Panics if `period` is zero.
    pub fn spawn_pruner(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.prune();
            }
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry (of any age) is held for `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().entries.contains(key)
    }

    /// Number of requests currently in flight
    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight.len()
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, keys, in_flight) = {
            let state = self.inner.lock();
            let keys: Vec<String> = state.entries.iter().map(|(k, _)| k.clone()).collect();
            (state.entries.len(), keys, state.in_flight.len())
        };
        let c = &self.inner.counters;
        CacheStats {
            entries,
            keys,
            in_flight,
            fresh_hits: c.fresh_hits.load(Ordering::Relaxed),
            stale_hits: c.stale_hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
            revalidations: c.revalidations.load(Ordering::Relaxed),
            revalidation_failures: c.revalidation_failures.load(Ordering::Relaxed),
        }
    }
}

impl<E> Inner<E> {
    fn lock(&self) -> MutexGuard<'_, State<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classify the entry for `key`, purging it if past the stale window
    fn lookup(&self, state: &mut State<E>, key: &str) -> Lookup {
        let Some(entry) = state.entries.peek(key) else {
            return Lookup::Miss;
        };

        let age = Instant::now().saturating_duration_since(entry.fetched_at);
        if age < self.config.fresh_window {
            let payload = Arc::clone(&entry.payload);
            state.entries.promote(key);
            Lookup::Fresh(payload)
        } else if age < self.config.stale_window {
            let payload = Arc::clone(&entry.payload);
            let refreshing = entry.refreshing;
            state.entries.promote(key);
            Lookup::Stale {
                payload,
                refreshing,
            }
        } else {
            debug!(key, age_secs = age.as_secs(), "Cache entry expired");
            state.entries.pop(key);
            Lookup::Miss
        }
    }

    /// Insert a fetched value and enforce capacity
    fn store(&self, key: &str, payload: Payload) {
        let mut state = self.lock();
        state.entries.put(
            key.to_string(),
            Entry {
                payload,
                fetched_at: Instant::now(),
                refreshing: false,
            },
        );

        while state.entries.len() > self.config.max_entries {
            match state.entries.pop_lru() {
                Some((evicted, _)) => {
                    self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %evicted, "Evicted least recently used cache entry");
                }
                None => break,
            }
        }
    }

    /// Drop the in-flight tracker for `key` if it is still ours, and clear
    /// the entry's `refreshing` flag unless a newer request owns the key
    fn settle(&self, key: &str, ticket: u64) {
        let mut state = self.lock();
        let ours = match state.in_flight.get(key) {
            Some(flight) if flight.ticket == ticket => true,
            Some(_) => return,
            None => false,
        };
        if ours {
            state.in_flight.remove(key);
        }
        if let Some(entry) = state.entries.peek_mut(key) {
            entry.refreshing = false;
        }
    }
}

/// Clears the in-flight tracker when the fetch task ends, including by panic
/// or abort
struct SettleGuard<E> {
    inner: Arc<Inner<E>>,
    key: String,
    ticket: u64,
}

impl<E> Drop for SettleGuard<E> {
    fn drop(&mut self) {
        self.inner.settle(&self.key, self.ticket);
    }
}

/// Spawn the upstream fetch for `key` and register it as in flight.
/// Must be called with the state lock held so check-and-insert is atomic.
fn start_fetch<E, T, F, Fut>(
    inner: &Arc<Inner<E>>,
    state: &mut State<E>,
    key: &str,
    fetcher: F,
    background: bool,
) -> SharedFetch<E>
where
    E: Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let ticket = state.next_ticket;
    state.next_ticket += 1;

    let request = fetcher();
    let timeout = inner.config.fetch_timeout;
    let guard = SettleGuard {
        inner: Arc::clone(inner),
        key: key.to_string(),
        ticket,
    };

    let task = tokio::spawn(async move {
        let key = guard.key.as_str();
        let result = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(value)) => {
                let payload: Payload = Arc::new(value);
                guard.inner.store(key, Arc::clone(&payload));
                Ok(payload)
            }
            Ok(Err(e)) => Err(CacheError::Fetch(Arc::new(e))),
            Err(_) => Err(CacheError::Timeout {
                key: key.to_string(),
                after: timeout,
            }),
        };

        if background {
            if let Err(e) = &result {
                guard
                    .inner
                    .counters
                    .revalidation_failures
                    .fetch_add(1, Ordering::Relaxed);
                match e {
                    CacheError::Timeout { after, .. } => {
                        warn!(key, ?after, "Background revalidation timed out; keeping stale entry")
                    }
                    _ => warn!(key, "Background revalidation failed; keeping stale entry"),
                }
            }
        }

        drop(guard);
        result
    });

    let owned_key = key.to_string();
    let future = async move {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(key = %owned_key, error = %e, "Fetch task did not complete");
                Err(CacheError::Aborted { key: owned_key })
            }
        }
    }
    .boxed()
    .shared();

    state.in_flight.insert(
        key.to_string(),
        InFlight {
            ticket,
            future: future.clone(),
        },
    );
    future
}

fn downcast<T, E>(key: &str, payload: Payload) -> Result<Arc<T>, CacheError<E>>
where
    T: Send + Sync + 'static,
{
    payload.downcast::<T>().map_err(|_| CacheError::TypeMismatch {
        key: key.to_string(),
    })
}
