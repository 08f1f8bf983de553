//! Client-side query cache
//!
//! [`QueryClient`] sits between consumers and a data provider. Consumers
//! ask for a key plus a loader closure; the client answers from cache when
//! the entry is fresh, joins callers onto one in-flight load when it is
//! not, and retries transient failures with backoff. Mutations invalidate
//! by key prefix. Every entry is evicted an inactivity window after its
//! last use; subscriptions pin an entry and restart that window when the
//! last one is dropped.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::FutureExt;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::entry::{CacheEntry, QueryStatus, SharedLoad};
use super::key::QueryKey;
use super::retry::RetryPolicy;
use crate::error::ApiError;

/// Broadcast channel depth. Slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 128;

/// Defaults applied when a fetch does not override them.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub fresh_for: Duration,
    pub retain_for: Duration,
    pub retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            fresh_for: Duration::from_secs(5 * 60),
            retain_for: Duration::from_secs(10 * 60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Per-fetch overrides of the client defaults.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub fresh_for: Option<Duration>,
    pub retain_for: Option<Duration>,
    pub retry: Option<RetryPolicy>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_for(mut self, fresh_for: Duration) -> Self {
        self.fresh_for = Some(fresh_for);
        self
    }

    pub fn retain_for(mut self, retain_for: Duration) -> Self {
        self.retain_for = Some(retain_for);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }
}

/// Cache lifecycle notifications delivered to subscribers.
#[derive(Debug, Clone)]
pub enum QueryEvent {
    /// A load finished and the cached value changed.
    Updated { key: QueryKey },
    /// A load failed after retries were exhausted.
    Failed { key: QueryKey, error: ApiError },
    /// The entry was marked stale by a prefix invalidation.
    Invalidated { key: QueryKey },
    /// The entry was removed after its inactivity window elapsed.
    Evicted { key: QueryKey },
}

impl QueryEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            QueryEvent::Updated { key }
            | QueryEvent::Failed { key, .. }
            | QueryEvent::Invalidated { key }
            | QueryEvent::Evicted { key } => key,
        }
    }
}

struct Inner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    events: broadcast::Sender<QueryEvent>,
    config: QueryConfig,
}

impl Inner {
    /// Lock the registry. A poisoned lock only means another caller
    /// panicked mid-update; the map itself is still usable.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, event: QueryEvent) {
        // Err just means nobody is listening right now.
        let _ = self.events.send(event);
    }

    /// Start the inactivity clock for an unwatched entry. The timer only
    /// evicts if the epoch it captured is still current and nobody has
    /// subscribed meanwhile; any later subscribe or read voids it by
    /// bumping the epoch.
    fn schedule_eviction(self: &Arc<Self>, key: &QueryKey, epoch: u64, retain_for: Duration) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            // Outside a runtime there is nothing to schedule on; the
            // entry simply stays until the process ends.
            Err(_) => return,
        };

        let inner = self.clone();
        let key = key.clone();
        handle.spawn(async move {
            tokio::time::sleep(retain_for).await;
            let evicted = {
                let mut entries = inner.lock_entries();
                match entries.get(&key) {
                    Some(entry) if entry.subscribers == 0 && entry.epoch == epoch => {
                        entries.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if evicted {
                log::debug!("evicted: {}", key);
                inner.notify(QueryEvent::Evicted { key });
            }
        });
    }
}

/// The query cache. Cheap to clone; clones share one registry.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                events,
                config,
            }),
        }
    }

    /// Fetch the value for `key`, consulting the cache first.
    ///
    /// Resolution order: a fresh cached value is returned without calling
    /// the loader; an in-flight load for the same key is joined, so
    /// concurrent callers trigger exactly one loader invocation; otherwise
    /// a new load starts, retried per the policy, and its outcome is
    /// stored and broadcast before any caller observes it.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        loader: F,
        options: FetchOptions,
    ) -> std::result::Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, ApiError>> + Send + 'static,
    {
        let fresh_for = options.fresh_for.unwrap_or(self.inner.config.fresh_for);
        let retain_for = options.retain_for.unwrap_or(self.inner.config.retain_for);
        let retry = options
            .retry
            .unwrap_or_else(|| self.inner.config.retry.clone());

        // Decide under the lock, await outside it.
        let load = {
            let mut entries = self.inner.lock_entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(retain_for));
            entry.retain_for = retain_for;

            if entry.is_fresh(fresh_for, Instant::now()) {
                if let Some(data) = entry.data.clone() {
                    log::debug!("cache hit: {}", key);
                    // A read is activity: restart the inactivity clock.
                    if entry.subscribers == 0 {
                        entry.epoch += 1;
                        self.inner
                            .schedule_eviction(&key, entry.epoch, entry.retain_for);
                    }
                    return downcast::<T>(data);
                }
            }

            match entry.in_flight.clone() {
                Some(shared) => {
                    log::debug!("joining in-flight load: {}", key);
                    shared
                }
                None => {
                    log::debug!("cache miss: {}", key);
                    if entry.data.is_none() {
                        entry.status = QueryStatus::Pending;
                    }
                    let shared = self.start_load(key.clone(), loader, retry);
                    entry.in_flight = Some(shared.clone());
                    // Drive the load independently so the result is stored
                    // even if every waiting caller is dropped.
                    let driver = shared.clone();
                    tokio::spawn(async move {
                        let _ = driver.await;
                    });
                    shared
                }
            }
        };

        match load.await {
            Ok(data) => downcast::<T>(data),
            Err(err) => Err(err),
        }
    }

    /// Build the shared load future: loader with retries, then write-back
    /// and broadcast. Bookkeeping happens inside the future, before any
    /// joined caller sees the result.
    fn start_load<T, F, Fut>(&self, key: QueryKey, loader: F, retry: RetryPolicy) -> SharedLoad
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, ApiError>> + Send + 'static,
    {
        let inner = self.inner.clone();
        let load = async move {
            let mut attempt: u32 = 0;
            let result = loop {
                match loader().await {
                    Ok(value) => break Ok(Arc::new(value) as Arc<dyn Any + Send + Sync>),
                    Err(err) => {
                        if !retry.is_retryable(&err) || attempt >= retry.max_retries {
                            break Err(err);
                        }
                        let delay = retry.delay(attempt);
                        attempt += 1;
                        log::debug!(
                            "load failed for {}, retry {} in {:?}: {}",
                            key,
                            attempt,
                            delay,
                            err
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            };

            {
                let mut entries = inner.lock_entries();
                if let Some(entry) = entries.get_mut(&key) {
                    entry.in_flight = None;
                    match &result {
                        Ok(data) => {
                            entry.data = Some(data.clone());
                            entry.fetched_at = Some(Instant::now());
                            entry.status = QueryStatus::Success;
                            entry.error = None;
                            entry.stale = false;
                        }
                        Err(err) => {
                            entry.status = QueryStatus::Error;
                            entry.error = Some(err.clone());
                        }
                    }
                    // Nobody is watching this entry; without a clock of
                    // its own it would sit in the registry forever.
                    if entry.subscribers == 0 {
                        entry.epoch += 1;
                        inner.schedule_eviction(&key, entry.epoch, entry.retain_for);
                    }
                }
            }

            match &result {
                Ok(_) => inner.notify(QueryEvent::Updated { key: key.clone() }),
                Err(err) => inner.notify(QueryEvent::Failed {
                    key: key.clone(),
                    error: err.clone(),
                }),
            }
            result
        };

        load.boxed().shared()
    }

    /// Read the cached value without triggering a load.
    pub fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entries = self.inner.lock_entries();
        let data = entries.get(key)?.data.clone()?;
        downcast::<T>(data).ok()
    }

    /// Lifecycle state of a key, if the cache knows it.
    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.inner.lock_entries().get(key).map(|e| e.status)
    }

    /// Last stored error for a key.
    pub fn error(&self, key: &QueryKey) -> Option<ApiError> {
        self.inner.lock_entries().get(key)?.error.clone()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.lock_entries().contains_key(key)
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock_entries().len()
    }

    /// Mark every entry whose key starts with `prefix` as stale and
    /// notify subscribers. Stale entries keep serving their data to
    /// readers but the next fetch bypasses the freshness window.
    /// Returns how many entries were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let marked: Vec<QueryKey> = {
            let mut entries = self.inner.lock_entries();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.stale = true;
                    key.clone()
                })
                .collect()
        };

        if !marked.is_empty() {
            log::debug!("invalidated {} entries under {}", marked.len(), prefix);
        }
        for key in &marked {
            self.inner.notify(QueryEvent::Invalidated { key: key.clone() });
        }
        marked.len()
    }

    /// Register interest in a key. The entry stays cached while at least
    /// one subscription is alive; dropping the last one starts the
    /// inactivity clock, after which the entry is evicted. Subscribing
    /// again before it elapses cancels the eviction.
    pub fn subscribe(&self, key: &QueryKey) -> QuerySubscription {
        let receiver = self.inner.events.subscribe();
        {
            let mut entries = self.inner.lock_entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(self.inner.config.retain_for));
            entry.subscribers += 1;
            entry.epoch += 1;
        }
        QuerySubscription {
            inner: self.inner.clone(),
            key: key.clone(),
            receiver,
        }
    }
}

/// Handle returned by [`QueryClient::subscribe`]. Receives cache events
/// for its key (and anything under it) and pins the entry while alive.
pub struct QuerySubscription {
    inner: Arc<Inner>,
    key: QueryKey,
    receiver: broadcast::Receiver<QueryEvent>,
}

impl QuerySubscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Next event whose key falls under this subscription's key.
    /// Returns `None` when the client is gone.
    pub async fn next_event(&mut self) -> Option<QueryEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.key().starts_with(&self.key) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("subscription for {} lagged, skipped {} events", self.key, skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for QuerySubscription {
    fn drop(&mut self) {
        let scheduled = {
            let mut entries = self.inner.lock_entries();
            match entries.get_mut(&self.key) {
                Some(entry) => {
                    entry.subscribers = entry.subscribers.saturating_sub(1);
                    if entry.subscribers == 0 {
                        Some((entry.epoch, entry.retain_for))
                    } else {
                        None
                    }
                }
                None => None,
            }
        };

        if let Some((epoch, retain_for)) = scheduled {
            self.inner.schedule_eviction(&self.key, epoch, retain_for);
        }
    }
}

fn downcast<T: Send + Sync + 'static>(
    data: Arc<dyn Any + Send + Sync>,
) -> std::result::Result<Arc<T>, ApiError> {
    data.downcast::<T>()
        .map_err(|_| ApiError::request("cached value has an unexpected type"))
}
