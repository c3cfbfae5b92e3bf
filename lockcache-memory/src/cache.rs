// Copyright 2025 foyer Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Debug, hash::Hash, sync::Arc, time::Duration};

use equivalent::Equivalent;
use lockcache_common::{
    backoff::BackoffConfig,
    code::{HashBuilder, Key, Value},
    error::Result,
    event::EventListener,
    hasher::IntHasher,
    metrics::{model::Metrics, registry::noop::NoopMetricsRegistry, BoxedRegistry},
};

use crate::{
    buffer::AlignedBuffer,
    error::{Error, Result as BuildResult},
    handle::{Handle, Mode},
    hooks::{DefaultHooks, Hooks},
    raw::{RawCache, RawCacheConfig},
};

/// Locked handle of a [`Cache`] entry.
pub type CacheHandle<K, V = AlignedBuffer, S = IntHasher> = Handle<K, V, S>;

/// In-memory cache builder.
pub struct CacheBuilder<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    name: String,
    cost_quota: usize,
    /// Only set while the default hooks are in use.
    entry_size: Option<usize>,
    hooks: Arc<dyn Hooks<K, V>>,
    hash_builder: S,
    eviction_threshold: f64,
    backoff: BackoffConfig,
    slow_wait_threshold: Duration,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    registry: BoxedRegistry,
    errors: Vec<Error>,
}

impl<K> CacheBuilder<K, AlignedBuffer, IntHasher>
where
    K: Key,
{
    /// Create a cache builder with the given cost quota.
    ///
    /// Without custom hooks every entry is a zero-filled [`AlignedBuffer`] of the configured entry size, so
    /// [`CacheBuilder::with_entry_size`] must be called before building.
    pub fn new(cost_quota: usize) -> Self {
        Self {
            name: "lockcache".to_string(),
            cost_quota,
            entry_size: Some(0),
            hooks: Arc::new(DefaultHooks::new(0)),
            hash_builder: IntHasher::default(),
            eviction_threshold: 0.8,
            backoff: BackoffConfig::default(),
            slow_wait_threshold: Duration::from_millis(100),
            event_listener: None,
            registry: Box::new(NoopMetricsRegistry),
            errors: vec![],
        }
    }
}

impl<K, S> CacheBuilder<K, AlignedBuffer, S>
where
    K: Key,
    S: HashBuilder,
{
    /// Set the payload size of the default allocator, in bytes. Every entry charges its size.
    pub fn with_entry_size(mut self, entry_size: usize) -> Self {
        if self.entry_size.is_some() {
            self.entry_size = Some(entry_size);
            self.hooks = Arc::new(DefaultHooks::new(entry_size));
        } else {
            self.errors
                .push(Error::config("entry size only applies to the default allocator"));
        }
        self
    }
}

impl<K, V, S> CacheBuilder<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// Set the name of the cache instance.
    ///
    /// The name is used as the label of the metrics.
    ///
    /// Default: `lockcache`.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Replace the default allocator with custom hooks, which also decides the payload type.
    ///
    /// Must be called before [`CacheBuilder::with_event_listener`], as the event listener is typed by the payload.
    pub fn with_hooks<OV>(self, hooks: impl Hooks<K, OV>) -> CacheBuilder<K, OV, S>
    where
        OV: Value,
    {
        let mut errors = self.errors;
        if self.event_listener.is_some() {
            errors.push(Error::config("event listener must be set after the hooks"));
        }
        CacheBuilder {
            name: self.name,
            cost_quota: self.cost_quota,
            entry_size: None,
            hooks: Arc::new(hooks),
            hash_builder: self.hash_builder,
            eviction_threshold: self.eviction_threshold,
            backoff: self.backoff,
            slow_wait_threshold: self.slow_wait_threshold,
            event_listener: None,
            registry: self.registry,
            errors,
        }
    }

    /// Set the hash builder of the key index.
    ///
    /// Default: [`IntHasher`], which hashes integer keys to themselves.
    pub fn with_hash_builder<OS>(self, hash_builder: OS) -> CacheBuilder<K, V, OS>
    where
        OS: HashBuilder,
    {
        CacheBuilder {
            name: self.name,
            cost_quota: self.cost_quota,
            entry_size: self.entry_size,
            hooks: self.hooks,
            hash_builder,
            eviction_threshold: self.eviction_threshold,
            backoff: self.backoff,
            slow_wait_threshold: self.slow_wait_threshold,
            event_listener: self.event_listener,
            registry: self.registry,
            errors: self.errors,
        }
    }

    /// Set the fill ratio of the quota above which creating an entry first evicts down to the same ratio.
    ///
    /// Must be in `(0, 1]`.
    ///
    /// Default: `0.8`.
    pub fn with_eviction_threshold(mut self, eviction_threshold: f64) -> Self {
        self.eviction_threshold = eviction_threshold;
        self
    }

    /// Set the backoff of the retries of contended acquisitions and removals.
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the wait time above which an acquisition is logged as slow.
    ///
    /// Default: 100ms.
    pub fn with_slow_wait_threshold(mut self, slow_wait_threshold: Duration) -> Self {
        self.slow_wait_threshold = slow_wait_threshold;
        self
    }

    /// Set event listener.
    ///
    /// Default: No event listener installed.
    pub fn with_event_listener(mut self, event_listener: Arc<dyn EventListener<Key = K, Value = V>>) -> Self {
        self.event_listener = Some(event_listener);
        self
    }

    /// Set metrics registry.
    ///
    /// Default: [`NoopMetricsRegistry`].
    pub fn with_metrics_registry(mut self, registry: BoxedRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn validate(&mut self) -> BuildResult<()> {
        let mut errors = std::mem::take(&mut self.errors);
        if self.entry_size == Some(0) {
            errors.push(Error::config("entry size must be greater than zero"));
        }
        if !(self.eviction_threshold > 0.0 && self.eviction_threshold <= 1.0) {
            errors.push(Error::config(format!(
                "eviction threshold must be in (0, 1], given: {}",
                self.eviction_threshold
            )));
        }
        if self.backoff.initial_delay > self.backoff.max_delay {
            errors.push(Error::config(format!(
                "backoff initial delay {:?} exceeds max delay {:?}",
                self.backoff.initial_delay, self.backoff.max_delay
            )));
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::multiple(errors)),
        }
    }

    /// Build in-memory cache with the given configuration.
    pub fn build(mut self) -> BuildResult<Cache<K, V, S>> {
        self.validate()?;

        let metrics = Arc::new(Metrics::new(self.name, self.registry.as_ref()));
        let raw = RawCache::new(RawCacheConfig {
            cost_quota: self.cost_quota,
            eviction_threshold: self.eviction_threshold,
            hash_builder: self.hash_builder,
            hooks: self.hooks,
            event_listener: self.event_listener,
            metrics,
            backoff: self.backoff,
            slow_wait_threshold: self.slow_wait_threshold,
        });
        Ok(Cache { raw })
    }
}

/// A concurrent, cost-bounded LRU cache that hands out locked entries.
///
/// Looking up a missing key creates the entry through the cache hooks. Creating an entry while the charged cost is
/// above the eviction threshold first evicts the least recently used entries that nobody holds.
///
/// The cache is cheap to clone. All clones share the same entries.
pub struct Cache<K, V = AlignedBuffer, S = IntHasher>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    raw: RawCache<K, V, S>,
}

impl<K, V, S> Debug for Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.len())
            .field("cost", &self.cost())
            .field("cost_quota", &self.cost_quota())
            .finish()
    }
}

impl<K, V, S> Clone for Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K> Cache<K>
where
    K: Key,
{
    /// Create a cache builder with the given cost quota.
    pub fn builder(cost_quota: usize) -> CacheBuilder<K, AlignedBuffer, IntHasher> {
        CacheBuilder::new(cost_quota)
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// Lock the entry of `key` in `mode`, creating it on a miss.
    ///
    /// If the entry is held in a conflicting mode, retries with backoff until the holder releases it. There is no
    /// timeout.
    ///
    /// A created entry may be returned in [`Mode::Write`] even if [`Mode::Read`] is requested, as decided by
    /// [`Hooks::write_on_create`]. Use [`Handle::downgrade`] once the payload is ready.
    ///
    /// Returns an error only if the payload of a new entry cannot be created. In that case nothing is inserted.
    #[track_caller]
    pub fn acquire(&self, key: K, mode: Mode) -> Result<CacheHandle<K, V, S>> {
        self.raw.acquire(key, mode)
    }

    /// Lock the entry of `key` in `mode` if it exists and is not held in a conflicting mode. Never creates an entry
    /// and never waits for another holder.
    #[track_caller]
    pub fn try_acquire<Q>(&self, key: &Q, mode: Mode) -> Option<CacheHandle<K, V, S>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.raw.try_acquire(key, mode)
    }

    /// Remove the entry of `key`, waiting until nobody holds it.
    ///
    /// Returns `false` if the key is not cached. Returns `true` once the entry is unlinked and cleaned up.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.raw.remove(key)
    }

    /// Check if the cache contains an entry of `key`. The entry is neither locked nor marked as used.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.raw.contains(key)
    }

    /// Visit every entry from the least to the most recently used one, stopping at the first error.
    ///
    /// The payload is `None` if the entry is currently held in [`Mode::Write`].
    ///
    /// The structural lock is held for the whole traversal. The visitor must not call back into the cache or it will
    /// deadlock.
    pub fn for_each<F, E>(&self, visitor: F) -> std::result::Result<(), E>
    where
        F: FnMut(&K, Option<&V>) -> std::result::Result<(), E>,
    {
        self.raw.for_each(visitor)
    }

    /// Evict the least recently used entries that nobody holds until the charged cost drops below
    /// `cost_quota * fill_ratio`. Never waits for a holder.
    ///
    /// Returns the count of evicted entries.
    pub fn evict_to(&self, fill_ratio: f64) -> usize {
        self.raw.evict_to(fill_ratio)
    }

    /// Set the cost quota and evict down to the eviction threshold of the new quota.
    pub fn set_cost_quota(&self, cost_quota: usize) {
        self.raw.set_cost_quota(cost_quota)
    }

    /// Count of cached entries.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if there is no cached entry.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Sum of the cost of the cached entries.
    pub fn cost(&self) -> usize {
        self.raw.cost()
    }

    /// The cost quota.
    pub fn cost_quota(&self) -> usize {
        self.raw.cost_quota()
    }

    /// The fill ratio above which entry creation evicts first.
    pub fn eviction_threshold(&self) -> f64 {
        self.raw.eviction_threshold()
    }

    /// Metrics of the cache.
    pub fn metrics(&self) -> &Metrics {
        self.raw.metrics()
    }
}
