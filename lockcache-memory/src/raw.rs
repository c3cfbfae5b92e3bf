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

use std::{
    hash::Hash,
    panic::Location,
    sync::Arc,
    time::{Duration, Instant},
};

use equivalent::Equivalent;
use itertools::Itertools;
use lockcache_common::{
    backoff::{Backoff, BackoffConfig},
    code::{HashBuilder, Key, Value},
    error::Result,
    event::{Event, EventListener},
    metrics::model::Metrics,
    strict_assert,
};
use parking_lot::{lock_api::ArcRwLockWriteGuard, Mutex, RawRwLock};

use crate::{
    handle::{Handle, Mode},
    hooks::{Allocation, Hooks},
    index::Index,
    record::Record,
};

pub struct RawCacheConfig<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    pub cost_quota: usize,
    pub eviction_threshold: f64,
    pub hash_builder: S,
    pub hooks: Arc<dyn Hooks<K, V>>,
    pub event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    pub metrics: Arc<Metrics>,
    pub backoff: BackoffConfig,
    pub slow_wait_threshold: Duration,
}

/// An unlinked record, exclusively held by the thread that is about to destroy it.
struct Garbage<K, V> {
    event: Event,
    record: Record<K, V>,
    guard: ArcRwLockWriteGuard<RawRwLock, V>,
}

/// Everything guarded by the structural lock.
struct RawCacheState<K, V, S> {
    index: Index<K, V, S>,
    cost: usize,
    quota: usize,
}

impl<K, V, S> RawCacheState<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn is_over(&self, fill_ratio: f64) -> bool {
        self.cost as f64 > self.quota as f64 * fill_ratio
    }

    /// Evict unlocked records, least recently used first, until the cost drops below `quota * fill_ratio`.
    ///
    /// Records that are currently held are skipped.
    fn evict(&mut self, fill_ratio: f64, garbages: &mut Vec<Garbage<K, V>>) {
        let target = self.quota as f64 * fill_ratio;
        let before = garbages.len();

        let mut cursor = self.index.front();
        while let Some(token) = cursor {
            if (self.cost as f64) < target {
                break;
            }
            cursor = self.index.next(token);

            let guard = match self.index.record(token).try_write() {
                Some(guard) => guard,
                None => continue,
            };
            let record = self.index.unlink(token);
            strict_assert!(self.cost >= record.cost());
            self.cost -= record.cost();
            tracing::trace!("[raw]: evict {:?}", record);

            garbages.push(Garbage {
                event: Event::Evict,
                record,
                guard,
            });
        }

        if garbages.len() > before {
            self.index.shrink();
        }
    }
}

pub(crate) struct RawCacheInner<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    state: Mutex<RawCacheState<K, V, S>>,

    hooks: Arc<dyn Hooks<K, V>>,
    event_listener: Option<Arc<dyn EventListener<Key = K, Value = V>>>,
    metrics: Arc<Metrics>,

    eviction_threshold: f64,
    backoff: BackoffConfig,
    slow_wait_threshold: Duration,
}

impl<K, V, S> RawCacheInner<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    /// Run the cleanup hook and notify the listener for records that have just been unlinked.
    ///
    /// Must be called before the structural lock that unlinked them is released, so that a key is cleaned up before
    /// it can be created again.
    fn retire(&self, garbages: &mut [Garbage<K, V>]) {
        for Garbage { event, record, guard } in garbages.iter_mut() {
            self.hooks.cleanup(record.key(), &mut **guard);
            if let Some(listener) = self.event_listener.as_ref() {
                listener.on_leave(*event, record.key(), &**guard);
            }
            match event {
                Event::Evict => self.metrics.memory_evict.increase(1),
                Event::Remove => self.metrics.memory_remove.increase(1),
                Event::Clear => self.metrics.memory_clear.increase(1),
            }
        }
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::inner::clear"))]
    fn clear(&mut self) {
        let mut garbages = {
            let state = self.state.get_mut();
            let garbages = state
                .index
                .drain()
                .map(|record| {
                    // No handle can outlive the cache, so nothing holds the record.
                    let guard = match record.try_write() {
                        Some(guard) => guard,
                        None => unreachable!("record {record:?} is held while the cache is dropped"),
                    };
                    Garbage {
                        event: Event::Clear,
                        record,
                        guard,
                    }
                })
                .collect_vec();
            state.cost = 0;
            garbages
        };
        self.metrics.memory_cost.set(0);
        self.retire(&mut garbages);
    }
}

impl<K, V, S> Drop for RawCacheInner<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn drop(&mut self) {
        self.clear();
    }
}

pub struct RawCache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    inner: Arc<RawCacheInner<K, V, S>>,
}

impl<K, V, S> Clone for RawCache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, S> RawCache<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    pub fn new(config: RawCacheConfig<K, V, S>) -> Self {
        let state = RawCacheState {
            index: Index::new(config.hash_builder),
            cost: 0,
            quota: config.cost_quota,
        };

        let inner = RawCacheInner {
            state: Mutex::new(state),
            hooks: config.hooks,
            event_listener: config.event_listener,
            metrics: config.metrics,
            eviction_threshold: config.eviction_threshold,
            backoff: config.backoff,
            slow_wait_threshold: config.slow_wait_threshold,
        };

        Self { inner: Arc::new(inner) }
    }

    #[track_caller]
    pub fn acquire(&self, key: K, mode: Mode) -> Result<Handle<K, V, S>> {
        let caller = Location::caller();
        self.acquire_inner(key, mode, caller)
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::acquire"))]
    fn acquire_inner(&self, key: K, mode: Mode, caller: &'static Location<'static>) -> Result<Handle<K, V, S>> {
        let start = Instant::now();
        let mut backoff = Backoff::new(self.inner.backoff);
        let mut garbages = vec![];

        let res = loop {
            let mut state = self.inner.state.lock();

            if let Some(token) = state.index.get(&key) {
                let (guard, cost) = {
                    let record = state.index.record(token);
                    (record.try_lock(mode), record.cost())
                };
                match guard {
                    Some(guard) => {
                        state.index.touch(token);
                        drop(state);
                        self.inner.metrics.memory_hit.increase(1);
                        break Ok(Handle::new(key.clone(), cost, guard, self.inner.clone()));
                    }
                    None => {
                        drop(state);
                        self.inner.metrics.memory_contend.increase(1);
                        backoff.snooze();
                        continue;
                    }
                }
            }

            self.inner.metrics.memory_miss.increase(1);
            break self.create(&mut state, key.clone(), mode, &mut garbages);
        };

        // Do not deallocate data within the lock section.
        drop(garbages);

        self.observe_wait(start, &key, mode, backoff.attempts(), caller);
        res
    }

    /// Create, link and lock a new record. Called with the structural lock held.
    fn create(
        &self,
        state: &mut RawCacheState<K, V, S>,
        key: K,
        mode: Mode,
        garbages: &mut Vec<Garbage<K, V>>,
    ) -> Result<Handle<K, V, S>> {
        if state.is_over(self.inner.eviction_threshold) {
            state.evict(self.inner.eviction_threshold, garbages);
            self.inner.retire(garbages);
            tracing::debug!(
                "[raw]: evicted {} entries before creating {key:?}, cost: {}/{}",
                garbages.len(),
                state.cost,
                state.quota
            );
        }

        let Allocation { value, cost } = match self.inner.hooks.allocate(&key) {
            Ok(allocation) => allocation,
            Err(e) => {
                self.inner.metrics.memory_create_failed.increase(1);
                self.inner.metrics.memory_cost.set(state.cost as u64);
                tracing::debug!("[raw]: create {key:?} failed: {e}");
                return Err(e);
            }
        };

        let mode = if self.inner.hooks.write_on_create() {
            Mode::Write
        } else {
            mode
        };
        let record = Record::new(key.clone(), cost, value);
        let guard = record.lock_fresh(mode);
        state.index.insert(record);
        state.cost += cost;

        self.inner.metrics.memory_create.increase(1);
        self.inner.metrics.memory_cost.set(state.cost as u64);
        tracing::trace!("[raw]: create {key:?} with cost {cost} in {mode:?} mode");

        Ok(Handle::new(key, cost, guard, self.inner.clone()))
    }

    #[track_caller]
    pub fn try_acquire<Q>(&self, key: &Q, mode: Mode) -> Option<Handle<K, V, S>>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let start = Instant::now();
        let caller = Location::caller();

        let handle = {
            let mut state = self.inner.state.lock();
            let token = state.index.get(key);
            match token {
                None => {
                    self.inner.metrics.memory_miss.increase(1);
                    None
                }
                Some(token) => {
                    let record = state.index.record(token);
                    let (cost, key) = (record.cost(), record.key().clone());
                    match record.try_lock(mode) {
                        Some(guard) => {
                            state.index.touch(token);
                            self.inner.metrics.memory_hit.increase(1);
                            Some(Handle::new(key, cost, guard, self.inner.clone()))
                        }
                        None => {
                            self.inner.metrics.memory_contend.increase(1);
                            None
                        }
                    }
                }
            }
        };

        let elapsed = start.elapsed();
        if elapsed > self.inner.slow_wait_threshold {
            tracing::warn!("[raw]: slow try acquire in {mode:?} mode at {caller}, elapsed: {elapsed:?}");
        }
        handle
    }

    fn observe_wait(&self, start: Instant, key: &K, mode: Mode, retries: u32, caller: &'static Location<'static>) {
        let elapsed = start.elapsed();
        self.inner.metrics.memory_acquire_wait.record(elapsed.as_secs_f64());
        if elapsed > self.inner.slow_wait_threshold {
            tracing::warn!(
                "[raw]: slow acquire {key:?} in {mode:?} mode at {caller}, elapsed: {elapsed:?}, retries: {retries}"
            );
        }
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::remove"))]
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let mut backoff = Backoff::new(self.inner.backoff);

        let garbage = loop {
            let mut state = self.inner.state.lock();

            let token = match state.index.get(key) {
                Some(token) => token,
                None => return false,
            };

            match state.index.record(token).try_write() {
                Some(guard) => {
                    let record = state.index.unlink(token);
                    strict_assert!(state.cost >= record.cost());
                    state.cost -= record.cost();
                    self.inner.metrics.memory_cost.set(state.cost as u64);
                    tracing::trace!("[raw]: remove {:?}", record);
                    let mut garbage = Garbage {
                        event: Event::Remove,
                        record,
                        guard,
                    };
                    self.inner.retire(std::slice::from_mut(&mut garbage));
                    break garbage;
                }
                None => {
                    drop(state);
                    self.inner.metrics.memory_contend.increase(1);
                    backoff.snooze();
                }
            }
        };

        // Do not deallocate data within the lock section.
        drop(garbage);
        true
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::contains"))]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.inner.state.lock().index.get(key).is_some()
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::for_each"))]
    pub fn for_each<F, E>(&self, mut visitor: F) -> std::result::Result<(), E>
    where
        F: FnMut(&K, Option<&V>) -> std::result::Result<(), E>,
    {
        let state = self.inner.state.lock();
        let res = state
            .index
            .iter()
            .try_for_each(|record| record.peek(|value| visitor(record.key(), value)));
        res
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::evict_to"))]
    pub fn evict_to(&self, fill_ratio: f64) -> usize {
        let mut garbages = vec![];
        {
            let mut state = self.inner.state.lock();
            state.evict(fill_ratio, &mut garbages);
            self.inner.retire(&mut garbages);
            self.inner.metrics.memory_cost.set(state.cost as u64);
            tracing::debug!(
                "[raw]: evict to fill ratio {fill_ratio}, evicted: {}, cost: {}/{}",
                garbages.len(),
                state.cost,
                state.quota
            );
        }

        let evicted = garbages.len();
        // Do not deallocate data within the lock section.
        drop(garbages);
        evicted
    }

    #[cfg_attr(feature = "tracing", fastrace::trace(name = "lockcache::memory::raw::set_cost_quota"))]
    pub fn set_cost_quota(&self, quota: usize) {
        let mut garbages = vec![];
        {
            let mut state = self.inner.state.lock();
            state.quota = quota;
            if state.is_over(self.inner.eviction_threshold) {
                state.evict(self.inner.eviction_threshold, &mut garbages);
                self.inner.retire(&mut garbages);
            }
            self.inner.metrics.memory_cost.set(state.cost as u64);
        }
        // Do not deallocate data within the lock section.
        drop(garbages);
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().index.is_empty()
    }

    pub fn cost(&self) -> usize {
        self.inner.state.lock().cost
    }

    pub fn cost_quota(&self) -> usize {
        self.inner.state.lock().quota
    }

    pub fn eviction_threshold(&self) -> f64 {
        self.inner.eviction_threshold
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    #[cfg(test)]
    fn keys(&self) -> Vec<K> {
        self.inner.state.lock().index.keys()
    }

    #[cfg(test)]
    fn assert_cost(&self) {
        let state = self.inner.state.lock();
        assert_eq!(state.cost, state.index.iter().map(|record| record.cost()).sum::<usize>());
    }
}
