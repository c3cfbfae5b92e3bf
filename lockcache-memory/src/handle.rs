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

use std::{fmt::Debug, ops::Deref, sync::Arc};

use lockcache_common::code::{HashBuilder, Key, Value};
use parking_lot::{
    lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard},
    RawRwLock,
};
use serde::{Deserialize, Serialize};

use crate::raw::RawCacheInner;

/// Lock mode of an acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Shared access. Any number of readers may hold an entry at once.
    Read,
    /// Exclusive access. Excludes all other readers and writers.
    Write,
}

/// An owned lock on the payload of an entry.
pub enum Guard<V> {
    /// Shared lock.
    Read(ArcRwLockReadGuard<RawRwLock, V>),
    /// Exclusive lock.
    Write(ArcRwLockWriteGuard<RawRwLock, V>),
}

impl<V> Guard<V> {
    /// The mode the lock is held in.
    pub fn mode(&self) -> Mode {
        match self {
            Guard::Read(_) => Mode::Read,
            Guard::Write(_) => Mode::Write,
        }
    }

    /// Atomically turn an exclusive lock into a shared one. A shared lock is returned unchanged.
    pub fn downgrade(self) -> Self {
        match self {
            Guard::Write(guard) => Guard::Read(ArcRwLockWriteGuard::downgrade(guard)),
            guard => guard,
        }
    }
}

impl<V> Deref for Guard<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        match self {
            Guard::Read(guard) => &**guard,
            Guard::Write(guard) => &**guard,
        }
    }
}

/// A locked cache entry.
///
/// The entry stays locked in [`Handle::mode`] until the handle is released or dropped. While any handle of a cache is
/// alive, the cache itself is kept alive.
pub struct Handle<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    // Must be dropped before the cache.
    guard: Guard<V>,
    key: K,
    cost: usize,
    _inner: Arc<RawCacheInner<K, V, S>>,
}

impl<K, V, S> Debug for Handle<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("key", &self.key)
            .field("cost", &self.cost)
            .field("mode", &self.mode())
            .finish()
    }
}

impl<K, V, S> Handle<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    pub(crate) fn new(key: K, cost: usize, guard: Guard<V>, inner: Arc<RawCacheInner<K, V, S>>) -> Self {
        Self {
            guard,
            key,
            cost,
            _inner: inner,
        }
    }

    /// Key of the entry.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Cost charged by the entry.
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// The mode the entry is held in.
    pub fn mode(&self) -> Mode {
        self.guard.mode()
    }

    /// Payload of the entry.
    pub fn value(&self) -> &V {
        &*self.guard
    }

    /// Mutable payload of the entry. Returns [`None`] unless the entry is held in [`Mode::Write`].
    pub fn value_mut(&mut self) -> Option<&mut V> {
        match &mut self.guard {
            Guard::Write(guard) => Some(&mut **guard),
            Guard::Read(_) => None,
        }
    }

    /// Unlock the entry. Same as dropping the handle.
    pub fn release(self) {}

    /// Atomically turn a write handle into a read handle, letting other readers in without unlocking in between.
    ///
    /// A read handle is returned unchanged.
    pub fn downgrade(self) -> Self {
        Self {
            guard: self.guard.downgrade(),
            key: self.key,
            cost: self.cost,
            _inner: self._inner,
        }
    }
}

impl<K, V, S> Deref for Handle<K, V, S>
where
    K: Key,
    V: Value,
    S: HashBuilder,
{
    type Target = V;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::*;

    #[test]
    fn test_guard_downgrade() {
        let lock = Arc::new(RwLock::new(7u64));

        let guard = Guard::Write(lock.write_arc());
        assert_eq!(guard.mode(), Mode::Write);
        assert!(lock.try_read().is_none());

        let guard = guard.downgrade();
        assert_eq!(guard.mode(), Mode::Read);
        assert_eq!(*guard, 7);
        assert!(lock.try_read().is_some());
        assert!(lock.try_write().is_none());

        let guard = guard.downgrade();
        assert_eq!(guard.mode(), Mode::Read);
        drop(guard);
        assert!(lock.try_write().is_some());
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&Mode::Write).unwrap();
        assert_eq!(json, r#""write""#);
        assert_eq!(serde_json::from_str::<Mode>(r#""read""#).unwrap(), Mode::Read);
    }
}
