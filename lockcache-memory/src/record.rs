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

use std::{fmt::Debug, sync::Arc};

use parking_lot::{lock_api::ArcRwLockWriteGuard, RawRwLock, RwLock};

use crate::handle::{Guard, Mode};

/// A cache entry: its key, its charged cost and the lock guarding its payload.
pub struct Record<K, V> {
    key: K,
    cost: usize,
    lock: Arc<RwLock<V>>,
}

impl<K, V> Debug for Record<K, V>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("key", &self.key)
            .field("cost", &self.cost)
            .finish()
    }
}

impl<K, V> Record<K, V> {
    /// Wrap a freshly created payload.
    pub fn new(key: K, cost: usize, value: V) -> Self {
        Self {
            key,
            cost,
            lock: Arc::new(RwLock::new(value)),
        }
    }

    /// Get the key of the record.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Get the charged cost of the record.
    pub fn cost(&self) -> usize {
        self.cost
    }

    /// Lock the payload in `mode` without blocking.
    pub fn try_lock(&self, mode: Mode) -> Option<Guard<V>> {
        match mode {
            Mode::Read => self.lock.try_read_arc().map(Guard::Read),
            Mode::Write => self.lock.try_write_arc().map(Guard::Write),
        }
    }

    /// Lock the payload exclusively without blocking.
    pub fn try_write(&self) -> Option<ArcRwLockWriteGuard<RawRwLock, V>> {
        self.lock.try_write_arc()
    }

    /// Lock the payload of a record that nobody else can reach yet.
    pub(crate) fn lock_fresh(&self, mode: Mode) -> Guard<V> {
        strict_assert_fresh(&self.lock);
        match mode {
            Mode::Read => Guard::Read(self.lock.read_arc()),
            Mode::Write => Guard::Write(self.lock.write_arc()),
        }
    }

    /// Visit the payload if it is not exclusively held.
    pub(crate) fn peek<R>(&self, f: impl FnOnce(Option<&V>) -> R) -> R {
        match self.lock.try_read() {
            Some(value) => f(Some(&value)),
            None => f(None),
        }
    }
}

fn strict_assert_fresh<V>(lock: &Arc<RwLock<V>>) {
    lockcache_common::strict_assert_eq!(Arc::strong_count(lock), 1);
    lockcache_common::strict_assert!(!lock.is_locked());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_lock_modes() {
        let record = Record::new(1u32, 10, String::from("payload"));

        let r1 = record.try_lock(Mode::Read).unwrap();
        let r2 = record.try_lock(Mode::Read).unwrap();
        assert_eq!(&*r1, "payload");
        assert!(record.try_lock(Mode::Write).is_none());
        assert!(record.try_write().is_none());
        drop((r1, r2));

        let w = record.try_lock(Mode::Write).unwrap();
        assert!(record.try_lock(Mode::Read).is_none());
        record.peek(|v| assert!(v.is_none()));
        drop(w);

        record.peek(|v| assert_eq!(v.map(|s| s.as_str()), Some("payload")));
        assert!(record.try_write().is_some());
    }

    #[test]
    fn test_fresh_lock() {
        let record = Record::new(1u32, 10, 0u64);
        let guard = record.lock_fresh(Mode::Write);
        assert_eq!(guard.mode(), Mode::Write);
        assert!(record.try_lock(Mode::Read).is_none());
    }
}
