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

use lockcache_common::{
    code::{Key, Value},
    error::Result,
};

use crate::buffer::AlignedBuffer;

/// A freshly created payload and the cost it charges against the cache quota.
#[derive(Debug)]
pub struct Allocation<V> {
    /// The payload.
    pub value: V,
    /// The charged cost, in the caller-defined unit of the quota.
    pub cost: usize,
}

impl<V> Allocation<V> {
    /// Create an allocation with the given payload and cost.
    pub fn new(value: V, cost: usize) -> Self {
        Self { value, cost }
    }
}

/// Creates and destroys the payloads of a cache.
///
/// Whatever state the hooks need is captured by the implementing type.
pub trait Hooks<K, V>: Send + Sync + 'static
where
    K: Key,
    V: Value,
{
    /// Produce the payload of a newly created entry.
    ///
    /// Called on a cache miss while the structural lock of the cache is held, so all entry creations of a cache are
    /// serialized. The implementation must not call back into the cache or it will deadlock.
    ///
    /// On error nothing is inserted and nothing is charged.
    fn allocate(&self, key: &K) -> Result<Allocation<V>>;

    /// Release the resources of an entry that is leaving the cache.
    ///
    /// Called exactly once per destroyed entry, while the caller holds the entry exclusively and before the structural
    /// lock that unlinked it is released. A removed or evicted key is therefore always cleaned up before the same key
    /// can be allocated again. The implementation must not call back into the cache. The payload itself is dropped
    /// after the structural lock is released.
    #[expect(unused_variables)]
    fn cleanup(&self, key: &K, value: &mut V) {}

    /// Whether the creator of an entry is always handed a write lock, regardless of the requested mode.
    ///
    /// Hooks usually return a partially initialized payload that the creator finishes before anyone else reads it.
    fn write_on_create(&self) -> bool {
        true
    }
}

/// The default hooks: every entry is a zero-filled [`AlignedBuffer`] of a fixed size, charging its size.
#[derive(Debug, Clone)]
pub struct DefaultHooks {
    entry_size: usize,
}

impl DefaultHooks {
    /// Create the default hooks for entries of `entry_size` bytes.
    pub fn new(entry_size: usize) -> Self {
        Self { entry_size }
    }

    /// Size of every payload, in bytes.
    pub fn entry_size(&self) -> usize {
        self.entry_size
    }
}

impl<K> Hooks<K, AlignedBuffer> for DefaultHooks
where
    K: Key,
{
    fn allocate(&self, key: &K) -> Result<Allocation<AlignedBuffer>> {
        let value = AlignedBuffer::new(self.entry_size).map_err(|e| e.with_context("key", format!("{key:?}")))?;
        Ok(Allocation::new(value, self.entry_size))
    }

    fn write_on_create(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use lockcache_common::error::Error;

    use super::*;

    /// Hooks that allocate a `Vec<u32>` filled with the key and count calls.
    #[derive(Debug, Default, Clone)]
    pub struct CountingHooks {
        pub cost: usize,
        pub fail_on: Option<u32>,
        pub allocated: Arc<AtomicUsize>,
        pub cleaned: Arc<AtomicUsize>,
    }

    impl CountingHooks {
        pub fn new(cost: usize) -> Self {
            Self {
                cost,
                ..Default::default()
            }
        }

        pub fn allocated(&self) -> usize {
            self.allocated.load(Ordering::Relaxed)
        }

        pub fn cleaned(&self) -> usize {
            self.cleaned.load(Ordering::Relaxed)
        }
    }

    impl Hooks<u32, Vec<u32>> for CountingHooks {
        fn allocate(&self, key: &u32) -> Result<Allocation<Vec<u32>>> {
            if self.fail_on == Some(*key) {
                return Err(Error::allocation(self.cost, 1).with_context("key", key));
            }
            self.allocated.fetch_add(1, Ordering::Relaxed);
            Ok(Allocation::new(vec![*key; 4], self.cost))
        }

        fn cleanup(&self, key: &u32, value: &mut Vec<u32>) {
            assert!(value.iter().all(|v| v == key));
            value.clear();
            self.cleaned.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_utils::CountingHooks, *};

    #[test]
    fn test_default_hooks() {
        let hooks = DefaultHooks::new(256);
        let Allocation { value, cost } = Hooks::<u32, _>::allocate(&hooks, &1).unwrap();
        assert_eq!(cost, 256);
        assert_eq!(value.len(), 256);
        assert!(!Hooks::<u32, AlignedBuffer>::write_on_create(&hooks));
    }

    #[test]
    fn test_default_hooks_failure_carries_key() {
        let hooks = DefaultHooks::new(usize::MAX);
        let e = Hooks::<u32, _>::allocate(&hooks, &42).unwrap_err();
        assert!(e.context().iter().any(|(k, v)| *k == "key" && v == "42"));
    }

    #[test]
    fn test_custom_hooks_defaults() {
        let hooks = CountingHooks::new(10);
        assert!(hooks.write_on_create());
        let mut allocation = hooks.allocate(&3).unwrap();
        assert_eq!(allocation.value, vec![3; 4]);
        hooks.cleanup(&3, &mut allocation.value);
        assert_eq!((hooks.allocated(), hooks.cleaned()), (1, 1));
    }
}
