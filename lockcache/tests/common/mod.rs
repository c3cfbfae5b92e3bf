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

#![expect(dead_code)]

use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use lockcache::{Allocation, Event, EventListener, Hooks, Result};
use parking_lot::Mutex;

/// A payload that detects conflicting concurrent access.
#[derive(Debug)]
pub struct Slot {
    pub key: u32,
    pub generation: usize,
    pub readers: AtomicUsize,
    pub writers: AtomicUsize,
    pub writes: usize,
}

impl Slot {
    pub fn read(&self) {
        self.readers.fetch_add(1, Ordering::SeqCst);
        assert_eq!(self.writers.load(Ordering::SeqCst), 0, "reader overlaps writer on {}", self.key);
        std::hint::spin_loop();
        self.readers.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn write(&mut self) {
        let writers = self.writers.fetch_add(1, Ordering::SeqCst);
        assert_eq!(writers, 0, "writer overlaps writer on {}", self.key);
        assert_eq!(self.readers.load(Ordering::SeqCst), 0, "writer overlaps reader on {}", self.key);
        self.writes += 1;
        self.writers.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hooks creating [`Slot`]s with a fixed cost and counting creations and cleanups.
#[derive(Debug, Clone, Default)]
pub struct SlotHooks {
    pub cost: usize,
    pub allocate_delay: Duration,
    pub created: Arc<AtomicUsize>,
    pub cleaned: Arc<AtomicUsize>,
}

impl SlotHooks {
    pub fn new(cost: usize) -> Self {
        Self {
            cost,
            ..Default::default()
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn cleaned(&self) -> usize {
        self.cleaned.load(Ordering::SeqCst)
    }
}

impl Hooks<u32, Slot> for SlotHooks {
    fn allocate(&self, key: &u32) -> Result<Allocation<Slot>> {
        if !self.allocate_delay.is_zero() {
            std::thread::sleep(self.allocate_delay);
        }
        let generation = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Allocation::new(
            Slot {
                key: *key,
                generation,
                readers: AtomicUsize::new(0),
                writers: AtomicUsize::new(0),
                writes: 0,
            },
            self.cost,
        ))
    }

    fn cleanup(&self, key: &u32, value: &mut Slot) {
        assert_eq!(*key, value.key);
        assert_eq!(value.readers.load(Ordering::SeqCst), 0);
        assert_eq!(value.writers.load(Ordering::SeqCst), 0);
        self.cleaned.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records every entry leaving the cache.
#[derive(Debug)]
pub struct Recorder<V> {
    pub events: Mutex<Vec<(Event, u32)>>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Default for Recorder<V> {
    fn default() -> Self {
        Self {
            events: Mutex::new(vec![]),
            _marker: PhantomData,
        }
    }
}

impl<V> Recorder<V> {
    pub fn count(&self, event: Event) -> usize {
        self.events.lock().iter().filter(|(e, _)| *e == event).count()
    }

    pub fn keys(&self, event: Event) -> Vec<u32> {
        self.events
            .lock()
            .iter()
            .filter(|(e, _)| *e == event)
            .map(|(_, key)| *key)
            .collect()
    }
}

impl<V> EventListener for Recorder<V>
where
    V: lockcache::Value,
{
    type Key = u32;
    type Value = V;

    fn on_leave(&self, reason: Event, key: &u32, _: &V) {
        self.events.lock().push((reason, *key));
    }
}
