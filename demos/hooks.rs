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

use std::sync::Arc;

use lockcache::{Allocation, Cache, CacheBuilder, Event, EventListener, Hooks, Mode, Result};

/// Renders a tile for every key and charges its byte size.
struct TileHooks;

impl Hooks<u32, String> for TileHooks {
    fn allocate(&self, key: &u32) -> Result<Allocation<String>> {
        let tile = format!("tile-{key}");
        let cost = tile.len();
        Ok(Allocation::new(tile, cost))
    }

    fn cleanup(&self, key: &u32, value: &mut String) {
        println!("Tile [key = {key}] [value = {value}] is cleaned up.");
        value.clear();
    }

    fn write_on_create(&self) -> bool {
        false
    }
}

struct EchoEventListener;

impl EventListener for EchoEventListener {
    type Key = u32;
    type Value = String;

    fn on_leave(&self, reason: Event, key: &u32, _: &String) {
        println!("Entry [key = {key}] leaves the cache for {reason:?}.");
    }
}

/// Output:
///
/// ```plain
/// Tile [key = 1] [value = tile-1] is cleaned up.
/// Entry [key = 1] leaves the cache for Evict.
/// Tile [key = 3] [value = tile-3] is cleaned up.
/// Entry [key = 3] leaves the cache for Remove.
/// Tile [key = 2] [value = tile-2] is cleaned up.
/// Entry [key = 2] leaves the cache for Clear.
/// Tile [key = 4] [value = tile-4] is cleaned up.
/// Entry [key = 4] leaves the cache for Clear.
/// ```
fn main() {
    let cache: Cache<u32, String> = CacheBuilder::new(20)
        .with_hooks(TileHooks)
        .with_event_listener(Arc::new(EchoEventListener))
        .build()
        .unwrap();

    for key in 1..=3 {
        let tile = cache.acquire(key, Mode::Read).unwrap();
        assert_eq!(*tile, format!("tile-{key}"));
    }
    // 18 of 20 is over the threshold, so creating the fourth tile evicts the first one.
    cache.acquire(4, Mode::Read).unwrap().release();
    cache.remove(&3);
}
