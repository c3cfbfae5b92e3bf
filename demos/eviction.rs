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

use std::{thread, time::Duration};

use lockcache::{Cache, Mode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cache: Cache<u64> = Cache::builder(1024 * 1024)
        .with_name("eviction")
        .with_entry_size(64 * 1024)
        .with_slow_wait_threshold(Duration::from_millis(10))
        .build()
        .unwrap();

    // Pin a hot entry while other threads churn through more entries than the quota can hold.
    let hot = cache.acquire(0, Mode::Read).unwrap();

    thread::scope(|s| {
        for t in 0..4u64 {
            let cache = &cache;
            s.spawn(move || {
                for i in 0..64 {
                    let key = 1 + t * 64 + i;
                    let mut handle = cache.acquire(key, Mode::Write).unwrap();
                    handle.value_mut().unwrap().fill(key as u8);
                }
            });
        }
    });

    assert!(cache.contains(&0));
    tracing::info!(
        "entries: {}, cost: {}/{}",
        cache.len(),
        cache.cost(),
        cache.cost_quota()
    );
    drop(hot);

    let evicted = cache.evict_to(0.0);
    tracing::info!("evicted the remaining {evicted} entries");
    assert!(cache.is_empty());
}
