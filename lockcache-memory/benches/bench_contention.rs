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

use std::{hint::black_box, sync::Barrier, thread};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lockcache_memory::{Cache, Mode};
use rand::{rngs::SmallRng, Rng, SeedableRng};

const ENTRY_SIZE: usize = 4096;
const KEYS: u32 = 256;
const OPS: usize = 1000;

fn cache(quota_entries: usize) -> Cache<u32> {
    Cache::builder(ENTRY_SIZE * quota_entries)
        .with_entry_size(ENTRY_SIZE)
        .build()
        .unwrap()
}

fn run(cache: &Cache<u32>, threads: usize, write_ratio: f64) {
    let barrier = Barrier::new(threads);
    thread::scope(|s| {
        for t in 0..threads {
            let barrier = &barrier;
            s.spawn(move || {
                let mut rng = SmallRng::seed_from_u64(t as u64);
                barrier.wait();
                for _ in 0..OPS {
                    let key = rng.random_range(0..KEYS);
                    let mode = if rng.random_bool(write_ratio) {
                        Mode::Write
                    } else {
                        Mode::Read
                    };
                    let handle = cache.acquire(key, mode).unwrap();
                    black_box(handle[0]);
                }
            });
        }
    });
}

fn bench_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("acquire_release");
    for threads in [1, 4, 16] {
        for write_ratio in [0.0, 0.1, 0.5] {
            // Large enough to hold every key, so only lock contention is measured.
            let cache = cache(KEYS as usize * 2);
            run(&cache, 1, 0.0);
            group.bench_with_input(
                BenchmarkId::new(format!("{threads}_threads"), write_ratio),
                &write_ratio,
                |b, &write_ratio| b.iter(|| run(&cache, threads, write_ratio)),
            );
        }
    }
    group.finish();
}

fn bench_create_evict(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_evict");
    for threads in [1, 4, 16] {
        // A quarter of the keys fit, so most acquisitions create and evict.
        let cache = cache(KEYS as usize / 4);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter(|| run(&cache, threads, 0.0))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_create_evict);
criterion_main!(benches);
