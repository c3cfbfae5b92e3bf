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

use std::borrow::Cow;

use super::{
    registry::noop::NoopMetricsRegistry, BoxedCounter, BoxedGauge, BoxedHistogram, MetricKey, RegistryOps,
};

/// Bucket upper bounds of lock wait histograms, in seconds: 1µs up to about 4s, growing by 4x.
pub fn wait_buckets() -> Vec<f64> {
    (0..12).map(|i| 1e-6 * 4f64.powi(i)).collect()
}

/// Metrics of one cache instance.
#[derive(Debug)]
pub struct Metrics {
    /// Acquisitions that found the key and locked it.
    pub memory_hit: BoxedCounter,
    /// Lookups that did not find the key.
    pub memory_miss: BoxedCounter,
    /// Entries created on a miss.
    pub memory_create: BoxedCounter,
    /// Creations rolled back because the payload could not be allocated.
    pub memory_create_failed: BoxedCounter,
    /// Lock attempts that failed because the entry was held in a conflicting mode.
    pub memory_contend: BoxedCounter,
    /// Entries reclaimed by garbage collection.
    pub memory_evict: BoxedCounter,
    /// Entries removed by key.
    pub memory_remove: BoxedCounter,
    /// Entries drained on teardown.
    pub memory_clear: BoxedCounter,

    /// Sum of the cost of all live entries.
    pub memory_cost: BoxedGauge,

    /// Wall time spent inside blocking acquisitions, in seconds.
    pub memory_acquire_wait: BoxedHistogram,
}

impl Metrics {
    /// Register the metrics of the cache named `name`.
    pub fn new(name: impl Into<Cow<'static, str>>, registry: &dyn RegistryOps) -> Self {
        let name = name.into();

        let op = |op: &'static str| {
            registry.counter(
                &MetricKey::new("lockcache_memory_op_total", "lockcache in-memory cache operations")
                    .with_label("name", name.clone())
                    .with_label("op", op),
            )
        };
        let cost = MetricKey::new("lockcache_memory_cost", "lockcache in-memory cache charged cost")
            .with_label("name", name.clone());
        let wait = MetricKey::new(
            "lockcache_memory_acquire_wait_seconds",
            "lockcache in-memory cache blocking acquisition wait time",
        )
        .with_label("name", name.clone());

        Self {
            memory_hit: op("hit"),
            memory_miss: op("miss"),
            memory_create: op("create"),
            memory_create_failed: op("create_failed"),
            memory_contend: op("contend"),
            memory_evict: op("evict"),
            memory_remove: op("remove"),
            memory_clear: op("clear"),
            memory_cost: registry.gauge(&cost),
            memory_acquire_wait: registry.histogram(&wait, &wait_buckets()),
        }
    }

    /// Metrics that record nothing.
    pub fn noop() -> Self {
        Self::new("noop", &NoopMetricsRegistry)
    }
}
