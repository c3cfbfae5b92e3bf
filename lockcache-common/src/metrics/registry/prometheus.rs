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

use std::{collections::HashMap, sync::Arc};

use itertools::Itertools;
use parking_lot::Mutex;
use prometheus::{
    core::Collector, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry,
};

use crate::metrics::{
    registry::noop::NoopMetricsRegistry, BoxedCounter, BoxedGauge, BoxedHistogram, CounterOps, GaugeOps,
    HistogramOps, MetricKey, RegistryOps,
};

impl CounterOps for IntCounter {
    fn increase(&self, val: u64) {
        self.inc_by(val);
    }
}

impl GaugeOps for IntGauge {
    fn set(&self, val: u64) {
        IntGauge::set(self, val.try_into().unwrap_or(i64::MAX));
    }
}

impl HistogramOps for Histogram {
    fn record(&self, val: f64) {
        self.observe(val);
    }
}

#[derive(Debug, Clone)]
enum Family {
    Counter(IntCounterVec),
    Gauge(IntGaugeVec),
    Histogram(HistogramVec),
}

impl Family {
    fn collector(&self) -> Box<dyn Collector> {
        match self {
            Family::Counter(v) => Box::new(v.clone()),
            Family::Gauge(v) => Box::new(v.clone()),
            Family::Histogram(v) => Box::new(v.clone()),
        }
    }
}

/// Metrics registry backed by lib `prometheus`.
///
/// Clones share the registered metric families, so one registry can be handed to several cache instances.
#[derive(Debug, Clone)]
pub struct PrometheusMetricsRegistry {
    registry: Registry,
    families: Arc<Mutex<HashMap<&'static str, Family>>>,
}

impl PrometheusMetricsRegistry {
    /// Create a metrics registry that registers into the given prometheus registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            families: Arc::default(),
        }
    }

    /// Get the family of `key`, creating and registering it on first use.
    ///
    /// Returns `None` if the family cannot be created. Registration conflicts only leave the family unexported.
    fn family(&self, key: &MetricKey, create: impl FnOnce(&[&str]) -> prometheus::Result<Family>) -> Option<Family> {
        let mut families = self.families.lock();
        if let Some(family) = families.get(key.name) {
            return Some(family.clone());
        }

        let label_names = key.labels.iter().map(|(name, _)| *name).collect_vec();
        let family = match create(&label_names) {
            Ok(family) => family,
            Err(e) => {
                tracing::warn!("[prometheus]: cannot create metric {}: {e}", key.name);
                return None;
            }
        };
        if let Err(e) = self.registry.register(family.collector()) {
            tracing::warn!("[prometheus]: cannot register metric {}: {e}", key.name);
        }
        families.insert(key.name, family.clone());
        Some(family)
    }
}

fn label_values(key: &MetricKey) -> Vec<&str> {
    key.labels.iter().map(|(_, value)| value.as_ref()).collect_vec()
}

fn mismatch(key: &MetricKey, e: impl std::fmt::Display) {
    tracing::warn!("[prometheus]: metric {} does not match its family: {e}", key.name);
}

impl RegistryOps for PrometheusMetricsRegistry {
    fn counter(&self, key: &MetricKey) -> BoxedCounter {
        let family = self.family(key, |labels| {
            IntCounterVec::new(Opts::new(key.name, key.desc), labels).map(Family::Counter)
        });
        match family {
            Some(Family::Counter(v)) => match v.get_metric_with_label_values(&label_values(key)) {
                Ok(counter) => return Box::new(counter),
                Err(e) => mismatch(key, e),
            },
            Some(_) => mismatch(key, "not a counter"),
            None => {}
        }
        Box::new(NoopMetricsRegistry)
    }

    fn gauge(&self, key: &MetricKey) -> BoxedGauge {
        let family = self.family(key, |labels| {
            IntGaugeVec::new(Opts::new(key.name, key.desc), labels).map(Family::Gauge)
        });
        match family {
            Some(Family::Gauge(v)) => match v.get_metric_with_label_values(&label_values(key)) {
                Ok(gauge) => return Box::new(gauge),
                Err(e) => mismatch(key, e),
            },
            Some(_) => mismatch(key, "not a gauge"),
            None => {}
        }
        Box::new(NoopMetricsRegistry)
    }

    fn histogram(&self, key: &MetricKey, buckets: &[f64]) -> BoxedHistogram {
        let family = self.family(key, |labels| {
            let opts = HistogramOpts::new(key.name, key.desc).buckets(buckets.to_vec());
            HistogramVec::new(opts, labels).map(Family::Histogram)
        });
        match family {
            Some(Family::Histogram(v)) => match v.get_metric_with_label_values(&label_values(key)) {
                Ok(histogram) => return Box::new(histogram),
                Err(e) => mismatch(key, e),
            },
            Some(_) => mismatch(key, "not a histogram"),
            None => {}
        }
        Box::new(NoopMetricsRegistry)
    }
}

#[cfg(test)]
mod tests {
    use prometheus::{Encoder, TextEncoder};

    use super::*;

    fn export(registry: &Registry) -> String {
        let mut buf = vec![];
        TextEncoder::new().encode(&registry.gather(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_shared_family() {
        let registry = Registry::new();
        let metrics = PrometheusMetricsRegistry::new(registry.clone());
        let other = metrics.clone();

        let key = |name: &'static str| MetricKey::new("lockcache_test_total", "test").with_label("name", name);
        metrics.counter(&key("a")).increase(1);
        other.counter(&key("a")).increase(2);
        other.counter(&key("b")).increase(5);

        let text = export(&registry);
        assert!(text.contains(r#"lockcache_test_total{name="a"} 3"#), "{text}");
        assert!(text.contains(r#"lockcache_test_total{name="b"} 5"#), "{text}");
    }

    #[test]
    fn test_mismatch_falls_back_to_noop() {
        let registry = Registry::new();
        let metrics = PrometheusMetricsRegistry::new(registry.clone());

        metrics
            .gauge(&MetricKey::new("lockcache_test_cost", "test").with_label("name", "a"))
            .set(10);
        // Wrong kind and wrong label cardinality are both ignored.
        metrics.counter(&MetricKey::new("lockcache_test_cost", "test")).increase(1);
        metrics.gauge(&MetricKey::new("lockcache_test_cost", "test")).set(20);

        let text = export(&registry);
        assert!(text.contains(r#"lockcache_test_cost{name="a"} 10"#), "{text}");
    }

    #[test]
    fn test_histogram_buckets() {
        let registry = Registry::new();
        let metrics = PrometheusMetricsRegistry::new(registry.clone());

        let histogram = metrics.histogram(&MetricKey::new("lockcache_test_wait", "test"), &[0.001, 0.1]);
        histogram.record(0.01);
        histogram.record(1.0);

        let text = export(&registry);
        assert!(text.contains(r#"lockcache_test_wait_bucket{le="0.001"} 0"#), "{text}");
        assert!(text.contains(r#"lockcache_test_wait_bucket{le="0.1"} 1"#), "{text}");
        assert!(text.contains("lockcache_test_wait_count 2"), "{text}");
    }
}
