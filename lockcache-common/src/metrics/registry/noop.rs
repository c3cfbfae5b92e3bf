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

use crate::metrics::{
    BoxedCounter, BoxedGauge, BoxedHistogram, CounterOps, GaugeOps, HistogramOps, MetricKey, RegistryOps,
};

/// Registry that records nothing. The default of every cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsRegistry;

impl CounterOps for NoopMetricsRegistry {
    fn increase(&self, _: u64) {}
}

impl GaugeOps for NoopMetricsRegistry {
    fn set(&self, _: u64) {}
}

impl HistogramOps for NoopMetricsRegistry {
    fn record(&self, _: f64) {}
}

impl RegistryOps for NoopMetricsRegistry {
    fn counter(&self, _: &MetricKey) -> BoxedCounter {
        Box::new(NoopMetricsRegistry)
    }

    fn gauge(&self, _: &MetricKey) -> BoxedGauge {
        Box::new(NoopMetricsRegistry)
    }

    fn histogram(&self, _: &MetricKey, _: &[f64]) -> BoxedHistogram {
        Box::new(NoopMetricsRegistry)
    }
}
