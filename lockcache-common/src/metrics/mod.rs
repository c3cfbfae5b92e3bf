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

use std::{borrow::Cow, fmt::Debug};

/// Monotonic counter.
pub trait CounterOps: Send + Sync + 'static + Debug {
    /// Increase the counter by `val`.
    fn increase(&self, val: u64);
}

/// Gauge that tracks a current amount.
pub trait GaugeOps: Send + Sync + 'static + Debug {
    /// Set the gauge to `val`.
    fn set(&self, val: u64);
}

/// Distribution of observed values.
pub trait HistogramOps: Send + Sync + 'static + Debug {
    /// Record an observation.
    fn record(&self, val: f64);
}

/// Identity of a single labelled metric.
///
/// Metrics sharing a name belong to the same family and must carry the same label names, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricKey {
    /// Family name.
    pub name: &'static str,
    /// Family description.
    pub desc: &'static str,
    /// Label names and values.
    pub labels: Vec<(&'static str, Cow<'static, str>)>,
}

impl MetricKey {
    /// Create a metric key without labels.
    pub fn new(name: &'static str, desc: &'static str) -> Self {
        Self {
            name,
            desc,
            labels: vec![],
        }
    }

    /// Append a label.
    pub fn with_label(mut self, name: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        self.labels.push((name, value.into()));
        self
    }
}

/// Metrics backend.
///
/// A registry must tolerate the same key being requested more than once, e.g. by several caches sharing the registry.
pub trait RegistryOps: Send + Sync + 'static + Debug {
    /// Get or register a counter.
    fn counter(&self, key: &MetricKey) -> BoxedCounter;

    /// Get or register a gauge.
    fn gauge(&self, key: &MetricKey) -> BoxedGauge;

    /// Get or register a histogram with the given bucket upper bounds.
    fn histogram(&self, key: &MetricKey, buckets: &[f64]) -> BoxedHistogram;
}

/// Boxed generic counter.
pub type BoxedCounter = Box<dyn CounterOps>;
/// Boxed generic gauge.
pub type BoxedGauge = Box<dyn GaugeOps>;
/// Boxed generic histogram.
pub type BoxedHistogram = Box<dyn HistogramOps>;
/// Boxed generic registry.
pub type BoxedRegistry = Box<dyn RegistryOps>;

/// Cache metrics model.
pub mod model;
/// Provisioned metrics registries.
pub mod registry;
