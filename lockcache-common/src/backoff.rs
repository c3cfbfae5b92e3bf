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

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the bounded exponential backoff used by blocking retry loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Number of retries that only spin or yield before the first sleep.
    pub spins: u32,
    /// Delay of the first sleep.
    #[serde(with = "micros")]
    pub initial_delay: Duration,
    /// Upper bound of a single sleep. Delays double until they reach it.
    #[serde(with = "micros")]
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            spins: 4,
            initial_delay: Duration::from_micros(5),
            max_delay: Duration::from_millis(1),
        }
    }
}

impl BackoffConfig {
    /// Calculates the delay for a given retry attempt, starting from 0.
    ///
    /// Returns [`None`] for the attempts that only spin.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt < self.spins {
            return None;
        }
        let exp = (attempt - self.spins).min(31);
        let delay = self.initial_delay.saturating_mul(1u32 << exp);
        Some(delay.min(self.max_delay))
    }
}

/// Retry pacing for a single blocking operation.
///
/// Never gives up: callers retry until the resource they wait for is released.
#[derive(Debug)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    /// Create a fresh backoff.
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Number of times [`Backoff::snooze`] has been called.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Wait before the next retry.
    pub fn snooze(&mut self) {
        match self.config.delay_for_attempt(self.attempt) {
            None if self.attempt + 1 < self.config.spins => std::hint::spin_loop(),
            None => std::thread::yield_now(),
            Some(delay) => std::thread::sleep(delay),
        }
        self.attempt = self.attempt.saturating_add(1);
    }
}

mod micros {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_micros() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_micros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_bounded() {
        let config = BackoffConfig {
            spins: 2,
            initial_delay: Duration::from_micros(10),
            max_delay: Duration::from_micros(50),
        };
        assert_eq!(config.delay_for_attempt(0), None);
        assert_eq!(config.delay_for_attempt(1), None);
        assert_eq!(config.delay_for_attempt(2), Some(Duration::from_micros(10)));
        assert_eq!(config.delay_for_attempt(3), Some(Duration::from_micros(20)));
        assert_eq!(config.delay_for_attempt(4), Some(Duration::from_micros(40)));
        assert_eq!(config.delay_for_attempt(5), Some(Duration::from_micros(50)));
        assert_eq!(config.delay_for_attempt(1000), Some(Duration::from_micros(50)));
    }

    #[test]
    fn test_snooze_counts_attempts() {
        let mut backoff = Backoff::new(BackoffConfig {
            spins: 1,
            initial_delay: Duration::from_micros(1),
            max_delay: Duration::from_micros(2),
        });
        for _ in 0..4 {
            backoff.snooze();
        }
        assert_eq!(backoff.attempts(), 4);
    }

    #[test]
    fn test_config_from_json() {
        let config: BackoffConfig = serde_json::from_str(r#"{ "initial_delay": 20 }"#).unwrap();
        assert_eq!(config.initial_delay, Duration::from_micros(20));
        assert_eq!(config.max_delay, BackoffConfig::default().max_delay);
        assert_eq!(config.spins, BackoffConfig::default().spins);
    }
}
