// Copyright 2025 DataStax Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use std::time::Duration;

use stepfn_config::RetryDefaults;
use stepfn_core::RetrySpec;

/// Resolved retry parameters of a state.
///
/// After the `n`-th failed attempt (`n` starting at 1) the state waits
/// `interval_seconds * backoff_rate^n` and tries again, as long as
/// `n <= max_attempts`. There is no jitter and no cap on the delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub interval_seconds: f64,
    pub backoff_rate: f64,
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NONE: Self = Self {
        interval_seconds: 0.0,
        backoff_rate: 0.0,
        max_attempts: 0,
    };

    /// Resolve the policy of a state.
    ///
    /// Without a `Retry` clause the state never retries. Fields of the clause
    /// that are omitted or zero take the engine defaults.
    pub fn from_spec(spec: Option<&RetrySpec>, defaults: &RetryDefaults) -> Self {
        let Some(spec) = spec else {
            return Self::NONE;
        };
        Self {
            interval_seconds: spec
                .interval_seconds
                .filter(|seconds| *seconds != 0.0)
                .unwrap_or(defaults.interval_seconds),
            backoff_rate: spec
                .backoff_rate
                .filter(|rate| *rate != 0.0)
                .unwrap_or(defaults.backoff_rate),
            max_attempts: spec
                .max_attempts
                .filter(|attempts| *attempts != 0)
                .unwrap_or(defaults.max_attempts),
        }
    }

    /// Whether another attempt follows the `retry_count`-th failure.
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count <= self.max_attempts
    }

    /// Wait before the attempt following the `retry_count`-th failure.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let exponent = i32::try_from(retry_count).unwrap_or(i32::MAX);
        let seconds = self.interval_seconds * self.backoff_rate.powi(exponent);
        Duration::try_from_secs_f64(seconds).unwrap_or(if seconds > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_retry_clause_never_retries() {
        let policy = RetryPolicy::from_spec(None, &RetryDefaults::default());
        assert_eq!(policy, RetryPolicy::NONE);
        assert!(!policy.should_retry(1));
    }

    #[test]
    fn test_empty_retry_clause_uses_defaults() {
        let policy = RetryPolicy::from_spec(Some(&RetrySpec::default()), &RetryDefaults::default());
        assert_eq!(
            policy,
            RetryPolicy {
                interval_seconds: 1.0,
                backoff_rate: 2.0,
                max_attempts: 3,
            }
        );
        assert!(policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_zero_fields_take_defaults() {
        let spec = RetrySpec {
            interval_seconds: Some(0.0),
            backoff_rate: Some(0.0),
            max_attempts: Some(0),
        };
        let policy = RetryPolicy::from_spec(Some(&spec), &RetryDefaults::default());
        assert_eq!(
            policy,
            RetryPolicy {
                interval_seconds: 1.0,
                backoff_rate: 2.0,
                max_attempts: 3,
            }
        );

        let spec = RetrySpec {
            interval_seconds: Some(0.5),
            backoff_rate: None,
            max_attempts: Some(1),
        };
        let policy = RetryPolicy::from_spec(Some(&spec), &RetryDefaults::default());
        assert_eq!(policy.interval_seconds, 0.5);
        assert_eq!(policy.backoff_rate, 2.0);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn test_engine_defaults_apply() {
        let defaults = RetryDefaults {
            interval_seconds: 0.5,
            backoff_rate: 3.0,
            max_attempts: 1,
        };
        let policy = RetryPolicy::from_spec(Some(&RetrySpec::default()), &defaults);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1500));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn test_delays() {
        let policy = RetryPolicy {
            interval_seconds: 1.0,
            backoff_rate: 2.0,
            max_attempts: 2,
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));

        let constant = RetryPolicy {
            interval_seconds: 0.25,
            backoff_rate: 1.0,
            max_attempts: 5,
        };
        assert_eq!(constant.delay_for(4), Duration::from_millis(250));
    }

    #[test]
    fn test_degenerate_delays() {
        let negative = RetryPolicy {
            interval_seconds: -1.0,
            backoff_rate: 2.0,
            max_attempts: 1,
        };
        assert_eq!(negative.delay_for(1), Duration::ZERO);

        let huge = RetryPolicy {
            interval_seconds: 1.0,
            backoff_rate: 1e10,
            max_attempts: 100,
        };
        assert_eq!(huge.delay_for(100), Duration::MAX);
    }
}
