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

use serde::{Deserialize, Serialize};

/// Default: wait 1 second before the first retry (scaled by the backoff rate).
pub const RETRY_DEFAULT_INTERVAL_SECONDS: f64 = 1.0;

/// Default: double the wait on every retry.
pub const RETRY_DEFAULT_BACKOFF_RATE: f64 = 2.0;

/// Default: retry up to 3 times after the first failed attempt.
pub const RETRY_DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Values used for fields omitted from a state's `Retry` clause.
///
/// These only apply when a `Retry` clause is present. A state without one
/// never retries.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryDefaults {
    /// Base wait in seconds. Default: 1.0.
    pub interval_seconds: f64,

    /// Multiplier applied per retry. Default: 2.0.
    pub backoff_rate: f64,

    /// Number of retries after the first attempt. Default: 3.
    pub max_attempts: u32,
}

impl Default for RetryDefaults {
    fn default() -> Self {
        Self {
            interval_seconds: RETRY_DEFAULT_INTERVAL_SECONDS,
            backoff_rate: RETRY_DEFAULT_BACKOFF_RATE,
            max_attempts: RETRY_DEFAULT_MAX_ATTEMPTS,
        }
    }
}
