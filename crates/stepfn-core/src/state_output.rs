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

use serde::Serialize;

use crate::values::ValueRef;
use crate::workflow::NextState;

/// The result of running a state (or a whole branch workflow).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOutput {
    pub output: ValueRef,
    /// `None` when the definition names no continuation, which a validated
    /// definition never does.
    pub next_state: Option<NextState>,
}

impl StateOutput {
    pub fn new(output: impl Into<ValueRef>, next_state: Option<NextState>) -> Self {
        Self {
            output: output.into(),
            next_state,
        }
    }

    /// Output of a workflow that ran to its end.
    pub fn ended(output: impl Into<ValueRef>) -> Self {
        Self::new(output, Some(NextState::End))
    }
}
