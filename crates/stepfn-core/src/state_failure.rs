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

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::values::ValueRef;

/// Error name for failures raised by the engine itself (path resolution and the like).
pub const STATES_RUNTIME: &str = "States.Runtime";

/// Error name for a branch whose task panicked or was aborted.
pub const STATES_BRANCH_ABORTED: &str = "States.BranchAborted";

/// A failure reported by a workflow or one of its branches.
///
/// `name` is a stable error kind (`States.Runtime`, `TaskFailed`, ...) and
/// `message` a human-readable description. Serialized as `{"name", "message"}`,
/// which is also the document a catch clause merges into the state input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFailure {
    pub name: Cow<'static, str>,
    pub message: String,
}

impl std::fmt::Display for StateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for StateFailure {}

impl StateFailure {
    pub fn new(name: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(STATES_RUNTIME, message)
    }

    /// Convert an engine error report into a runtime failure.
    pub fn from_report<C: error_stack::Context>(report: &error_stack::Report<C>) -> Self {
        Self::runtime(report.current_context().to_string())
    }

    /// The failure as a JSON document.
    pub fn to_value(&self) -> ValueRef {
        ValueRef::new(serde_json::json!({
            "name": self.name,
            "message": self.message,
        }))
    }
}
