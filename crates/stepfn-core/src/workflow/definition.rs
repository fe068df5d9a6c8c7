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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A workflow definition: a graph of named states and the state to start at.
///
/// Branches of a parallel state are complete workflow definitions. The
/// individual states are kept as raw JSON; interpreting them is the job of
/// whatever engine runs the workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct WorkflowDefinition {
    pub start_at: String,
    /// States keyed by name, in definition order.
    pub states: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl WorkflowDefinition {
    pub fn new(start_at: impl Into<String>) -> Self {
        Self {
            start_at: start_at.into(),
            states: IndexMap::new(),
            comment: None,
        }
    }

    pub fn with_state(mut self, name: impl Into<String>, state: serde_json::Value) -> Self {
        self.states.insert(name.into(), state);
        self
    }

    /// The definition of the start state, if present.
    pub fn start_state(&self) -> Option<&serde_json::Value> {
        self.states.get(&self.start_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workflow_definition_serde() {
        let definition: WorkflowDefinition = serde_json::from_value(json!({
            "StartAt": "Second",
            "States": {
                "First": {"Type": "Pass", "Next": "Second"},
                "Second": {"Type": "Pass", "End": true},
            }
        }))
        .unwrap();

        assert_eq!(definition.start_at, "Second");
        assert_eq!(
            definition.states.keys().collect::<Vec<_>>(),
            vec!["First", "Second"]
        );
        assert_eq!(
            definition.start_state(),
            Some(&json!({"Type": "Pass", "End": true}))
        );
        assert_eq!(definition.comment, None);
    }
}
