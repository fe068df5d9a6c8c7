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

use super::{NextState, WorkflowDefinition};
use crate::values::DataPath;

/// Discriminator for the `Type` field of a state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateType {
    #[default]
    Parallel,
}

/// A `Parallel` state: runs every branch against the same input and joins
/// their outputs into an array.
///
/// Definitions are assumed to be validated upstream; in particular exactly
/// one of `next` and `end` is expected to be set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ParallelState {
    #[serde(rename = "Type")]
    pub state_type: StateType,
    /// Branch workflows. Their order determines the order of the output array.
    pub branches: Vec<WorkflowDefinition>,
    #[serde(default)]
    pub input_path: DataPath,
    #[serde(default)]
    pub output_path: DataPath,
    #[serde(default)]
    pub result_path: DataPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch: Option<CatchSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ParallelState {
    /// A parallel state over the given branches that ends the workflow.
    pub fn new(branches: Vec<WorkflowDefinition>) -> Self {
        Self {
            state_type: StateType::Parallel,
            branches,
            input_path: DataPath::default(),
            output_path: DataPath::default(),
            result_path: DataPath::default(),
            retry: None,
            catch: None,
            next: None,
            end: true,
            comment: None,
        }
    }

    /// The configured transition, ignoring any catch clause.
    ///
    /// `Next` takes priority over `End`. Returns `None` when neither is set.
    pub fn transition(&self) -> Option<NextState> {
        match (&self.next, self.end) {
            (Some(next), _) => Some(NextState::State(next.clone())),
            (None, true) => Some(NextState::End),
            (None, false) => None,
        }
    }
}

/// The `Retry` field of a state.
///
/// Unset fields fall back to the engine's retry defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RetrySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// The `Catch` field of a state: where to go, and where to put the error,
/// once the state has failed for good.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CatchSpec {
    #[serde(default)]
    pub result_path: DataPath,
    pub next: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parallel_state_defaults() {
        let state: ParallelState = serde_json::from_value(json!({
            "Type": "Parallel",
            "Branches": [
                {"StartAt": "A", "States": {"A": {"Type": "Pass", "End": true}}}
            ],
            "Next": "Done"
        }))
        .unwrap();

        assert_eq!(state.state_type, StateType::Parallel);
        assert_eq!(state.branches.len(), 1);
        assert!(state.input_path.is_root());
        assert!(state.output_path.is_root());
        assert!(state.result_path.is_root());
        assert_eq!(state.retry, None);
        assert_eq!(state.catch, None);
        assert!(!state.end);
        assert_eq!(state.transition(), Some(NextState::state("Done")));
    }

    #[test]
    fn test_parallel_state_full() {
        let state: ParallelState = serde_json::from_value(json!({
            "Type": "Parallel",
            "Branches": [],
            "InputPath": "$.request",
            "ResultPath": "$.results",
            "OutputPath": null,
            "Retry": {"MaxAttempts": 2, "BackoffRate": 1.5},
            "Catch": {"ResultPath": "$.error", "Next": "Recover"},
            "End": true
        }))
        .unwrap();

        assert_eq!(state.input_path.to_string(), "$.request");
        assert_eq!(state.result_path.to_string(), "$.results");
        assert_eq!(state.output_path, DataPath::Discard);
        assert_eq!(
            state.retry,
            Some(RetrySpec {
                interval_seconds: None,
                backoff_rate: Some(1.5),
                max_attempts: Some(2),
            })
        );
        let catch = state.catch.as_ref().unwrap();
        assert_eq!(catch.next, "Recover");
        assert_eq!(catch.result_path.to_string(), "$.error");
        assert_eq!(state.transition(), Some(NextState::End));
    }

    #[test]
    fn test_rejects_other_state_types() {
        let result = serde_json::from_value::<ParallelState>(json!({
            "Type": "Task",
            "Branches": [],
            "End": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_transition_priority() {
        let mut state = ParallelState::new(vec![]);
        assert_eq!(state.transition(), Some(NextState::End));

        state.next = Some("Next".to_string());
        assert_eq!(state.transition(), Some(NextState::state("Next")));

        state.next = None;
        state.end = false;
        assert_eq!(state.transition(), None);
    }
}
