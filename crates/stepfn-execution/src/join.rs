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

//! Fan-out and join of the branches of one attempt.

use std::sync::Arc;

use futures::{StreamExt as _, stream::FuturesUnordered};
use stepfn_core::values::{apply_output_path, apply_result_path};
use stepfn_core::{ParallelState, STATES_BRANCH_ABORTED, StateFailure, StateOutput, ValueRef};
use stepfn_observability::fastrace::prelude::*;
use stepfn_observability::{BranchGuard, ExecutionIdGuard};

use crate::BranchRunner;

/// Run every branch concurrently against the same input.
///
/// Resolves with the post-processed branch outputs in branch order once all
/// branches have succeeded, or with the first failure to complete. Branches
/// still running at that point are detached, not cancelled; their results
/// are dropped.
pub(crate) async fn run_branches(
    runners: Vec<Box<dyn BranchRunner>>,
    input: &ValueRef,
    state: &Arc<ParallelState>,
    execution_id: &Arc<str>,
) -> Result<Vec<ValueRef>, StateFailure> {
    let mut pending: FuturesUnordered<_> = runners
        .into_iter()
        .enumerate()
        .map(|(index, runner)| {
            let input = input.clone();
            let state = state.clone();
            let execution_id = execution_id.clone();

            let span = Span::enter_with_local_parent("parallel_branch")
                .with_property(|| ("branch", index.to_string()));
            let handle = tokio::spawn(
                async move {
                    let output = match runner.execute(input.clone()).await {
                        Ok(output) => output,
                        Err(failure) => {
                            let _execution_guard = ExecutionIdGuard::new(&*execution_id);
                            let _branch_guard = BranchGuard::new(index);
                            log::debug!("Branch {index} failed: {failure}");
                            return Err(failure);
                        }
                    };

                    let _execution_guard = ExecutionIdGuard::new(&*execution_id);
                    let _branch_guard = BranchGuard::new(index);
                    log::debug!("Branch {index} completed");
                    shape_branch_output(&input, &state, output)
                }
                .in_span(span),
            );

            async move { (index, handle.await) }
        })
        .collect();

    let mut slots: Vec<Option<ValueRef>> = vec![None; pending.len()];
    while let Some((index, joined)) = pending.next().await {
        match joined {
            Ok(Ok(output)) => slots[index] = Some(output),
            Ok(Err(failure)) => return Err(failure),
            Err(join_error) => {
                log::error!("Branch {index} did not complete: {join_error}");
                let reason = if join_error.is_panic() {
                    "panicked"
                } else {
                    "was cancelled"
                };
                return Err(StateFailure::new(
                    STATES_BRANCH_ABORTED,
                    format!("branch {index} {reason}"),
                ));
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

/// Merge a branch result into the state input at `ResultPath` and select
/// `OutputPath` from the merged document.
fn shape_branch_output(
    input: &ValueRef,
    state: &ParallelState,
    output: StateOutput,
) -> Result<ValueRef, StateFailure> {
    let merged = apply_result_path(input, &state.result_path, output.output)
        .map_err(|report| StateFailure::from_report(&report))?;
    apply_output_path(&merged, &state.output_path).map_err(|report| StateFailure::from_report(&report))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{TestRunner, parallel_state};
    use serde_json::json;
    use stepfn_core::{DataPath, STATES_RUNTIME};

    fn execution_id() -> Arc<str> {
        Arc::from("test-execution")
    }

    #[tokio::test]
    async fn test_outputs_in_branch_order() {
        let runners: Vec<Box<dyn BranchRunner>> = vec![
            Box::new(TestRunner::succeed_after(json!("slow"), Duration::from_millis(30))),
            Box::new(TestRunner::succeed_after(json!("fast"), Duration::ZERO)),
            Box::new(TestRunner::succeed_after(json!("medium"), Duration::from_millis(10))),
        ];
        let state = Arc::new(parallel_state(3));

        let outputs = run_branches(runners, &ValueRef::new(json!({})), &state, &execution_id())
            .await
            .unwrap();
        let outputs: Vec<_> = outputs.iter().map(|o| o.clone_value()).collect();
        assert_eq!(outputs, vec![json!("slow"), json!("fast"), json!("medium")]);
    }

    #[tokio::test]
    async fn test_no_branches() {
        let state = Arc::new(parallel_state(0));
        let outputs = run_branches(Vec::new(), &ValueRef::new(json!(1)), &state, &execution_id())
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let runners: Vec<Box<dyn BranchRunner>> = vec![
            Box::new(TestRunner::fail_after(
                StateFailure::new("Slow", "late"),
                Duration::from_millis(50),
            )),
            Box::new(TestRunner::fail_after(
                StateFailure::new("Fast", "early"),
                Duration::ZERO,
            )),
        ];
        let state = Arc::new(parallel_state(2));

        let failure = run_branches(runners, &ValueRef::new(json!({})), &state, &execution_id())
            .await
            .unwrap_err();
        assert_eq!(failure, StateFailure::new("Fast", "early"));
    }

    #[tokio::test]
    async fn test_result_and_output_paths_per_branch() {
        let runners: Vec<Box<dyn BranchRunner>> = vec![
            Box::new(TestRunner::succeed_after(json!({"result": 42, "extra": 1}), Duration::ZERO)),
            Box::new(TestRunner::succeed_after(json!({"result": 7}), Duration::ZERO)),
        ];
        let mut state = parallel_state(2);
        state.result_path = DataPath::parse("$.branch").unwrap();
        state.output_path = DataPath::parse("$.branch.result").unwrap();
        let state = Arc::new(state);

        let outputs = run_branches(
            runners,
            &ValueRef::new(json!({"request": "x"})),
            &state,
            &execution_id(),
        )
        .await
        .unwrap();
        let outputs: Vec<_> = outputs.iter().map(|o| o.clone_value()).collect();
        assert_eq!(outputs, vec![json!(42), json!(7)]);
    }

    #[tokio::test]
    async fn test_output_path_miss_is_runtime_failure() {
        let runners: Vec<Box<dyn BranchRunner>> =
            vec![Box::new(TestRunner::succeed_after(json!({"a": 1}), Duration::ZERO))];
        let mut state = parallel_state(1);
        state.output_path = DataPath::parse("$.missing").unwrap();
        let state = Arc::new(state);

        let failure = run_branches(runners, &ValueRef::new(json!({})), &state, &execution_id())
            .await
            .unwrap_err();
        assert_eq!(failure.name, STATES_RUNTIME);
    }

    #[tokio::test]
    async fn test_panicking_branch_is_aborted() {
        let runners: Vec<Box<dyn BranchRunner>> = vec![
            Box::new(TestRunner::panicking()),
            Box::new(TestRunner::succeed_after(json!(1), Duration::from_millis(10))),
        ];
        let state = Arc::new(parallel_state(2));

        let failure = run_branches(runners, &ValueRef::new(json!({})), &state, &execution_id())
            .await
            .unwrap_err();
        assert_eq!(failure.name, STATES_BRANCH_ABORTED);
        assert_eq!(failure.message, "branch 0 panicked");
    }
}
