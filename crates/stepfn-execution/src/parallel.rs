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

use std::sync::Arc;

use error_stack::ResultExt as _;
use stepfn_config::EngineConfig;
use stepfn_core::values::apply_input_path;
use stepfn_core::{NextState, ParallelState, StateFailure, StateOutput, ValueRef};
use stepfn_observability::ExecutionIdGuard;
use stepfn_observability::fastrace::prelude::*;
use stepfn_state::{EventDetail, ExecutionContext, HistoryEventType};

use crate::catch::{self, CatchAll, CatchFilter, CatchRecovery};
use crate::join::run_branches;
use crate::{BranchRunner, BranchRunnerFactory, ExecutionError, Result, RetryPolicy};

/// Executes a `Parallel` state.
///
/// Every attempt constructs one runner per branch through the injected
/// factory and runs them concurrently against the state input. The state
/// succeeds with the array of shaped branch outputs in branch order.
///
/// History of a successful run:
/// `ENTERED, STARTED, SUCCEEDED, EXITED`. Once retries are exhausted:
/// `ENTERED, STARTED, FAILED`, after which the catch clause (if any) decides
/// the output and next state.
///
/// The executor holds no per-run state and may be executed repeatedly.
pub struct ParallelExecutor {
    state: Arc<ParallelState>,
    execution_context: Arc<ExecutionContext>,
    config: Arc<EngineConfig>,
    factory: Arc<dyn BranchRunnerFactory>,
    catch_filter: Arc<dyn CatchFilter>,
    retry_policy: RetryPolicy,
    execution_id: Arc<str>,
}

impl ParallelExecutor {
    pub fn new(
        state: ParallelState,
        execution_context: Arc<ExecutionContext>,
        config: Arc<EngineConfig>,
        factory: Arc<dyn BranchRunnerFactory>,
    ) -> Self {
        let retry_policy = RetryPolicy::from_spec(state.retry.as_ref(), &config.retry_defaults);
        let execution_id = Arc::from(execution_context.execution_id().to_string());
        Self {
            state: Arc::new(state),
            execution_context,
            config,
            factory,
            catch_filter: Arc::new(CatchAll),
            retry_policy,
            execution_id,
        }
    }

    /// Replace the filter deciding which failures the catch clause handles.
    pub fn with_catch_filter(mut self, catch_filter: impl CatchFilter + 'static) -> Self {
        self.catch_filter = Arc::new(catch_filter);
        self
    }

    pub fn state(&self) -> &ParallelState {
        &self.state
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Run the state against `input`.
    ///
    /// Fails with [`ExecutionError::BranchFailed`] when a branch failure is
    /// not recovered by a catch clause. The report's current context carries
    /// the failure of the last attempt.
    pub async fn execute(&self, input: ValueRef) -> Result<StateOutput> {
        let span = Span::enter_with_local_parent("parallel_state")
            .with_property(|| ("execution_id", self.execution_id.to_string()))
            .with_property(|| ("branches", self.state.branches.len().to_string()));

        self.execute_in_span(input).in_span(span).await
    }

    async fn execute_in_span(&self, input: ValueRef) -> Result<StateOutput> {
        let input = apply_input_path(&input, &self.state.input_path).change_context_lazy(|| {
            ExecutionError::InputPath {
                path: self.state.input_path.to_string(),
            }
        })?;

        self.record(HistoryEventType::ParallelStateEntered, None)?;
        self.record(HistoryEventType::ParallelStateStarted, None)?;

        match self.run_with_retry(&input).await {
            Ok(outputs) => {
                self.record(HistoryEventType::ParallelStateSucceeded, None)?;
                self.record(HistoryEventType::ParallelStateExited, None)?;

                let output = serde_json::Value::Array(
                    outputs.into_iter().map(ValueRef::into_value).collect(),
                );
                let next_state = self.resolve_next_state(None);
                log::info!(
                    "Parallel state succeeded with {} branches, next state: {}",
                    self.state.branches.len(),
                    display_next_state(next_state.as_ref())
                );
                Ok(StateOutput::new(output, next_state))
            }
            Err(failure) => {
                self.record(
                    HistoryEventType::ParallelStateFailed,
                    Some(EventDetail::new(failure.name.to_string(), failure.message.clone())),
                )?;

                let recovery = catch::recover(
                    self.state.catch.as_ref(),
                    self.catch_filter.as_ref(),
                    &input,
                    &failure,
                )?;
                match recovery {
                    Some(CatchRecovery { output, next }) => {
                        log::info!("Parallel state failed with {failure}; caught, continuing at '{next}'");
                        Ok(StateOutput::new(output, self.resolve_next_state(Some(next))))
                    }
                    None => {
                        log::info!("Parallel state failed with {failure}");
                        Err(error_stack::report!(ExecutionError::BranchFailed(failure)))
                    }
                }
            }
        }
    }

    /// Run attempts until one succeeds or the retry policy gives up.
    async fn run_with_retry(&self, input: &ValueRef) -> Result<Vec<ValueRef>, StateFailure> {
        let mut retry_count: u32 = 0;
        loop {
            log::debug!(
                "Parallel state attempt {} over {} branches",
                retry_count.saturating_add(1),
                self.state.branches.len()
            );

            let failure =
                match run_branches(self.create_runners(), input, &self.state, &self.execution_id)
                    .await
                {
                    Ok(outputs) => return Ok(outputs),
                    Err(failure) => failure,
                };

            retry_count = retry_count.saturating_add(1);
            if !self.retry_policy.should_retry(retry_count) {
                log::debug!("Parallel state giving up after {retry_count} failed attempts");
                return Err(failure);
            }

            let delay = self.retry_policy.delay_for(retry_count);
            log::warn!(
                "Parallel state attempt {retry_count} failed with {failure}; retrying in {delay:?}"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn create_runners(&self) -> Vec<Box<dyn BranchRunner>> {
        self.state
            .branches
            .iter()
            .map(|branch| {
                self.factory
                    .create(branch, self.execution_context.clone(), self.config.clone())
            })
            .collect()
    }

    /// The catch target wins, then `Next`, then `End`.
    fn resolve_next_state(&self, catch_next: Option<String>) -> Option<NextState> {
        let next_state = catch_next
            .map(NextState::State)
            .or_else(|| self.state.transition());
        if next_state.is_none() {
            log::warn!("Parallel state defines neither Next nor End; next state is undefined");
        }
        next_state
    }

    fn record(&self, event_type: HistoryEventType, detail: Option<EventDetail>) -> Result<()> {
        let _execution_guard = ExecutionIdGuard::new(&*self.execution_id);
        self.execution_context
            .record(event_type, detail)
            .change_context(ExecutionError::History)
            .attach_printable_lazy(|| format!("Failed to record {event_type}"))?;
        Ok(())
    }
}

fn display_next_state(next_state: Option<&NextState>) -> String {
    next_state.map_or_else(|| "<undefined>".to_string(), ToString::to_string)
}
