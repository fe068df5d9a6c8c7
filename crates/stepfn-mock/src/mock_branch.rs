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

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stepfn_config::EngineConfig;
use stepfn_core::{StateFailure, StateOutput, ValueRef, WorkflowDefinition};
use stepfn_execution::{BranchRunner, BranchRunnerFactory};
use stepfn_state::ExecutionContext;
use tokio::time::Instant;

/// What a mock branch does when executed.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(untagged, rename_all = "camelCase")]
pub enum MockBranchBehavior {
    /// Fail with the given failure.
    Failure { failure: StateFailure },
    /// Succeed with the given output.
    Output { output: ValueRef },
    /// Succeed with the branch input.
    Echo {},
}

/// One scripted execution of a mock branch.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MockOutcome {
    #[serde(flatten)]
    pub behavior: MockBranchBehavior,
    /// Time to wait before resolving.
    #[serde(default)]
    pub delay_ms: u64,
}

impl MockOutcome {
    pub fn output(output: impl Into<ValueRef>) -> Self {
        Self {
            behavior: MockBranchBehavior::Output {
                output: output.into(),
            },
            delay_ms: 0,
        }
    }

    pub fn failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            behavior: MockBranchBehavior::Failure {
                failure: StateFailure::new(name.into(), message),
            },
            delay_ms: 0,
        }
    }

    pub fn echo() -> Self {
        Self {
            behavior: MockBranchBehavior::Echo {},
            delay_ms: 0,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Script and observations of one branch, keyed by its `StartAt`.
#[derive(Debug, Default)]
struct MockBranch {
    script: Vec<MockOutcome>,
    started: Vec<(Instant, ValueRef)>,
    completed: usize,
}

impl MockBranch {
    /// The outcome of the next execution. The last scripted outcome repeats;
    /// an empty script echoes the input.
    fn next_outcome(&self) -> MockOutcome {
        let attempt = self.started.len();
        self.script
            .get(attempt)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_else(MockOutcome::echo)
    }
}

type Branches = Arc<Mutex<HashMap<String, MockBranch>>>;

fn lock(branches: &Branches) -> MutexGuard<'_, HashMap<String, MockBranch>> {
    branches.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A [`BranchRunnerFactory`] whose branches follow a script.
///
/// Branches are identified by the `StartAt` of their definition. Every
/// execution of a branch consumes the next outcome of its script and is
/// recorded so tests can inspect attempts, inputs and timing.
#[derive(Clone, Default, Debug)]
pub struct MockBranchRunnerFactory {
    branches: Branches,
}

impl MockBranchRunnerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcomes of the branch starting at `start_at`.
    pub fn with_branch(
        self,
        start_at: impl Into<String>,
        script: impl IntoIterator<Item = MockOutcome>,
    ) -> Self {
        lock(&self.branches)
            .entry(start_at.into())
            .or_default()
            .script = script.into_iter().collect();
        self
    }

    /// Number of executions started for the branch.
    pub fn attempts(&self, start_at: &str) -> usize {
        lock(&self.branches)
            .get(start_at)
            .map_or(0, |branch| branch.started.len())
    }

    /// Number of executions that ran to completion (successfully or not).
    pub fn completions(&self, start_at: &str) -> usize {
        lock(&self.branches)
            .get(start_at)
            .map_or(0, |branch| branch.completed)
    }

    /// When each execution of the branch started.
    pub fn attempt_times(&self, start_at: &str) -> Vec<Instant> {
        lock(&self.branches)
            .get(start_at)
            .map(|branch| branch.started.iter().map(|(at, _)| *at).collect())
            .unwrap_or_default()
    }

    /// The input of each execution of the branch.
    pub fn inputs(&self, start_at: &str) -> Vec<ValueRef> {
        lock(&self.branches)
            .get(start_at)
            .map(|branch| branch.started.iter().map(|(_, input)| input.clone()).collect())
            .unwrap_or_default()
    }
}

impl From<HashMap<String, Vec<MockOutcome>>> for MockBranchRunnerFactory {
    fn from(scripts: HashMap<String, Vec<MockOutcome>>) -> Self {
        scripts
            .into_iter()
            .fold(Self::new(), |factory, (start_at, script)| {
                factory.with_branch(start_at, script)
            })
    }
}

impl BranchRunnerFactory for MockBranchRunnerFactory {
    fn create(
        &self,
        branch: &WorkflowDefinition,
        _execution_context: Arc<ExecutionContext>,
        _config: Arc<EngineConfig>,
    ) -> Box<dyn BranchRunner> {
        Box::new(MockBranchRunner {
            start_at: branch.start_at.clone(),
            branches: self.branches.clone(),
        })
    }
}

struct MockBranchRunner {
    start_at: String,
    branches: Branches,
}

#[async_trait::async_trait]
impl BranchRunner for MockBranchRunner {
    async fn execute(&self, input: ValueRef) -> Result<StateOutput, StateFailure> {
        let outcome = {
            let mut branches = lock(&self.branches);
            let branch = branches.entry(self.start_at.clone()).or_default();
            let outcome = branch.next_outcome();
            branch.started.push((Instant::now(), input.clone()));
            outcome
        };
        log::debug!("Mock branch '{}' executing {:?}", self.start_at, outcome.behavior);

        if outcome.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(outcome.delay_ms)).await;
        }

        if let Some(branch) = lock(&self.branches).get_mut(&self.start_at) {
            branch.completed += 1;
        }

        match outcome.behavior {
            MockBranchBehavior::Failure { failure } => Err(failure),
            MockBranchBehavior::Output { output } => Ok(StateOutput::ended(output)),
            MockBranchBehavior::Echo {} => Ok(StateOutput::ended(input)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(factory: &MockBranchRunnerFactory, start_at: &str) -> Box<dyn BranchRunner> {
        factory.create(
            &WorkflowDefinition::new(start_at),
            Arc::new(ExecutionContext::in_memory()),
            Arc::new(EngineConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let factory = MockBranchRunnerFactory::new().with_branch(
            "A",
            [
                MockOutcome::failure("TaskFailed", "first"),
                MockOutcome::output(json!(1)),
            ],
        );

        let runner = create(&factory, "A");
        assert_eq!(
            runner.execute(ValueRef::new(json!("in"))).await.unwrap_err(),
            StateFailure::new("TaskFailed", "first")
        );
        let runner = create(&factory, "A");
        assert_eq!(
            runner.execute(ValueRef::new(json!("in"))).await.unwrap().output,
            ValueRef::new(json!(1))
        );
        // The last outcome repeats.
        let runner = create(&factory, "A");
        assert_eq!(
            runner.execute(ValueRef::new(json!("in"))).await.unwrap().output,
            ValueRef::new(json!(1))
        );

        assert_eq!(factory.attempts("A"), 3);
        assert_eq!(factory.completions("A"), 3);
        assert_eq!(factory.inputs("A")[0], ValueRef::new(json!("in")));
    }

    #[tokio::test]
    async fn test_unscripted_branch_echoes() {
        let factory = MockBranchRunnerFactory::new();
        let runner = create(&factory, "B");
        let output = runner.execute(ValueRef::new(json!({"x": 1}))).await.unwrap();
        assert_eq!(output.output, ValueRef::new(json!({"x": 1})));
        assert_eq!(factory.attempts("B"), 1);
        assert_eq!(factory.attempts("C"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let factory = MockBranchRunnerFactory::new().with_branch(
            "A",
            [MockOutcome::output(json!(1)).after(Duration::from_secs(5))],
        );
        let started = Instant::now();
        create(&factory, "A")
            .execute(ValueRef::new(json!(null)))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert_eq!(factory.attempt_times("A"), vec![started]);
    }

    #[test]
    fn test_deserialize_scripts() {
        let yaml = r#"
A:
  - failure:
      name: TaskFailed
      message: boom
    delayMs: 10
  - output: {result: 42}
B:
  - {}
"#;
        let scripts: HashMap<String, Vec<MockOutcome>> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            scripts["A"],
            vec![
                MockOutcome::failure("TaskFailed", "boom").after(Duration::from_millis(10)),
                MockOutcome::output(json!({"result": 42})),
            ]
        );
        assert_eq!(scripts["B"], vec![MockOutcome::echo()]);

        let factory = MockBranchRunnerFactory::from(scripts);
        assert_eq!(factory.attempts("A"), 0);
    }
}
