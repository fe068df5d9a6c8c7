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

//! Test helpers for unit tests of this crate.
//!
//! Integration tests use `stepfn-mock` instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stepfn_config::EngineConfig;
use stepfn_core::{ParallelState, StateFailure, StateOutput, ValueRef, WorkflowDefinition};
use stepfn_state::ExecutionContext;

use crate::{BranchRunner, BranchRunnerFactory};

/// A parallel state over `count` branches named `Branch0`, `Branch1`, ...
pub(crate) fn parallel_state(count: usize) -> ParallelState {
    ParallelState::new(
        (0..count)
            .map(|index| WorkflowDefinition::new(format!("Branch{index}")))
            .collect(),
    )
}

enum Outcome {
    Succeed(serde_json::Value),
    Fail(StateFailure),
    Panic,
}

/// A branch runner with a fixed outcome.
pub(crate) struct TestRunner {
    outcome: Arc<Outcome>,
    delay: Duration,
}

impl TestRunner {
    pub fn succeed_after(output: serde_json::Value, delay: Duration) -> Self {
        Self {
            outcome: Arc::new(Outcome::Succeed(output)),
            delay,
        }
    }

    pub fn fail_after(failure: StateFailure, delay: Duration) -> Self {
        Self {
            outcome: Arc::new(Outcome::Fail(failure)),
            delay,
        }
    }

    pub fn panicking() -> Self {
        Self {
            outcome: Arc::new(Outcome::Panic),
            delay: Duration::ZERO,
        }
    }
}

#[async_trait::async_trait]
impl BranchRunner for TestRunner {
    async fn execute(&self, _input: ValueRef) -> Result<StateOutput, StateFailure> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.outcome.as_ref() {
            Outcome::Succeed(output) => Ok(StateOutput::ended(output.clone())),
            Outcome::Fail(failure) => Err(failure.clone()),
            Outcome::Panic => panic!("branch exploded"),
        }
    }
}

/// Echoes the branch input, optionally failing the first `failures` attempts
/// of every branch.
#[derive(Default)]
pub(crate) struct EchoFactory {
    failures: usize,
    created: AtomicUsize,
}

impl EchoFactory {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            created: AtomicUsize::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

struct EchoRunner {
    fail: bool,
}

#[async_trait::async_trait]
impl BranchRunner for EchoRunner {
    async fn execute(&self, input: ValueRef) -> Result<StateOutput, StateFailure> {
        if self.fail {
            Err(StateFailure::new("TaskFailed", "echo failed"))
        } else {
            Ok(StateOutput::ended(input))
        }
    }
}

impl BranchRunnerFactory for EchoFactory {
    fn create(
        &self,
        _branch: &WorkflowDefinition,
        _execution_context: Arc<ExecutionContext>,
        _config: Arc<EngineConfig>,
    ) -> Box<dyn BranchRunner> {
        let created = self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(EchoRunner {
            fail: created < self.failures,
        })
    }
}
