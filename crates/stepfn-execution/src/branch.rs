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

//! Seams between the parallel executor and the engine that runs branch workflows.

use std::sync::Arc;

use stepfn_config::EngineConfig;
use stepfn_core::{StateFailure, StateOutput, ValueRef, WorkflowDefinition};
use stepfn_state::ExecutionContext;

/// Runs one branch workflow to completion.
///
/// Branch runners typically record their own history events through the
/// execution context they were created with. Those events may interleave
/// with the events of sibling branches.
#[async_trait::async_trait]
pub trait BranchRunner: Send + Sync {
    async fn execute(&self, input: ValueRef) -> Result<StateOutput, StateFailure>;
}

/// Creates a fresh [`BranchRunner`] for every branch of every attempt.
///
/// Injected into the parallel executor so that the executor does not depend
/// on the engine that interprets branch workflows (which may itself contain
/// parallel states).
pub trait BranchRunnerFactory: Send + Sync {
    fn create(
        &self,
        branch: &WorkflowDefinition,
        execution_context: Arc<ExecutionContext>,
        config: Arc<EngineConfig>,
    ) -> Box<dyn BranchRunner>;
}
