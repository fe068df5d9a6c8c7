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

use stepfn_core::StateFailure;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExecutionError {
    /// A branch failed and no catch clause recovered it.
    #[error("branch failed: {0}")]
    BranchFailed(StateFailure),
    #[error("failed to apply InputPath '{path}'")]
    InputPath { path: String },
    #[error("failed to apply Catch ResultPath '{path}'")]
    CatchResultPath { path: String },
    #[error("error recording history event")]
    History,
}

impl ExecutionError {
    /// The branch failure carried by this error, if any.
    pub fn failure(&self) -> Option<&StateFailure> {
        match self {
            Self::BranchFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T, E = error_stack::Report<ExecutionError>> = std::result::Result<T, E>;
