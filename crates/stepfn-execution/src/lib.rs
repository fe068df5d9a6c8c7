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

//! Parallel state execution for stepfn.
//!
//! - [`ParallelExecutor`] - runs the branches of a `Parallel` state with
//!   retry, catch and path handling, recording lifecycle events
//! - [`BranchRunner`] / [`BranchRunnerFactory`] - the seam to the engine that
//!   runs branch workflows
//! - [`RetryPolicy`] - resolved retry parameters
//! - [`CatchFilter`] - which failures a catch clause handles

mod branch;
mod catch;
mod error;
mod join;
mod parallel;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use branch::{BranchRunner, BranchRunnerFactory};
pub use catch::{CatchAll, CatchFilter};
pub use error::{ExecutionError, Result};
pub use parallel::ParallelExecutor;
pub use retry::RetryPolicy;
