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

pub mod values;
pub mod workflow;

mod state_failure;
mod state_output;

pub use state_failure::*;
pub use state_output::*;

// Re-export commonly used types
pub use values::{DataPath, JsonPath, PathError, ValueRef};
pub use workflow::{CatchSpec, NextState, ParallelState, RetrySpec, WorkflowDefinition};
