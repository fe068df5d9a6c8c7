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

mod error;
mod execution_context;
mod execution_history;
mod in_memory;
mod noop_history;

pub use error::{Result, StateError};
pub use execution_context::ExecutionContext;
pub use execution_history::{
    EventDetail, ExecutionHistory, HistoryEvent, HistoryEventType, SequenceNumber,
};
pub use in_memory::InMemoryHistory;
pub use noop_history::NoOpHistory;
