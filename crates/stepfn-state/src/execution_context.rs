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

use uuid::Uuid;

use crate::{
    EventDetail, ExecutionHistory, HistoryEvent, HistoryEventType, InMemoryHistory, Result,
    SequenceNumber,
};

/// Shared state of one workflow execution.
///
/// Cloned (as `Arc<ExecutionContext>`) into every branch of every parallel
/// state in the execution. The only mutation it allows is appending to the
/// history.
pub struct ExecutionContext {
    execution_id: Uuid,
    history: Arc<dyn ExecutionHistory>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    pub fn new(execution_id: Uuid, history: Arc<dyn ExecutionHistory>) -> Self {
        Self {
            execution_id,
            history,
        }
    }

    /// A context with a fresh execution id and an in-memory history.
    pub fn in_memory() -> Self {
        Self::new(Uuid::new_v4(), Arc::new(InMemoryHistory::new()))
    }

    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    pub fn history(&self) -> &Arc<dyn ExecutionHistory> {
        &self.history
    }

    /// Timestamp and append an event to the history.
    pub fn record(
        &self,
        event_type: HistoryEventType,
        detail: Option<EventDetail>,
    ) -> Result<SequenceNumber> {
        let event = HistoryEvent::new(event_type, detail);
        let seq = self.history.append(event)?;
        log::debug!(
            "Recorded {event_type} for execution {} at {}",
            self.execution_id,
            seq.value()
        );
        Ok(seq)
    }

    /// The types of all recorded events, in order.
    pub fn event_types(&self) -> Result<Vec<HistoryEventType>> {
        Ok(self
            .history
            .events()?
            .into_iter()
            .map(|event| event.event_type)
            .collect())
    }
}
