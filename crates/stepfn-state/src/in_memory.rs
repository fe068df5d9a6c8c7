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

use std::sync::RwLock;

use crate::{ExecutionHistory, HistoryEvent, Result, SequenceNumber, StateError};

/// In-memory execution history.
///
/// Appends take the write lock, so concurrent appends from several branches
/// are serialized and every event gets a distinct sequence number.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    events: RwLock<Vec<HistoryEvent>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionHistory for InMemoryHistory {
    fn append(&self, event: HistoryEvent) -> Result<SequenceNumber> {
        let mut events = self
            .events
            .write()
            .map_err(|_| error_stack::report!(StateError::Poisoned))?;
        let sequence = SequenceNumber::new(events.len() as u64);
        log::trace!("history[{}] <- {}", sequence.value(), event.event_type);
        events.push(event);
        Ok(sequence)
    }

    fn read_from(
        &self,
        from_sequence: SequenceNumber,
        limit: usize,
    ) -> Result<Vec<(SequenceNumber, HistoryEvent)>> {
        let events = self
            .events
            .read()
            .map_err(|_| error_stack::report!(StateError::Poisoned))?;
        let start = usize::try_from(from_sequence.value()).unwrap_or(usize::MAX);
        Ok(events
            .iter()
            .enumerate()
            .skip(start)
            .take(limit)
            .map(|(index, event)| (SequenceNumber::new(index as u64), event.clone()))
            .collect())
    }

    fn latest_sequence(&self) -> Result<Option<SequenceNumber>> {
        let events = self
            .events
            .read()
            .map_err(|_| error_stack::report!(StateError::Poisoned))?;
        Ok(events
            .len()
            .checked_sub(1)
            .map(|last| SequenceNumber::new(last as u64)))
    }

    fn len(&self) -> Result<usize> {
        let events = self
            .events
            .read()
            .map_err(|_| error_stack::report!(StateError::Poisoned))?;
        Ok(events.len())
    }
}
