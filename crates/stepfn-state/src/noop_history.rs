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

//! No-op execution history for executions that don't need an audit trail.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ExecutionHistory, HistoryEvent, Result, SequenceNumber};

/// A history that discards all events.
///
/// Sequence numbers are still handed out so callers see the same contract
/// as with a recording history.
///
/// # Example
///
/// ```rust
/// use stepfn_state::{ExecutionHistory, HistoryEvent, HistoryEventType, NoOpHistory};
///
/// let history = NoOpHistory::new();
/// history
///     .append(HistoryEvent::new(HistoryEventType::ParallelStateEntered, None))
///     .unwrap();
/// assert!(history.events().unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct NoOpHistory {
    next_sequence: AtomicU64,
}

impl NoOpHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionHistory for NoOpHistory {
    fn append(&self, _event: HistoryEvent) -> Result<SequenceNumber> {
        let seq = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        Ok(SequenceNumber::new(seq))
    }

    fn read_from(
        &self,
        _from_sequence: SequenceNumber,
        _limit: usize,
    ) -> Result<Vec<(SequenceNumber, HistoryEvent)>> {
        Ok(Vec::new())
    }

    fn latest_sequence(&self) -> Result<Option<SequenceNumber>> {
        let next = self.next_sequence.load(Ordering::Relaxed);
        Ok(next.checked_sub(1).map(SequenceNumber::new))
    }
}
