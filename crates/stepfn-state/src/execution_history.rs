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

//! ExecutionHistory trait for the audit log of a workflow execution.
//!
//! Every lifecycle transition of a state is appended to the history of the
//! execution it belongs to. Branches of a parallel state share the history of
//! their parent execution, so appends arrive concurrently from several tasks
//! and implementations must serialize them.
//!
//! Entries are immutable once appended. Readers (e.g. reporting) may read
//! while appends are in flight and observe new entries eventually.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Position of an event in the history of one execution.
///
/// Sequence numbers start at 0 and increase by one per appended event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SequenceNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Lifecycle event types recorded by a parallel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEventType {
    ParallelStateEntered,
    ParallelStateStarted,
    ParallelStateSucceeded,
    ParallelStateExited,
    ParallelStateFailed,
}

impl HistoryEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParallelStateEntered => "PARALLEL_STATE_ENTERED",
            Self::ParallelStateStarted => "PARALLEL_STATE_STARTED",
            Self::ParallelStateSucceeded => "PARALLEL_STATE_SUCCEEDED",
            Self::ParallelStateExited => "PARALLEL_STATE_EXITED",
            Self::ParallelStateFailed => "PARALLEL_STATE_FAILED",
        }
    }
}

impl std::fmt::Display for HistoryEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details attached to a failure event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    /// The error kind.
    pub cause: String,
    /// The error message.
    pub error: String,
}

impl EventDetail {
    pub fn new(cause: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
            error: error.into(),
        }
    }
}

/// A timestamped history event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEvent {
    #[serde(rename = "Type")]
    pub event_type: HistoryEventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EventDetail>,
}

impl HistoryEvent {
    /// Create a new event with the current timestamp.
    pub fn new(event_type: HistoryEventType, detail: Option<EventDetail>) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            detail,
        }
    }
}

/// Append-only event log for one workflow execution.
pub trait ExecutionHistory: Send + Sync {
    /// Append an event and return the sequence number assigned to it.
    fn append(&self, event: HistoryEvent) -> Result<SequenceNumber>;

    /// Read up to `limit` events starting at `from_sequence` (inclusive).
    fn read_from(
        &self,
        from_sequence: SequenceNumber,
        limit: usize,
    ) -> Result<Vec<(SequenceNumber, HistoryEvent)>>;

    /// The sequence number of the last appended event, if any.
    fn latest_sequence(&self) -> Result<Option<SequenceNumber>>;

    /// All events currently in the history, in append order.
    fn events(&self) -> Result<Vec<HistoryEvent>> {
        let entries = self.read_from(SequenceNumber::new(0), usize::MAX)?;
        Ok(entries.into_iter().map(|(_, event)| event).collect())
    }

    /// Number of events retained by the history.
    fn len(&self) -> Result<usize> {
        Ok(self.events()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
