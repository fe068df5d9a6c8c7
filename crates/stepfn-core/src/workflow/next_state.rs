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

use serde::{Serialize, Serializer};

/// Where the outer driver continues after a state completes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NextState {
    /// Continue at the named state.
    State(String),
    /// The workflow ends here.
    End,
}

impl NextState {
    pub fn state(name: impl Into<String>) -> Self {
        Self::State(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::State(name) => Some(name),
            Self::End => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl std::fmt::Display for NextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(name) => f.write_str(name),
            Self::End => f.write_str("<end>"),
        }
    }
}

// A state name serializes as the name, the end of the workflow as `true`.
impl Serialize for NextState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::State(name) => serializer.serialize_str(name),
            Self::End => serializer.serialize_bool(true),
        }
    }
}
