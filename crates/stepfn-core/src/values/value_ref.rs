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

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{JsonPath, Segment};

/// A JSON value shared by reference.
///
/// Every branch of a parallel state receives the same input, so the value is
/// kept behind an `Arc` and cloning a `ValueRef` never copies the document.
/// Selecting a sub-value produces a new, independently owned `ValueRef`.
#[derive(Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct ValueRef(Arc<serde_json::Value>);

impl std::fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for ValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Default for ValueRef {
    fn default() -> Self {
        Self(Arc::new(serde_json::Value::Null))
    }
}

impl Serialize for ValueRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValueRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::new)
    }
}

impl<T: Into<serde_json::Value>> From<T> for ValueRef {
    fn from(value: T) -> Self {
        Self::new(value.into())
    }
}

impl ValueRef {
    pub fn new(value: serde_json::Value) -> Self {
        Self(Arc::new(value))
    }

    /// An empty JSON object.
    pub fn empty_object() -> Self {
        Self::new(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Access an object field by name.
    pub fn path(&self, field: &str) -> Option<ValueRef> {
        self.0.get(field).cloned().map(ValueRef::new)
    }

    /// Access an array element by index.
    pub fn index(&self, index: usize) -> Option<ValueRef> {
        match self.0.as_ref() {
            serde_json::Value::Array(arr) => arr.get(index).cloned().map(ValueRef::new),
            _ => None,
        }
    }

    /// Access value using a JSON path.
    ///
    /// The empty path (`$`) returns this value without copying it.
    pub fn resolve_json_path(&self, json_path: &JsonPath) -> Option<ValueRef> {
        if json_path.is_root() {
            return Some(self.clone());
        }

        let mut current = self.0.as_ref();
        for part in json_path.segments() {
            current = match part {
                Segment::Field(field_name) => current.as_object()?.get(field_name)?,
                Segment::Index(index) => current.as_array()?.get(*index)?,
            };
        }

        Some(ValueRef::new(current.clone()))
    }

    pub fn value(&self) -> &serde_json::Value {
        self.0.as_ref()
    }

    /// Clone the underlying JSON value
    pub fn clone_value(&self) -> serde_json::Value {
        self.0.as_ref().clone()
    }

    /// Take the underlying JSON value, cloning only if it is shared.
    pub fn into_value(self) -> serde_json::Value {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    /// Deserialize the value into a specific type
    pub fn deserialize<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.as_ref().clone())
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Whether two refs point at the same allocation.
    pub fn ptr_eq(&self, other: &ValueRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl AsRef<serde_json::Value> for ValueRef {
    fn as_ref(&self) -> &serde_json::Value {
        self.0.as_ref()
    }
}
