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

//! Data-flow transformations applied around a state.
//!
//! ```text
//! raw input --InputPath--> state input --(run)--> result
//! state input + result --ResultPath--> merged --OutputPath--> state output
//! ```

use serde_json::{Map, Value};

use super::{DataPath, JsonPath, PathSyntaxError, Segment, ValueRef};

/// Errors that can occur while applying a data path.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path '{path}': {reason}")]
    Syntax {
        path: String,
        reason: PathSyntaxError,
    },
    #[error("path '{path}' does not match any value in the input")]
    NoMatch { path: String },
    #[error("cannot write result at '{path}': {reason}")]
    InvalidResultPath { path: String, reason: String },
}

pub type PathResult<T> = std::result::Result<T, error_stack::Report<PathError>>;

/// Select the state input.
///
/// `$` returns the value itself, `null` yields `{}`.
pub fn apply_input_path(value: &ValueRef, path: &DataPath) -> PathResult<ValueRef> {
    select(value, path)
}

/// Select the state output from the merged result.
///
/// Same selection rules as [`apply_input_path`].
pub fn apply_output_path(value: &ValueRef, path: &DataPath) -> PathResult<ValueRef> {
    select(value, path)
}

/// Merge a result into the state input.
///
/// - `$` replaces the whole input with the result.
/// - `null` discards the result and keeps the input.
/// - any other path writes the result into a copy of the input, creating
///   intermediate objects as needed.
pub fn apply_result_path(
    input: &ValueRef,
    path: &DataPath,
    result: ValueRef,
) -> PathResult<ValueRef> {
    let path = match path {
        DataPath::Discard => return Ok(input.clone()),
        DataPath::Path(path) if path.is_root() => return Ok(result),
        DataPath::Path(path) => path,
    };

    let mut merged = input.clone_value();
    write_at(&mut merged, path, result.into_value())?;
    Ok(ValueRef::new(merged))
}

fn select(value: &ValueRef, path: &DataPath) -> PathResult<ValueRef> {
    match path {
        DataPath::Discard => Ok(ValueRef::empty_object()),
        DataPath::Path(path) => value.resolve_json_path(path).ok_or_else(|| {
            error_stack::report!(PathError::NoMatch {
                path: path.to_string(),
            })
        }),
    }
}

fn write_at(target: &mut Value, path: &JsonPath, result: Value) -> PathResult<()> {
    let invalid = |reason: String| {
        error_stack::report!(PathError::InvalidResultPath {
            path: path.to_string(),
            reason,
        })
    };

    let Some((last, parents)) = path.segments().split_last() else {
        *target = result;
        return Ok(());
    };

    let mut current = target;
    for part in parents {
        current = match part {
            Segment::Field(name) => match current {
                Value::Object(obj) => obj
                    .entry(name.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                other => return Err(invalid(format!("'{name}' is not a field of {other}"))),
            },
            Segment::Index(index) => match current {
                Value::Array(arr) => {
                    let len = arr.len();
                    arr.get_mut(*index).ok_or_else(|| {
                        invalid(format!("index {index} out of bounds for array of {len}"))
                    })?
                }
                other => return Err(invalid(format!("cannot index into {other}"))),
            },
        };
    }

    match (last, current) {
        (Segment::Field(name), Value::Object(obj)) => {
            obj.insert(name.clone(), result);
        }
        (Segment::Index(index), Value::Array(arr)) => {
            let len = arr.len();
            let slot = arr.get_mut(*index).ok_or_else(|| {
                invalid(format!("index {index} out of bounds for array of {len}"))
            })?;
            *slot = result;
        }
        (Segment::Field(name), other) => {
            return Err(invalid(format!("cannot set field '{name}' on {other}")));
        }
        (Segment::Index(index), other) => {
            return Err(invalid(format!("cannot set index {index} on {other}")));
        }
    }

    Ok(())
}
