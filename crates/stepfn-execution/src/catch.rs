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

use error_stack::ResultExt as _;
use stepfn_core::values::apply_result_path;
use stepfn_core::{CatchSpec, StateFailure, ValueRef};

use crate::{ExecutionError, Result};

/// Decides whether a catch clause applies to a failure.
pub trait CatchFilter: Send + Sync {
    fn accepts(&self, catch: &CatchSpec, failure: &StateFailure) -> bool;
}

/// Accepts every failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatchAll;

impl CatchFilter for CatchAll {
    fn accepts(&self, _catch: &CatchSpec, _failure: &StateFailure) -> bool {
        true
    }
}

/// Output and transition of a state recovered by its catch clause.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CatchRecovery {
    pub output: ValueRef,
    pub next: String,
}

/// Resolve the catch clause for a failure.
///
/// Returns `Ok(None)` when there is no clause or the filter rejects the
/// failure. The failure document `{"name", "message"}` is merged into
/// `input` at the clause's `ResultPath`.
pub(crate) fn recover(
    catch: Option<&CatchSpec>,
    filter: &dyn CatchFilter,
    input: &ValueRef,
    failure: &StateFailure,
) -> Result<Option<CatchRecovery>> {
    let Some(catch) = catch else {
        return Ok(None);
    };
    if !filter.accepts(catch, failure) {
        log::debug!("Catch clause does not accept failure '{}'", failure.name);
        return Ok(None);
    }

    let output = apply_result_path(input, &catch.result_path, failure.to_value())
        .change_context_lazy(|| ExecutionError::CatchResultPath {
            path: catch.result_path.to_string(),
        })?;

    Ok(Some(CatchRecovery {
        output,
        next: catch.next.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stepfn_core::DataPath;

    struct NameFilter(&'static str);

    impl CatchFilter for NameFilter {
        fn accepts(&self, _catch: &CatchSpec, failure: &StateFailure) -> bool {
            failure.name == self.0
        }
    }

    fn catch(result_path: &str) -> CatchSpec {
        CatchSpec {
            result_path: DataPath::parse(result_path).unwrap(),
            next: "Recover".to_string(),
        }
    }

    #[test]
    fn test_no_catch_clause() {
        let input = ValueRef::new(json!({"a": 1}));
        let failure = StateFailure::new("TaskFailed", "boom");
        assert_eq!(recover(None, &CatchAll, &input, &failure).unwrap(), None);
    }

    #[test]
    fn test_catch_merges_error() {
        let input = ValueRef::new(json!({"a": 1}));
        let failure = StateFailure::new("TaskFailed", "boom");
        let recovery = recover(Some(&catch("$.error")), &CatchAll, &input, &failure)
            .unwrap()
            .unwrap();
        assert_eq!(
            recovery.output.value(),
            &json!({"a": 1, "error": {"name": "TaskFailed", "message": "boom"}})
        );
        assert_eq!(recovery.next, "Recover");
    }

    #[test]
    fn test_catch_discard_keeps_input() {
        let input = ValueRef::new(json!({"a": 1}));
        let failure = StateFailure::new("TaskFailed", "boom");
        let spec = CatchSpec {
            result_path: DataPath::Discard,
            next: "Recover".to_string(),
        };
        let recovery = recover(Some(&spec), &CatchAll, &input, &failure)
            .unwrap()
            .unwrap();
        assert_eq!(recovery.output.value(), &json!({"a": 1}));
    }

    #[test]
    fn test_filter_rejects() {
        let input = ValueRef::new(json!({}));
        let failure = StateFailure::new("TaskFailed", "boom");
        let filter = NameFilter("States.Timeout");
        assert_eq!(
            recover(Some(&catch("$")), &filter, &input, &failure).unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_result_path() {
        let input = ValueRef::new(json!({"a": 1}));
        let failure = StateFailure::new("TaskFailed", "boom");
        let error = recover(Some(&catch("$.a.b")), &CatchAll, &input, &failure).unwrap_err();
        assert_eq!(
            error.current_context(),
            &ExecutionError::CatchResultPath {
                path: "$.a.b".to_string()
            }
        );
    }
}
