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

//! Diagnostic context for parallel state executions
//!
//! Thread-local storage for the execution id and the branch being run. The
//! values are injected into every log record by [`BranchDiagnostic`].
//!
//! - `execution_id`: set for the duration of a parallel state execution
//! - `branch`: set while a branch runner is being constructed or polled

use std::cell::RefCell;

thread_local! {
    static EXECUTION_ID: RefCell<Option<String>> = const { RefCell::new(None) };
    static BRANCH: RefCell<Option<usize>> = const { RefCell::new(None) };
}

/// RAII guard that sets the execution id on creation and clears it on drop
pub struct ExecutionIdGuard {
    _private: (),
}

impl ExecutionIdGuard {
    pub fn new(execution_id: impl Into<String>) -> Self {
        EXECUTION_ID.with(|e| {
            *e.borrow_mut() = Some(execution_id.into());
        });
        Self { _private: () }
    }
}

impl Drop for ExecutionIdGuard {
    fn drop(&mut self) {
        EXECUTION_ID.with(|e| {
            *e.borrow_mut() = None;
        });
    }
}

/// RAII guard that sets the branch index on creation and clears it on drop
pub struct BranchGuard {
    _private: (),
}

impl BranchGuard {
    pub fn new(branch: usize) -> Self {
        BRANCH.with(|b| {
            *b.borrow_mut() = Some(branch);
        });
        Self { _private: () }
    }
}

impl Drop for BranchGuard {
    fn drop(&mut self) {
        BRANCH.with(|b| {
            *b.borrow_mut() = None;
        });
    }
}

pub fn get_execution_id() -> Option<String> {
    EXECUTION_ID.with(|e| e.borrow().clone())
}

pub fn get_branch() -> Option<usize> {
    BRANCH.with(|b| *b.borrow())
}

/// Diagnostic that injects `execution_id` and `branch` into logs
#[derive(Debug, Default)]
pub struct BranchDiagnostic;

impl logforth::diagnostic::Diagnostic for BranchDiagnostic {
    fn visit(&self, visitor: &mut dyn logforth::kv::Visitor) -> Result<(), logforth::Error> {
        use logforth::kv::{Key, Value};

        if let Some(execution_id) = get_execution_id() {
            visitor.visit(Key::new("execution_id"), Value::from_str(&execution_id))?;
        }

        if let Some(branch) = get_branch() {
            visitor.visit(Key::new("branch"), Value::from_display(&branch))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_guards() {
        assert!(get_execution_id().is_none());
        assert!(get_branch().is_none());

        {
            let _execution_guard = ExecutionIdGuard::new("exec-1");
            assert_eq!(get_execution_id().as_deref(), Some("exec-1"));
            assert!(get_branch().is_none());

            {
                let _branch_guard = BranchGuard::new(2);
                assert_eq!(get_execution_id().as_deref(), Some("exec-1"));
                assert_eq!(get_branch(), Some(2));
            }

            assert_eq!(get_execution_id().as_deref(), Some("exec-1"));
            assert!(get_branch().is_none());
        }

        assert!(get_execution_id().is_none());
    }
}
