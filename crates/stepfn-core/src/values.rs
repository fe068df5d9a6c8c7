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

//! Value handling for state inputs and outputs.
//!
//! - `ValueRef`: Arc-wrapped JSON values shared between branches
//! - `JsonPath`: parsed path expressions (`$.field[0]`)
//! - `DataPath`: an `InputPath`/`ResultPath`/`OutputPath` field, which may be `null`
//! - `apply_*_path`: the data-flow transformations applied around a state

pub mod data_path;
pub mod json_path;
pub mod transform;
pub mod value_ref;

pub use data_path::*;
pub use json_path::*;
pub use transform::*;
pub use value_ref::*;
