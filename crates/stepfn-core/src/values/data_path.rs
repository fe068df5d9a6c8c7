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

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::{JsonPath, PathResult};

/// The value of an `InputPath`, `ResultPath` or `OutputPath` field.
///
/// A missing field means `$` (the whole document). An explicit `null` is
/// distinct from `$`: it discards the document (input/output paths) or the
/// result (result paths).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataPath {
    Path(JsonPath),
    Discard,
}

impl DataPath {
    /// The `$` path.
    pub fn root() -> Self {
        Self::Path(JsonPath::root())
    }

    pub fn parse(expr: &str) -> PathResult<Self> {
        JsonPath::parse(expr).map(Self::Path)
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Path(path) if path.is_root())
    }
}

impl Default for DataPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => path.fmt(f),
            Self::Discard => f.write_str("null"),
        }
    }
}

impl From<JsonPath> for DataPath {
    fn from(path: JsonPath) -> Self {
        Self::Path(path)
    }
}

impl Serialize for DataPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Path(path) => path.serialize(serializer),
            Self::Discard => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for DataPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DataPathVisitor;

        impl<'de> Visitor<'de> for DataPathVisitor {
            type Value = DataPath;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a JSON path string or null")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                DataPath::parse(value)
                    .map_err(|report| de::Error::custom(report.current_context()))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DataPath::Discard)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(DataPath::Discard)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_str(self)
            }
        }

        deserializer.deserialize_option(DataPathVisitor)
    }
}
