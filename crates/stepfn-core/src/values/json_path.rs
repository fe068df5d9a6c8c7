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

use std::fmt;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{PathError, PathResult};

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// `.name` or `["name"]`
    Field(String),
    /// `[n]`
    Index(usize),
}

/// Why a path expression could not be parsed. Offsets are byte offsets into
/// the expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathSyntaxError {
    #[error("expected '.' or '[' at offset {offset}, found '{found}'")]
    UnexpectedCharacter { offset: usize, found: char },
    #[error("empty field name at offset {offset}")]
    EmptyField { offset: usize },
    #[error("'[' at offset {offset} is never closed")]
    UnclosedBracket { offset: usize },
    #[error("subscript '{0}' is neither an index nor a quoted field name")]
    InvalidSubscript(String),
}

/// A reference path such as `$.order.items[0]`.
///
/// Only the reference subset used by `InputPath`, `ResultPath` and
/// `OutputPath` is supported: dotted fields, quoted fields in brackets and
/// array indices. An expression without the leading `$` names a single
/// top-level field. `$` and the empty string are the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The `$` path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Parse a path expression.
    pub fn parse(expr: &str) -> PathResult<Self> {
        let trimmed = expr.trim();
        let Some(rest) = trimmed.strip_prefix('$') else {
            if trimmed.is_empty() {
                return Ok(Self::root());
            }
            return Ok(Self {
                segments: vec![Segment::Field(trimmed.to_owned())],
            });
        };

        let mut cursor = Cursor {
            expr: trimmed,
            rest,
        };
        let mut segments = Vec::new();
        while let Some(segment) = cursor.next_segment()? {
            segments.push(segment);
        }
        Ok(Self { segments })
    }
}

/// Walks the part of an expression after `$`, one segment at a time.
struct Cursor<'a> {
    expr: &'a str,
    rest: &'a str,
}

impl Cursor<'_> {
    fn offset(&self) -> usize {
        self.expr.len() - self.rest.len()
    }

    fn fail(&self, reason: PathSyntaxError) -> Report<PathError> {
        error_stack::report!(PathError::Syntax {
            path: self.expr.to_owned(),
            reason,
        })
    }

    fn next_segment(&mut self) -> PathResult<Option<Segment>> {
        let offset = self.offset();

        if let Some(after_dot) = self.rest.strip_prefix('.') {
            let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
            let (name, rest) = after_dot.split_at(end);
            if name.is_empty() {
                return Err(self.fail(PathSyntaxError::EmptyField { offset }));
            }
            self.rest = rest;
            return Ok(Some(Segment::Field(name.to_owned())));
        }

        if let Some(after_bracket) = self.rest.strip_prefix('[') {
            let Some((inner, rest)) = after_bracket.split_once(']') else {
                return Err(self.fail(PathSyntaxError::UnclosedBracket { offset }));
            };
            let segment = subscript(inner.trim()).ok_or_else(|| {
                self.fail(PathSyntaxError::InvalidSubscript(inner.trim().to_owned()))
            })?;
            self.rest = rest;
            return Ok(Some(segment));
        }

        match self.rest.chars().next() {
            None => Ok(None),
            Some(found) => Err(self.fail(PathSyntaxError::UnexpectedCharacter { offset, found })),
        }
    }
}

fn subscript(inner: &str) -> Option<Segment> {
    let quoted = ['"', '\''].into_iter().find_map(|quote| {
        inner
            .strip_prefix(quote)
            .and_then(|name| name.strip_suffix(quote))
    });
    match quoted {
        Some(name) => Some(Segment::Field(name.to_owned())),
        None => inner.parse().ok().map(Segment::Index),
    }
}

fn needs_brackets(name: &str) -> bool {
    name.is_empty() || name.contains(['.', '[', ']', '"']) || name.trim() != name
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) if needs_brackets(name) => write!(f, "['{name}']")?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = Report<PathError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let expr = String::deserialize(deserializer)?;
        Self::parse(&expr).map_err(|report| serde::de::Error::custom(report.current_context()))
    }
}
