//! Body path expressions.
//!
//! A path addresses a value inside a JSON body:
//!
//! | expression        | meaning                               |
//! |-------------------|---------------------------------------|
//! | `$` or empty      | the whole body                        |
//! | `[0]`             | first element of a top-level array    |
//! | `name`            | field of a top-level object           |
//! | `nested.field`    | nested field                          |
//! | `[0].id`          | field of the first array element      |
//! | `$.items[2].name` | leading `$.` is optional              |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One step of a [`BodyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object field by name.
    Field(String),
    /// Array element by zero-based index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Why a path did not resolve against a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// The prefix of the path that did resolve.
    pub resolved_prefix: String,
    /// What went wrong at the next segment.
    pub reason: String,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (after '{}')", self.reason, self.resolved_prefix)
    }
}

/// A parsed path into a structured body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BodyPath {
    segments: Vec<PathSegment>,
}

impl BodyPath {
    /// The path addressing the whole body.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidPath`] for empty segments, unclosed or
    /// non-numeric brackets, stray characters after `]`, and a `$` not
    /// followed by `.` or `[`.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let invalid = |reason: &str| DomainError::InvalidPath {
            path: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let rest = match trimmed.strip_prefix('$') {
            Some(after) => match after.strip_prefix('.') {
                Some("") => return Err(invalid("trailing '.'")),
                Some(fields) => fields,
                None if after.is_empty() || after.starts_with('[') => after,
                None => return Err(invalid("'$' must be followed by '.' or '['")),
            },
            None => trimmed,
        };

        let mut segments = Vec::new();
        let mut chars = rest.chars().peekable();
        let mut field = String::new();
        // True right after a '.', where a field name must follow.
        let mut expect_field = false;

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if field.is_empty() && (segments.is_empty() || expect_field) {
                        return Err(invalid("empty field name"));
                    }
                    if !field.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut field)));
                    }
                    expect_field = true;
                }
                '[' => {
                    if !field.is_empty() {
                        segments.push(PathSegment::Field(std::mem::take(&mut field)));
                    } else if expect_field {
                        return Err(invalid("empty field name"));
                    }
                    let mut digits = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(c);
                    }
                    if !closed {
                        return Err(invalid("unclosed '['"));
                    }
                    let index = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("index '{digits}' is not a number")))?;
                    segments.push(PathSegment::Index(index));
                    expect_field = false;
                    if let Some(&next) = chars.peek()
                        && next != '.'
                        && next != '['
                    {
                        return Err(invalid("expected '.' or '[' after ']'"));
                    }
                }
                ']' => return Err(invalid("unexpected ']'")),
                _ => {
                    field.push(ch);
                    expect_field = false;
                }
            }
        }

        if expect_field {
            return Err(invalid("trailing '.'"));
        }
        if !field.is_empty() {
            segments.push(PathSegment::Field(field));
        }

        Ok(Self { segments })
    }

    /// The parsed segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true if this path addresses the whole body.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Walks `value` along this path.
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] naming the failing segment when a field is
    /// absent, an index is out of bounds, or a segment meets the wrong type.
    pub fn resolve<'a>(&self, value: &'a Value) -> Result<&'a Value, Unresolved> {
        let mut current = value;
        for (depth, segment) in self.segments.iter().enumerate() {
            let unresolved = |reason: String| Unresolved {
                resolved_prefix: render(&self.segments[..depth]),
                reason,
            };
            current = match (segment, current) {
                (PathSegment::Field(name), Value::Object(map)) => map
                    .get(name)
                    .ok_or_else(|| unresolved(format!("field '{name}' not found")))?,
                (PathSegment::Index(index), Value::Array(items)) => {
                    items.get(*index).ok_or_else(|| {
                        unresolved(format!(
                            "index {index} out of bounds (length {})",
                            items.len()
                        ))
                    })?
                }
                (PathSegment::Field(name), other) => {
                    return Err(unresolved(format!(
                        "cannot read field '{name}' from {}",
                        kind_of(other)
                    )));
                }
                (PathSegment::Index(index), other) => {
                    return Err(unresolved(format!(
                        "cannot index [{index}] into {}",
                        kind_of(other)
                    )));
                }
            };
        }
        Ok(current)
    }
}

/// Renders segments back into canonical path syntax (`$` for the root).
fn render(segments: &[PathSegment]) -> String {
    if segments.is_empty() {
        return "$".to_string();
    }
    let mut out = String::new();
    for segment in segments {
        if matches!(segment, PathSegment::Field(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Returns a JSON type name for diagnostics.
#[must_use]
pub const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for BodyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments))
    }
}

impl FromStr for BodyPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BodyPath {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<BodyPath> for String {
    fn from(path: BodyPath) -> Self {
        path.to_string()
    }
}
