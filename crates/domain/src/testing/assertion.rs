//! Assertions and their results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::BodyPath;
use crate::error::DomainResult;

/// What must hold for the value at an assertion's path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Structural equality; numbers compare numerically.
    Equals {
        /// Expected value (as JSON).
        expected: Value,
    },
    /// Case-sensitive substring of a string value.
    ContainsSubstring {
        /// Text to search for.
        needle: String,
    },
    /// Value is present and not JSON null.
    NotNull,
    /// Array (or object) with at least `min` entries.
    HasSizeAtLeast {
        /// Minimum number of entries.
        min: usize,
    },
}

impl Predicate {
    /// Get a human-readable description of this predicate.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Equals { expected } => format!("equals {expected}"),
            Self::ContainsSubstring { needle } => format!("contains '{needle}'"),
            Self::NotNull => "is not null".to_string(),
            Self::HasSizeAtLeast { min } => format!("has size >= {min}"),
        }
    }
}

/// A single expected-value check against a path in a response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assertion {
    /// Where to look in the body.
    pub path: BodyPath,
    /// What must hold there.
    pub predicate: Predicate,
    /// Message shown when the check fails.
    pub message: String,
}

impl Assertion {
    /// Creates an assertion with a generated message.
    #[must_use]
    pub fn new(path: BodyPath, predicate: Predicate) -> Self {
        let message = format!("{path} {}", predicate.description());
        Self {
            path,
            predicate,
            message,
        }
    }

    /// `path` equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid path expression.
    pub fn equals(path: &str, expected: impl Into<Value>) -> DomainResult<Self> {
        Ok(Self::new(
            BodyPath::parse(path)?,
            Predicate::Equals {
                expected: expected.into(),
            },
        ))
    }

    /// `path` is a string containing `needle`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid path expression.
    pub fn contains(path: &str, needle: impl Into<String>) -> DomainResult<Self> {
        Ok(Self::new(
            BodyPath::parse(path)?,
            Predicate::ContainsSubstring {
                needle: needle.into(),
            },
        ))
    }

    /// `path` is present and not null.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid path expression.
    pub fn not_null(path: &str) -> DomainResult<Self> {
        Ok(Self::new(BodyPath::parse(path)?, Predicate::NotNull))
    }

    /// `path` is a sequence with at least `min` entries.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid path expression.
    pub fn has_size_at_least(path: &str, min: usize) -> DomainResult<Self> {
        Ok(Self::new(
            BodyPath::parse(path)?,
            Predicate::HasSizeAtLeast { min },
        ))
    }

    /// Replaces the failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get a human-readable description of this assertion.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} {}", self.path, self.predicate.description())
    }
}

/// Expected status code value or range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Range of status codes (e.g., 200-299).
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }

    /// Create an expectation accepting any of `codes`.
    #[must_use]
    pub fn one_of(codes: &[u16]) -> Self {
        Self::OneOf(codes.to_vec())
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// Result of checking a step's response status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCheck {
    /// What the step expected.
    pub expected: StatusExpectation,
    /// What the server returned.
    pub actual: u16,
    /// Whether `actual` satisfied `expected`.
    pub passed: bool,
}

impl StatusCheck {
    /// Checks `actual` against `expected`.
    #[must_use]
    pub fn evaluate(expected: &StatusExpectation, actual: u16) -> Self {
        Self {
            expected: expected.clone(),
            actual,
            passed: expected.matches(actual),
        }
    }

    /// Failure message, if the check failed.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        (!self.passed).then(|| {
            format!(
                "Expected status {}, got {}",
                self.expected.description(),
                self.actual
            )
        })
    }
}

/// Outcome of a single assertion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssertionStatus {
    /// The predicate held.
    Passed,
    /// The predicate did not hold, or the path did not resolve.
    Failed,
    /// Not evaluated; see the result's message for why.
    Skipped,
}

/// Result of running a single assertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssertionResult {
    /// The assertion that was run.
    pub assertion: Assertion,
    /// Pass, fail or skip.
    pub status: AssertionStatus,
    /// Actual value found (for display).
    pub actual: Option<String>,
    /// Error message if failed, reason if skipped.
    pub error: Option<String>,
}

impl AssertionResult {
    /// Create a passed result with actual value.
    #[must_use]
    pub fn pass_with_value(assertion: Assertion, actual: impl Into<String>) -> Self {
        Self {
            assertion,
            status: AssertionStatus::Passed,
            actual: Some(actual.into()),
            error: None,
        }
    }

    /// Create a failed result.
    #[must_use]
    pub fn fail(assertion: Assertion, error: impl Into<String>) -> Self {
        Self {
            assertion,
            status: AssertionStatus::Failed,
            actual: None,
            error: Some(error.into()),
        }
    }

    /// Create a failed result with actual value.
    #[must_use]
    pub fn fail_with_value(
        assertion: Assertion,
        actual: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            assertion,
            status: AssertionStatus::Failed,
            actual: Some(actual.into()),
            error: Some(error.into()),
        }
    }

    /// Create a skipped result.
    #[must_use]
    pub fn skipped(assertion: Assertion, reason: impl Into<String>) -> Self {
        Self {
            assertion,
            status: AssertionStatus::Skipped,
            actual: None,
            error: Some(reason.into()),
        }
    }

    /// Whether the assertion passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == AssertionStatus::Passed
    }

    /// Whether the assertion failed.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.status == AssertionStatus::Failed
    }
}
