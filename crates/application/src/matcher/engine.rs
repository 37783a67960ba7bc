//! Body matcher implementation.
//!
//! Evaluates path-addressed assertions against a captured response. Every
//! assertion yields a result; nothing here aborts an evaluation.

use serde_json::{Number, Value};
use vouch_domain::response::ResponseSpec;
use vouch_domain::testing::{Assertion, AssertionResult, Predicate, kind_of};

/// Longest rendering of an actual value kept in a result.
const PREVIEW_LIMIT: usize = 100;

/// Evaluates body assertions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyMatcher;

impl BodyMatcher {
    /// Create a new matcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates every assertion in order; one result per assertion.
    #[must_use]
    pub fn evaluate(
        &self,
        response: &ResponseSpec,
        assertions: &[Assertion],
    ) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| self.run_assertion(assertion, response))
            .collect()
    }

    /// Records every assertion as skipped with `reason`.
    #[must_use]
    pub fn skip_all(&self, assertions: &[Assertion], reason: &str) -> Vec<AssertionResult> {
        assertions
            .iter()
            .map(|assertion| AssertionResult::skipped(assertion.clone(), reason))
            .collect()
    }

    /// Run a single assertion against a response.
    #[must_use]
    pub fn run_assertion(&self, assertion: &Assertion, response: &ResponseSpec) -> AssertionResult {
        let path = &assertion.path;

        let body = match response.json() {
            Ok(body) => body,
            Err(e) => {
                return AssertionResult::fail_with_value(
                    assertion.clone(),
                    response.body_preview(PREVIEW_LIMIT),
                    format!("{}: path '{path}' not resolved, {e}", assertion.message),
                );
            }
        };

        let actual = match path.resolve(body) {
            Ok(actual) => actual,
            Err(unresolved) => {
                return AssertionResult::fail(
                    assertion.clone(),
                    format!("{}: path '{path}' not resolved, {unresolved}", assertion.message),
                );
            }
        };

        match &assertion.predicate {
            Predicate::Equals { expected } => check_equals(assertion, actual, expected),
            Predicate::ContainsSubstring { needle } => check_contains(assertion, actual, needle),
            Predicate::NotNull => check_not_null(assertion, actual),
            Predicate::HasSizeAtLeast { min } => check_size(assertion, actual, *min),
        }
    }
}

fn check_equals(assertion: &Assertion, actual: &Value, expected: &Value) -> AssertionResult {
    if values_equal(actual, expected) {
        AssertionResult::pass_with_value(assertion.clone(), preview(actual))
    } else {
        AssertionResult::fail_with_value(
            assertion.clone(),
            preview(actual),
            format!(
                "{}: expected {expected}, got {}",
                assertion.message,
                preview(actual)
            ),
        )
    }
}

fn check_contains(assertion: &Assertion, actual: &Value, needle: &str) -> AssertionResult {
    let Value::String(text) = actual else {
        return AssertionResult::fail_with_value(
            assertion.clone(),
            preview(actual),
            format!(
                "{}: expected a string at '{}', found {}",
                assertion.message,
                assertion.path,
                kind_of(actual)
            ),
        );
    };

    if text.contains(needle) {
        AssertionResult::pass_with_value(assertion.clone(), preview(actual))
    } else {
        AssertionResult::fail_with_value(
            assertion.clone(),
            preview(actual),
            format!("{}: '{text}' does not contain '{needle}'", assertion.message),
        )
    }
}

fn check_not_null(assertion: &Assertion, actual: &Value) -> AssertionResult {
    if actual.is_null() {
        AssertionResult::fail_with_value(
            assertion.clone(),
            "null",
            format!("{}: '{}' is null", assertion.message, assertion.path),
        )
    } else {
        AssertionResult::pass_with_value(assertion.clone(), preview(actual))
    }
}

fn check_size(assertion: &Assertion, actual: &Value, min: usize) -> AssertionResult {
    let len = match actual {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => {
            return AssertionResult::fail_with_value(
                assertion.clone(),
                preview(other),
                format!(
                    "{}: expected an array at '{}', found {}",
                    assertion.message,
                    assertion.path,
                    kind_of(other)
                ),
            );
        }
    };

    if len >= min {
        AssertionResult::pass_with_value(assertion.clone(), len.to_string())
    } else {
        AssertionResult::fail_with_value(
            assertion.clone(),
            len.to_string(),
            format!("{}: size {len} is less than {min}", assertion.message),
        )
    }
}

/// Structural equality where numbers compare by value.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => actual == expected,
    }
}

/// Integers compare exactly; anything else is equal at `f64` or `f32` precision.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y || (x as f32) == (y as f32),
        _ => false,
    }
}

fn preview(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > PREVIEW_LIMIT {
        let head: String = rendered.chars().take(PREVIEW_LIMIT).collect();
        format!("{head}...")
    } else {
        rendered
    }
}
