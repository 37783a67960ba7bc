//! Scenario descriptors.
//!
//! A scenario is one logical test case: an ordered list of steps, each a
//! request, the status it must return, and the assertions to run on its body.

use uuid::Uuid;

use crate::error::DomainResult;
use crate::request::RequestSpec;
use crate::testing::{Assertion, BodyPath, StatusExpectation};

/// Names a value in a step's response body for use by later steps.
///
/// Later steps reference it as `{{name}}` in their path or body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Variable name.
    pub name: String,
    /// Where to read it from.
    pub path: BodyPath,
}

/// One HTTP interaction and its checks.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// The request to send.
    pub request: RequestSpec,
    /// Status the response must have.
    pub expected_status: StatusExpectation,
    /// Body assertions, evaluated in order.
    pub assertions: Vec<Assertion>,
    /// Values to capture from the body.
    pub captures: Vec<Capture>,
}

impl Step {
    /// Creates a step expecting a 2xx status and no body checks.
    #[must_use]
    pub fn new(request: RequestSpec) -> Self {
        Self {
            request,
            expected_status: StatusExpectation::default(),
            assertions: Vec::new(),
            captures: Vec::new(),
        }
    }

    /// Sets the expected status.
    #[must_use]
    pub fn expect_status(mut self, expected: StatusExpectation) -> Self {
        self.expected_status = expected;
        self
    }

    /// Adds an assertion.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Captures the value at `path` as `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a valid path expression.
    pub fn capture(mut self, name: impl Into<String>, path: &str) -> DomainResult<Self> {
        self.captures.push(Capture {
            name: name.into(),
            path: BodyPath::parse(path)?,
        });
        Ok(self)
    }
}

/// One logical test case.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Unique identifier.
    pub id: Uuid,
    /// Scenario name.
    pub name: String,
    /// Steps, run in order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create a new empty scenario.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Add a step (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of assertions declared across all steps.
    #[must_use]
    pub fn declared_assertions(&self) -> usize {
        self.steps.iter().map(|s| s.assertions.len()).sum()
    }
}
