//! Scenario outcomes and run reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assertion::{AssertionResult, StatusCheck};

/// Why a step did not complete normally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepError {
    /// Transport failure; aborts the scenario.
    Network {
        /// Rendered transport error.
        message: String,
    },
    /// The step referenced values no earlier step captured; aborts the scenario.
    UnresolvedVariables {
        /// Names left unresolved.
        names: Vec<String>,
    },
    /// A capture path did not resolve in the response body.
    CaptureFailed {
        /// Capture name.
        name: String,
        /// Why it failed.
        reason: String,
    },
    /// The harness itself failed while running the step.
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl StepError {
    /// Get a human-readable description of this error.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Network { message } => format!("network error: {message}"),
            Self::UnresolvedVariables { names } => {
                format!("unresolved variables: {}", names.join(", "))
            }
            Self::CaptureFailed { name, reason } => format!("capture '{name}' failed: {reason}"),
            Self::Internal { message } => format!("internal error: {message}"),
        }
    }
}

/// Result of one request/assertion step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepOutcome {
    /// Request line, e.g. `GET /books/2`.
    pub request: String,
    /// Status check; `None` if no response was received.
    pub status_check: Option<StatusCheck>,
    /// One result per declared assertion, in declaration order.
    pub assertions: Vec<AssertionResult>,
    /// Values captured for later steps.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub captured: BTreeMap<String, String>,
    /// Errors raised by this step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<StepError>,
    /// Round-trip time in milliseconds.
    pub duration_ms: u64,
}

impl StepOutcome {
    /// Creates an outcome for a step that was never sent.
    #[must_use]
    pub fn not_sent(request: impl Into<String>, assertions: Vec<AssertionResult>) -> Self {
        Self {
            request: request.into(),
            status_check: None,
            assertions,
            captured: BTreeMap::new(),
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Whether the status check passed, no assertion failed and no error occurred.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status_check.as_ref().is_some_and(|c| c.passed)
            && self.errors.is_empty()
            && !self.assertions.iter().any(AssertionResult::failed)
    }

    /// Number of assertions that actually ran.
    #[must_use]
    pub fn evaluated_count(&self) -> usize {
        self.assertions
            .iter()
            .filter(|r| r.passed() || r.failed())
            .count()
    }
}

/// Terminal status of a scenario.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Every status check and assertion passed.
    Passed,
    /// At least one status check, assertion or capture failed.
    Failed,
    /// A transport error aborted the scenario.
    NetworkFailure,
}

/// The aggregated result and diagnostics for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub scenario: String,
    /// Terminal status.
    pub status: OutcomeStatus,
    /// One outcome per declared step, in order.
    pub steps: Vec<StepOutcome>,
    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Builds an outcome, deriving the status from the steps.
    #[must_use]
    pub fn from_steps(
        scenario: impl Into<String>,
        steps: Vec<StepOutcome>,
        duration_ms: u64,
    ) -> Self {
        let network_failure = steps.iter().any(|s| {
            s.errors
                .iter()
                .any(|e| matches!(e, StepError::Network { .. }))
        });
        let status = if network_failure {
            OutcomeStatus::NetworkFailure
        } else if steps.iter().all(StepOutcome::passed) {
            OutcomeStatus::Passed
        } else {
            OutcomeStatus::Failed
        };
        Self {
            scenario: scenario.into(),
            status,
            steps,
            duration_ms,
        }
    }

    /// Whether the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }

    /// Total number of assertion results across all steps.
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.steps.iter().map(|s| s.assertions.len()).sum()
    }

    /// Iterator over failed assertion results.
    pub fn failed_assertions(&self) -> impl Iterator<Item = &AssertionResult> {
        self.steps
            .iter()
            .flat_map(|s| s.assertions.iter())
            .filter(|r| r.failed())
    }
}

/// Totals across a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunTotals {
    /// Scenarios run.
    pub scenarios: usize,
    /// Scenarios passed.
    pub passed: usize,
    /// Scenarios failed on a check.
    pub failed: usize,
    /// Scenarios aborted by a network error.
    pub network_failures: usize,
    /// Assertion results recorded.
    pub assertions: usize,
    /// Assertion results that failed.
    pub failed_assertions: usize,
}

/// Results from running a collection of scenarios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// Unique identifier.
    pub id: Uuid,
    /// Suite name.
    pub suite: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Outcomes in registration order.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Aggregated counts.
    pub totals: RunTotals,
}

impl RunReport {
    /// Create a new report, computing totals.
    #[must_use]
    pub fn new(
        suite: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        outcomes: Vec<ScenarioOutcome>,
    ) -> Self {
        let mut totals = RunTotals {
            scenarios: outcomes.len(),
            ..RunTotals::default()
        };
        for outcome in &outcomes {
            match outcome.status {
                OutcomeStatus::Passed => totals.passed += 1,
                OutcomeStatus::Failed => totals.failed += 1,
                OutcomeStatus::NetworkFailure => totals.network_failures += 1,
            }
            totals.assertions += outcome.assertion_count();
            totals.failed_assertions += outcome.failed_assertions().count();
        }

        Self {
            id: Uuid::now_v7(),
            suite: suite.into(),
            started_at,
            finished_at,
            outcomes,
            totals,
        }
    }

    /// Check if all scenarios passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.totals.passed == self.totals.scenarios
    }

    /// Process exit status: 0 when everything passed, 1 otherwise.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.all_passed() { 0 } else { 1 }
    }
}
