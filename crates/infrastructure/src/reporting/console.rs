//! Plain-text run summary.

use std::fmt;

use vouch_domain::testing::{AssertionStatus, OutcomeStatus, RunReport, ScenarioOutcome};

/// Renders a [`RunReport`] for a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Creates a new console reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// One line per scenario, failure details beneath it, then totals.
    #[must_use]
    pub fn render(&self, report: &RunReport) -> String {
        Summary(report).to_string()
    }
}

struct Summary<'a>(&'a RunReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Suite: {} (run {})", report.suite, report.id)?;

        for outcome in &report.outcomes {
            write_outcome(f, outcome)?;
        }

        let totals = &report.totals;
        writeln!(
            f,
            "Scenarios: {} total, {} passed, {} failed, {} network failures",
            totals.scenarios, totals.passed, totals.failed, totals.network_failures
        )?;
        writeln!(
            f,
            "Assertions: {} total, {} failed",
            totals.assertions, totals.failed_assertions
        )
    }
}

fn write_outcome(f: &mut fmt::Formatter<'_>, outcome: &ScenarioOutcome) -> fmt::Result {
    let label = match outcome.status {
        OutcomeStatus::Passed => "PASS",
        OutcomeStatus::Failed => "FAIL",
        OutcomeStatus::NetworkFailure => "NET ",
    };
    writeln!(
        f,
        "  {label}  {} ({} assertions, {} ms)",
        outcome.scenario,
        outcome.assertion_count(),
        outcome.duration_ms
    )?;

    if outcome.passed() {
        return Ok(());
    }

    for step in &outcome.steps {
        if let Some(message) = step.status_check.as_ref().and_then(|c| c.failure_message()) {
            writeln!(f, "        {}: {message}", step.request)?;
        }
        for error in &step.errors {
            writeln!(f, "        {}: {}", step.request, error.description())?;
        }
        for result in &step.assertions {
            if result.status == AssertionStatus::Failed {
                let detail = result.error.as_deref().unwrap_or("failed");
                writeln!(f, "        {}: {detail}", step.request)?;
            }
        }
    }
    Ok(())
}
