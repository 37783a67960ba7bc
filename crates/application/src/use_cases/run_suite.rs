//! Run suite use case.

use std::sync::Arc;

use tracing::info;
use vouch_domain::scenario::Scenario;
use vouch_domain::testing::RunReport;

use crate::error::ApplicationResult;
use crate::ports::{Clock, HttpClient};

use super::ScenarioRunner;

/// A named collection of scenarios with a shared setup step.
pub trait Suite: Send + Sync {
    /// Suite name, used in reports.
    fn name(&self) -> &str;

    /// Runs once before any scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if the suite cannot run at all.
    fn setup(&self) -> ApplicationResult<()> {
        Ok(())
    }

    /// Builds the scenarios in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if a scenario descriptor is invalid.
    fn scenarios(&self) -> ApplicationResult<Vec<Scenario>>;
}

/// Use case for running a whole suite into a [`RunReport`].
pub struct RunSuite<C: HttpClient + 'static> {
    runner: ScenarioRunner<C>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient + 'static> RunSuite<C> {
    /// Creates a new `RunSuite` use case.
    #[must_use]
    pub fn new(runner: ScenarioRunner<C>, clock: Arc<dyn Clock>) -> Self {
        Self { runner, clock }
    }

    /// Runs setup, then every scenario, and stamps the report.
    ///
    /// # Errors
    ///
    /// Returns an error only if setup or scenario construction fails;
    /// scenario failures are recorded in the report.
    pub async fn execute(&self, suite: &dyn Suite) -> ApplicationResult<RunReport> {
        suite.setup()?;
        let scenarios = suite.scenarios()?;

        info!(
            suite = suite.name(),
            scenarios = scenarios.len(),
            parallelism = self.runner.parallelism(),
            "starting run"
        );
        let started_at = self.clock.now();
        let outcomes = self.runner.run_all(scenarios).await;
        let finished_at = self.clock.now();

        let report = RunReport::new(suite.name(), started_at, finished_at, outcomes);
        info!(
            suite = suite.name(),
            passed = report.totals.passed,
            failed = report.totals.failed,
            network_failures = report.totals.network_failures,
            "run finished"
        );
        Ok(report)
    }
}
