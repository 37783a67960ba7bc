//! Vouch - HTTP contract tests for the books REST API
//!
//! Wires the harness layers together: configuration, the reqwest client,
//! the books suite and report output.

pub mod books;
pub mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use vouch_application::{ApplicationError, RunSuite, ScenarioRunner, Suite};
use vouch_domain::config::HarnessConfig;
use vouch_domain::testing::RunReport;
use vouch_infrastructure::{
    ConfigError, ConfigLoader, ConsoleReporter, JsonReportWriter, ReportError, ReqwestHttpClient,
    SystemClock,
};

pub use books::{BooksSettings, BooksSuite};

/// Errors that stop a run before or after scenarios execute.
#[derive(Debug, Error)]
pub enum RunError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] vouch_application::NetworkError),

    /// Suite setup or construction failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The report file could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Loads configuration from the process environment and `file`.
///
/// # Errors
///
/// Returns [`RunError::Config`] if loading or validation fails.
pub fn load_config(file: Option<PathBuf>) -> Result<HarnessConfig, RunError> {
    Ok(ConfigLoader::from_process_env(file).load()?)
}

/// Runs `suite` against the server in `config`.
///
/// Writes the JSON report if `config.report_path` is set.
///
/// # Errors
///
/// Returns [`RunError`] if the client, suite setup or report writing fails.
/// Scenario failures are part of the returned report.
pub async fn run(config: &HarnessConfig, suite: &dyn Suite) -> Result<RunReport, RunError> {
    let client = Arc::new(ReqwestHttpClient::from_config(config)?);
    let runner = ScenarioRunner::from_config(client, config);
    let report = RunSuite::new(runner, Arc::new(SystemClock::new()))
        .execute(suite)
        .await?;

    if let Some(path) = &config.report_path {
        JsonReportWriter::new(path).write(&report).await?;
    }
    Ok(report)
}

/// Renders the console summary for `report`.
#[must_use]
pub fn render(report: &RunReport) -> String {
    ConsoleReporter::new().render(report)
}
