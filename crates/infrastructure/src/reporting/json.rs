//! JSON report file writer.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use vouch_domain::testing::RunReport;

use crate::serialization::{SerializationError, to_json_stable};

/// Errors raised while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be serialized.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The report file could not be written.
    #[error("failed to write report to {path}: {source}")]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

/// Writes a [`RunReport`] as deterministic pretty JSON.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    path: PathBuf,
}

impl JsonReportWriter {
    /// Creates a writer targeting `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the report, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if serialization or any filesystem call fails.
    pub async fn write(&self, report: &RunReport) -> Result<(), ReportError> {
        let json = to_json_stable(report)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))?;

        info!(path = %self.path.display(), "report written");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
