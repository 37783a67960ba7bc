//! Harness configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Default target server root.
pub const DEFAULT_BASE_URI: &str = "http://localhost:8085";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default request content type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// What to do with body assertions when the status check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyPolicy {
    /// Evaluate body assertions regardless of status.
    AlwaysEvaluate,
    /// Record body assertions as skipped when the status did not match.
    #[default]
    SkipOnStatusMismatch,
}

/// Options recognised by the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarnessConfig {
    /// Target server root.
    pub base_uri: String,
    /// Per-request bound in milliseconds.
    pub timeout_ms: u64,
    /// Content type for requests with a body and no explicit header.
    pub default_content_type: String,
    /// Number of scenarios run concurrently.
    pub parallelism: usize,
    /// Body assertion policy on status mismatch.
    pub body_policy: BodyPolicy,
    /// Where to write a JSON report, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            parallelism: 1,
            body_policy: BodyPolicy::default(),
            report_path: None,
        }
    }
}

impl HarnessConfig {
    /// Parsed base URI.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if `base_uri` is not an absolute
    /// http(s) URL.
    pub fn base_url(&self) -> DomainResult<Url> {
        let url = Url::parse(&self.base_uri)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_uri)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(DomainError::InvalidUrl(format!(
                "base URI must use http or https: {}",
                self.base_uri
            )));
        }
        Ok(url)
    }

    /// Checks every option.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option found.
    pub fn validate(&self) -> DomainResult<()> {
        self.base_url()?;
        if self.timeout_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "timeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(DomainError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.default_content_type.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "defaultContentType must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
