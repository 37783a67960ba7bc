//! Application error types

use thiserror::Error;
use vouch_domain::DomainError;

/// Application-level errors.
///
/// Raised while preparing or setting up a run; scenario failures are
/// recorded in outcomes instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A suite's setup step failed.
    #[error("suite setup failed: {0}")]
    Setup(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
