//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A body path expression could not be parsed.
    #[error("invalid body path '{path}': {reason}")]
    InvalidPath {
        /// The raw path expression.
        path: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A scenario tried to move between two states that are not connected.
    #[error("invalid scenario state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// State the scenario was in.
        from: String,
        /// State that was requested.
        to: String,
    },

    /// A harness configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// A response body that could not be parsed into its structured view.
///
/// Never fatal: the matcher turns it into a failed assertion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed response body: {0}")]
pub struct MalformedResponse(pub String);
