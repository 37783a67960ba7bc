//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use vouch_domain::request::RequestSpec;
use vouch_domain::response::ResponseSpec;

/// Transport-level failure. Aborts the current scenario only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Nothing was listening on the target port.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The host name did not resolve.
    #[error("DNS lookup failed for {host}: {message}")]
    DnsError {
        /// Target host.
        host: String,
        /// Underlying cause.
        message: String,
    },

    /// Any other connect-phase failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The redirect limit was hit.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured limit.
        max: usize,
    },

    /// Anything else reported by the transport.
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`HttpClient::execute`].
pub type ResponseFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseSpec, NetworkError>> + Send + 'a>>;

/// Port for executing HTTP requests.
///
/// Implementations resolve the request path against their base URI, send
/// exactly once, and never retry.
pub trait HttpClient: Send + Sync {
    /// Sends the request and captures the response.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] if no response was received.
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> ResponseFuture<'a>;
}
