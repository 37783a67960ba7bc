//! Authentication configuration types

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Name of the header carrying credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// A username/password pair for HTTP Basic authentication.
///
/// The server decides whether the pair is valid; empty values are allowed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the `Authorization` header value: `Basic base64(username:password)`.
    #[must_use]
    pub fn basic_header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// When credentials are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Send the `Authorization` header on the first request.
    #[default]
    Preemptive,
    /// Send unauthenticated first; resend with credentials only after a 401.
    ChallengeResponse,
}

/// Basic authentication attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// The credential pair.
    pub credentials: Credentials,
    /// Delivery mode.
    #[serde(default)]
    pub mode: AuthMode,
}

impl BasicAuth {
    /// Preemptive basic authentication.
    #[must_use]
    pub fn preemptive(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            mode: AuthMode::Preemptive,
        }
    }

    /// Challenge-response basic authentication.
    #[must_use]
    pub fn challenge(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            mode: AuthMode::ChallengeResponse,
        }
    }
}
