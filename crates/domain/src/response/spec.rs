//! Response capture type
//!
//! Contains types for representing HTTP responses including
//! status codes, headers, body, and timing information.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MalformedResponse;

/// Numeric HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Captured HTTP response.
///
/// Immutable after receipt. The structured JSON view is parsed on first
/// access and cached, so repeated evaluations see the same value.
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    duration: Duration,
    json: OnceLock<Result<serde_json::Value, MalformedResponse>>,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec` from raw response data.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: HashMap<String, String>,
        body: Vec<u8>,
        duration: Duration,
    ) -> Self {
        Self {
            status: status.into(),
            headers,
            body,
            duration,
            json: OnceLock::new(),
        }
    }

    /// Numeric status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status as a `StatusCode`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// All response headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body as text; invalid UTF-8 is replaced.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Time from send to the last body byte.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Structured JSON view of the body.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedResponse`] if the body is empty or not JSON.
    pub fn json(&self) -> Result<&serde_json::Value, MalformedResponse> {
        self.json
            .get_or_init(|| {
                if self.body.iter().all(u8::is_ascii_whitespace) {
                    return Err(MalformedResponse("body is empty".to_string()));
                }
                serde_json::from_slice(&self.body).map_err(|e| MalformedResponse(e.to_string()))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns a body preview of at most `max` characters.
    #[must_use]
    pub fn body_preview(&self, max: usize) -> String {
        let text = self.body_text();
        if text.chars().count() > max {
            let head: String = text.chars().take(max).collect();
            format!("{head}...")
        } else {
            text.into_owned()
        }
    }
}
