//! Request specification type

use url::Url;

use super::{Header, Headers, HttpMethod};
use crate::auth::{AUTHORIZATION, BasicAuth};
use crate::error::{DomainError, DomainResult};

/// Content type attached by [`RequestSpec::with_json`].
pub const APPLICATION_JSON: &str = "application/json";

/// Complete, immutable specification of one HTTP interaction.
///
/// Every builder method consumes the value and returns a new one, so a
/// request handed to a client is never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: HttpMethod,
    path: String,
    headers: Headers,
    body: Option<String>,
    auth: Option<BasicAuth>,
    timeout_ms: Option<u64>,
}

impl RequestSpec {
    /// Creates a request for `method` against `path`.
    ///
    /// `path` is either an absolute URL or relative to the harness base URI.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
            auth: None,
            timeout_ms: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Sets a header, replacing one with the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(Header::new(name, value));
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and the matching `Content-Type`.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header("Content-Type", APPLICATION_JSON)
            .with_body(body.to_string())
    }

    /// Attaches Basic credentials and their delivery mode.
    ///
    /// This only records the credentials; the auth injector decides when the
    /// `Authorization` header is added.
    #[must_use]
    pub fn with_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Overrides the harness timeout for this request.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns a copy with a different path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute URL or base-relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Raw body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Attached credentials, if any.
    #[must_use]
    pub const fn auth(&self) -> Option<&BasicAuth> {
        self.auth.as_ref()
    }

    /// Per-request timeout override in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Returns true if an `Authorization` header is already set.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.headers.contains(AUTHORIZATION)
    }

    /// Returns a short description such as `GET /books/2`.
    #[must_use]
    pub fn request_line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Resolves the path against `base`.
    ///
    /// Absolute URLs are used as-is. Relative paths are appended to the
    /// base path, so a base of `http://host/api` maps `/books` to
    /// `http://host/api/books`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the path cannot be joined.
    pub fn resolve_url(&self, base: &Url) -> DomainResult<Url> {
        if let Ok(absolute) = Url::parse(&self.path) {
            return Ok(absolute);
        }
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(self.path.trim_start_matches('/'))
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.path)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builder_returns_new_values() {
        let base = RequestSpec::get("/books");
        let with_header = base.clone().with_header("Accept", "application/json");

        assert!(base.headers().is_empty());
        assert_eq!(with_header.headers().get("accept"), Some("application/json"));
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let req = RequestSpec::post("/books").with_json(&json!({"name": "Clean Code"}));
        assert_eq!(req.headers().get("Content-Type"), Some(APPLICATION_JSON));
        assert_eq!(req.body(), Some(r#"{"name":"Clean Code"}"#));
    }

    #[test]
    fn test_with_auth_does_not_add_header() {
        let req = RequestSpec::get("/books").with_auth(BasicAuth::preemptive("user", "password"));
        assert!(req.auth().is_some());
        assert!(!req.is_authorized());
    }

    #[test]
    fn test_request_line() {
        assert_eq!(RequestSpec::delete("/books/1").request_line(), "DELETE /books/1");
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = Url::parse("http://localhost:8085").unwrap();
        let url = RequestSpec::get("/books/2").resolve_url(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8085/books/2");
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        let base = Url::parse("http://localhost:8085/api").unwrap();
        let url = RequestSpec::get("/books?limit=2").resolve_url(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8085/api/books?limit=2");
    }

    #[test]
    fn test_resolve_absolute_url() {
        let base = Url::parse("http://localhost:8085").unwrap();
        let url = RequestSpec::get("http://other:9000/health")
            .resolve_url(&base)
            .unwrap();
        assert_eq!(url.as_str(), "http://other:9000/health");
    }
}
