//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Relative request paths are resolved against the configured base URI.

use std::collections::HashMap;
use std::error::Error as _;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, Url};
use tracing::debug;
use vouch_application::ports::{HttpClient, NetworkError, ResponseFuture};
use vouch_domain::config::HarnessConfig;
use vouch_domain::request::{HttpMethod, RequestSpec};
use vouch_domain::response::ResponseSpec;

const MAX_REDIRECTS: usize = 10;
const CONTENT_TYPE: &str = "Content-Type";

/// HTTP client implementation using reqwest.
///
/// Wraps `reqwest::Client` together with the harness base URI, default
/// timeout and default content type. Requests are sent exactly once.
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
    default_content_type: String,
}

impl ReqwestHttpClient {
    /// Creates a client from harness configuration.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "Vouch/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the base URI is invalid or the client cannot be
    /// created.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, NetworkError> {
        let base_url = config
            .base_url()
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .user_agent(concat!("Vouch/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| NetworkError::Other(e.to_string()))?;

        Ok(Self::with_client(client, base_url, config))
    }

    /// Creates a client around a custom reqwest client.
    #[must_use]
    pub fn with_client(client: Client, base_url: Url, config: &HarnessConfig) -> Self {
        Self {
            client,
            base_url,
            timeout_ms: config.timeout_ms,
            default_content_type: config.default_content_type.clone(),
        }
    }

    /// Base URI relative paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to `NetworkError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> NetworkError {
        if error.is_timeout() {
            return NetworkError::Timeout { timeout_ms };
        }

        let host = || {
            error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string()
        };

        if error.is_connect() {
            let message = error_chain(error);
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return NetworkError::DnsError {
                    host: host(),
                    message,
                };
            }
            if lowered.contains("refused") {
                return NetworkError::ConnectionRefused {
                    host: host(),
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return NetworkError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return NetworkError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        NetworkError::Other(error_chain(error))
    }
}

/// Joins an error and its sources; reqwest keeps the OS cause in the chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: &'a RequestSpec) -> ResponseFuture<'a> {
        Box::pin(async move {
            let url = request
                .resolve_url(&self.base_url)
                .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
            let timeout_ms = request.timeout_ms().unwrap_or(self.timeout_ms);

            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method()), url)
                .timeout(Duration::from_millis(timeout_ms));

            for header in request.headers().iter() {
                builder = builder.header(&header.name, &header.value);
            }

            if let Some(body) = request.body() {
                if !request.headers().contains(CONTENT_TYPE) {
                    builder = builder.header(CONTENT_TYPE, &self.default_content_type);
                }
                builder = builder.body(body.to_string());
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();

            let response_headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body_bytes = response
                .bytes()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?
                .to_vec();

            let duration = start.elapsed();
            debug!(
                request = %request.request_line(),
                status,
                duration_ms = duration.as_millis(),
                "response received"
            );

            Ok(ResponseSpec::new(
                status,
                response_headers,
                body_bytes,
                duration,
            ))
        })
    }
}
