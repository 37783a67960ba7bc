//! Basic authentication injection.
//!
//! Preemptive mode puts the `Authorization` header on the first request.
//! Challenge-response mode sends the request bare and repeats it once with
//! credentials only if the server answers 401.

use tracing::debug;
use vouch_domain::auth::{AUTHORIZATION, AuthMode, BasicAuth, Credentials};
use vouch_domain::request::RequestSpec;
use vouch_domain::response::ResponseSpec;

use crate::ports::{HttpClient, NetworkError};

const UNAUTHORIZED: u16 = 401;

/// Attaches Basic credentials to requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthInjector;

impl AuthInjector {
    /// Creates a new injector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns `request` carrying `credentials` in `mode`.
    ///
    /// In preemptive mode the `Authorization` header is set here. In
    /// challenge-response mode only the credentials are recorded; the header
    /// is added by [`AuthInjector::send`] after a 401.
    #[must_use]
    pub fn decorate(
        &self,
        request: RequestSpec,
        credentials: &Credentials,
        mode: AuthMode,
    ) -> RequestSpec {
        let request = request.with_auth(BasicAuth {
            credentials: credentials.clone(),
            mode,
        });
        match mode {
            AuthMode::Preemptive => Self::authorize(request, credentials),
            AuthMode::ChallengeResponse => request,
        }
    }

    /// Applies whatever credentials the request already carries.
    #[must_use]
    pub fn prepare(&self, request: RequestSpec) -> RequestSpec {
        match request.auth().cloned() {
            Some(auth) => self.decorate(request, &auth.credentials, auth.mode),
            None => request,
        }
    }

    /// Sends `request` through `client`, honouring its auth mode.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] from whichever send failed.
    pub async fn send<C>(
        &self,
        client: &C,
        request: RequestSpec,
    ) -> Result<ResponseSpec, NetworkError>
    where
        C: HttpClient + ?Sized,
    {
        let request = self.prepare(request);
        let response = client.execute(&request).await?;

        let challenge = match request.auth() {
            Some(auth) if auth.mode == AuthMode::ChallengeResponse => auth,
            _ => return Ok(response),
        };
        if response.status() != UNAUTHORIZED || request.is_authorized() {
            return Ok(response);
        }

        debug!(
            request = %request.request_line(),
            "received 401 challenge, resending with credentials"
        );
        let retry = Self::authorize(request.clone(), &challenge.credentials);
        client.execute(&retry).await
    }

    fn authorize(request: RequestSpec, credentials: &Credentials) -> RequestSpec {
        request.with_header(AUTHORIZATION, credentials.basic_header_value())
    }
}
