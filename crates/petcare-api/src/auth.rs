// Token-based login
//
// POSTs the account credentials plus the per-process device id and keeps
// the returned bearer token in the session. Logins are serialized on their
// own mutex, separate from the fetch mutex.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, trace, warn};

use crate::client::{PetcareClient, decode_json};
use crate::error::Error;
use crate::headers::build_headers;
use crate::models::{Envelope, LoginData, LoginRequest};

const AUTH_PATH: &str = "auth/login";

impl PetcareClient {
    /// Authenticate and store a bearer token.
    ///
    /// Without `force`, a held token younger than the login window counts
    /// as success and no request is made. Concurrent callers queue on the
    /// login mutex, so at most one login request is in flight.
    ///
    /// Returns `Ok(false)` if the service refused the credentials or sent
    /// no token; the held token is cleared in that case.
    pub async fn login(&self, force: bool) -> Result<bool, Error> {
        let _guard = self.login_lock.lock().await;

        if !force && self.session.has_token() && self.session.login_window().is_throttled() {
            trace!("login within rate-limit window, reusing token");
            return Ok(true);
        }

        self.authenticate(force).await
    }

    /// Forced login after a 401 on a request that carried `stale`.
    ///
    /// Callers that queued behind another re-login find a different token
    /// in the session once they hold the login mutex, and reuse it instead
    /// of logging in again.
    pub(crate) async fn relogin(&self, stale: Option<&Arc<SecretString>>) -> Result<bool, Error> {
        let _guard = self.login_lock.lock().await;

        if self.session.token_renewed_since(stale) {
            debug!("token already renewed by a concurrent caller");
            return Ok(true);
        }

        self.authenticate(true).await
    }

    /// POST the credentials. Callers hold the login mutex.
    async fn authenticate(&self, force: bool) -> Result<bool, Error> {
        let url = self.resource_url(AUTH_PATH)?;
        let body = LoginRequest {
            email_address: &self.credentials.email,
            password: self.credentials.password.expose_secret(),
            device_id: self.session.device_id(),
        };
        let headers = build_headers(self.session.device_id(), None, None);

        debug!(%url, force, "logging in");

        let resp = self
            .http()
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            self.session.clear_token();
            warn!(status = status.as_u16(), "login rejected");
            return Ok(false);
        }

        let text = resp.text().await.map_err(|e| self.map_transport(e))?;
        let envelope: Envelope<LoginData> = decode_json(&text).inspect_err(|_| {
            self.session.clear_token();
        })?;

        if let Some(token) = envelope.data.token {
            self.session.set_token(SecretString::from(token));
            self.session.login_window().mark_success();
            info!("login successful");
            Ok(true)
        } else {
            self.session.clear_token();
            warn!("login response carried no token");
            Ok(false)
        }
    }
}
