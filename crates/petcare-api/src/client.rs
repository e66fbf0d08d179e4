// Petcare API HTTP client
//
// Wraps `reqwest::Client` with the service's URL layout, header set,
// per-resource ETag caching and the 401/timeout retry loop. Login lives
// in `auth.rs` as an inherent impl on the same type.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::headers::{ETAG, build_headers};
use crate::session::{RateLimits, Session};
use crate::transport::{RetryPolicy, TransportConfig};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://app.api.surehub.io/api/";

const ME_START_PATH: &str = "me/start";
const PET_PATH: &str = "pet";
const PET_DETAIL_INCLUDES: [&str; 8] = [
    "photo",
    "breed",
    "conditions",
    "tag",
    "food_type",
    "species",
    "position",
    "status",
];

/// Account credentials. Immutable for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Outcome of a single request attempt that the retry loop acts on.
enum Reply {
    Body(Value),
    /// Carries the token the rejected request was sent with.
    Unauthorized { sent: Option<Arc<SecretString>> },
}

/// Raw HTTP client for the Sure Petcare cloud API.
///
/// Every outbound call goes through [`fetch`](Self::fetch), which holds a
/// client-wide mutex for the duration of the request: the service does not
/// tolerate bursts, so requests are never issued in parallel.
pub struct PetcareClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) credentials: Credentials,
    pub(crate) session: Session,
    retry: RetryPolicy,
    timeout: Duration,
    fetch_lock: Mutex<()>,
    pub(crate) login_lock: Mutex<()>,
}

impl PetcareClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (see [`DEFAULT_BASE_URL`]); a trailing
    /// slash is added if missing so resource paths join beneath it.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
        limits: RateLimits,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            base_url,
            credentials,
            transport.retry,
            limits,
        )
        .with_timeout(transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
        retry: RetryPolicy,
        limits: RateLimits,
    ) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            credentials,
            session: Session::new(limits),
            retry,
            timeout: crate::transport::DEFAULT_TIMEOUT,
            fetch_lock: Mutex::new(()),
            login_lock: Mutex::new(()),
        }
    }

    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying HTTP client.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session state (token, ETags, rate-limit windows).
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The retry policy applied by [`fetch`](Self::fetch).
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a path relative to the API root.
    pub fn resource_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Aggregate devices + pets snapshot: `{base}/me/start`
    pub fn me_start_url(&self) -> Result<Url, Error> {
        self.resource_url(ME_START_PATH)
    }

    /// Household event log: `{base}/timeline/household/{id}/`
    pub fn timeline_url(&self, household_id: i64) -> Result<Url, Error> {
        self.resource_url(&format!("timeline/household/{household_id}/"))
    }

    /// Flap control block: `{base}/device/{id}/control`
    pub fn control_url(&self, flap_id: i64) -> Result<Url, Error> {
        self.resource_url(&format!("device/{flap_id}/control"))
    }

    /// Pet list with detail includes: `{base}/pet?with[]=photo&...`
    pub fn pet_url(&self) -> Result<Url, Error> {
        let mut url = self.resource_url(PET_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            for include in PET_DETAIL_INCLUDES {
                query.append_pair("with[]", include);
            }
        }
        Ok(url)
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Issue a request with the configured retry budget.
    ///
    /// Returns `Ok(None)` when the service rejected the request or the
    /// session could not be re-established; callers treat that as
    /// "temporarily unavailable". Only an exhausted timeout budget, a
    /// connection failure, or an undecodable body is an `Err`.
    pub async fn fetch(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<Option<Value>, Error> {
        self.fetch_with_budget(method, url, body, self.retry.budget)
            .await
    }

    /// Like [`fetch`](Self::fetch) with an explicit retry budget.
    pub async fn fetch_with_budget(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
        mut retries: u32,
    ) -> Result<Option<Value>, Error> {
        loop {
            match self.send(&method, url, body).await {
                Ok(Reply::Body(value)) => return Ok(Some(value)),
                Ok(Reply::Unauthorized { sent }) => {
                    self.session.invalidate_token(sent.as_ref());
                    if retries == 0 {
                        warn!(%url, "still unauthorized after exhausting retries");
                        return Ok(None);
                    }
                    debug!(%url, retries, "unauthorized, logging in again");
                    match self.relogin(sent.as_ref()).await {
                        Ok(true) => retries -= 1,
                        Ok(false) => {
                            warn!(%url, "re-login failed, giving up on request");
                            return Ok(None);
                        }
                        Err(e) if e.is_timeout() => {
                            retries -= 1;
                            self.backoff(url, retries).await;
                        }
                        Err(e) => {
                            warn!(%url, error = %e, "re-login failed, giving up on request");
                            return Ok(None);
                        }
                    }
                }
                Err(Error::Rejected { status }) => {
                    debug!(%url, status, "request rejected, no result");
                    return Ok(None);
                }
                Err(e) if e.is_timeout() && retries > 0 => {
                    retries -= 1;
                    self.backoff(url, retries).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn backoff(&self, url: &Url, retries: u32) {
        warn!(%url, retries, backoff = ?self.retry.backoff, "request timed out, backing off");
        tokio::time::sleep(self.retry.backoff).await;
    }

    /// Send one request under the fetch mutex and classify the response.
    ///
    /// The token is read only once the mutex is held, so a request queued
    /// behind a re-login carries the renewed token.
    async fn send(&self, method: &Method, url: &Url, body: Option<&Value>) -> Result<Reply, Error> {
        let _guard = self.fetch_lock.lock().await;

        let resource = url.as_str();
        let token = self.session.token();
        let etag = self.session.etag(resource);
        let headers = build_headers(self.session.device_id(), token.as_deref(), etag.as_deref());
        debug!(%method, %url, etag = etag.as_deref(), "sending request");

        let mut builder = self.http.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                let new_etag = resp
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let text = resp.text().await.map_err(|e| self.map_transport(e))?;
                let value = decode_json(&text)?;
                if let Some(new_etag) = new_etag {
                    self.session.store_etag(resource, &new_etag);
                }
                trace!(%url, "response decoded");
                Ok(Reply::Body(value))
            }
            StatusCode::UNAUTHORIZED => Ok(Reply::Unauthorized { sent: token }),
            other => Err(Error::Rejected {
                status: other.as_u16(),
            }),
        }
    }

    /// Translate a reqwest failure, surfacing timeouts as [`Error::Timeout`].
    pub(crate) fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
