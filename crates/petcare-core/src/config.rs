// ── Runtime client configuration ──
//
// Describes how to reach the service and how aggressively to poll it.
// Carries credential data but never touches disk; `petcare-config` (or
// any other host) builds a `PetcareConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use petcare_api::{RateLimits, RetryPolicy, TlsMode, TransportConfig};

/// Account credentials for the Petcare service.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub email: String,
    pub password: SecretString,
}

/// Configuration for a single `Petcare` client.
#[derive(Debug, Clone)]
pub struct PetcareConfig {
    /// API root (defaults to the production service).
    pub base_url: Url,
    pub auth: AuthCredentials,
    /// Extra CA certificate to trust, for intercepting proxies.
    pub ca_cert: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum age of a token before a non-forced login hits the network.
    pub login_rate_limit: Duration,
    /// Minimum spacing between non-forced `me/start` fetches.
    pub data_rate_limit: Duration,
    /// Minimum spacing between non-forced timeline passes.
    pub timeline_rate_limit: Duration,
    /// Retries granted to each fetch for 401 and timeout recovery.
    pub retry_budget: u32,
    /// Wait before retrying a timed-out request.
    pub retry_backoff: Duration,
}

impl PetcareConfig {
    /// Production defaults for the given account.
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        let limits = RateLimits::default();
        let retry = RetryPolicy::default();
        Self {
            base_url: default_base_url(),
            auth: AuthCredentials {
                email: email.into(),
                password,
            },
            ca_cert: None,
            timeout: petcare_api::transport::DEFAULT_TIMEOUT,
            login_rate_limit: limits.login,
            data_rate_limit: limits.data,
            timeline_rate_limit: limits.timeline,
            retry_budget: retry.budget,
            retry_backoff: retry.backoff,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            timeout: self.timeout,
            retry: RetryPolicy {
                budget: self.retry_budget,
                backoff: self.retry_backoff,
            },
        }
    }

    pub(crate) fn rate_limits(&self) -> RateLimits {
        RateLimits {
            login: self.login_rate_limit,
            data: self.data_rate_limit,
            timeline: self.timeline_rate_limit,
        }
    }
}

/// The production API root as a parsed URL.
pub fn default_base_url() -> Url {
    Url::parse(petcare_api::DEFAULT_BASE_URL).expect("invalid default base URL")
}
