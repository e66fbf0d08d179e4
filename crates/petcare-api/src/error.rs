use thiserror::Error;

/// Top-level error type for the `petcare-api` crate.
///
/// Only failures the fetcher cannot absorb locally end up here. Refused
/// credentials are `Ok(false)` from
/// [`PetcareClient::login`](crate::PetcareClient::login); a rejected
/// status or an unrecoverable 401 is reported as "no result" by
/// [`PetcareClient::fetch`](crate::PetcareClient::fetch) instead, and
/// `petcare-core` maps the rest into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out and the retry budget is spent.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// HTTP client could not be built.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// The service answered with a status other than 200/201/401.
    #[error("Request rejected by upstream (HTTP {status})")]
    Rejected { status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request ran into the client timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}
