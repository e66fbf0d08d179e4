// Mutable per-client session state.
//
// One `Session` lives inside each `PetcareClient` and is never handed out
// by value. The token and ETag cache are lock-free; rate-limit windows are
// tiny critical sections guarding a single `Instant`.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use secrecy::SecretString;
use tokio::time::Instant;
use tracing::trace;
use uuid::Uuid;

/// Rate-limit window measured from the last *successful* completion of an
/// operation class. A window that never succeeded is always open.
#[derive(Debug)]
pub struct RateWindow {
    period: Duration,
    last_success: Mutex<Option<Instant>>,
}

impl RateWindow {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_success: Mutex::new(None),
        }
    }

    /// The configured window length.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// `true` while the last success is younger than the window.
    pub fn is_throttled(&self) -> bool {
        self.last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|at| at.elapsed() < self.period)
    }

    /// Record a successful completion now.
    pub fn mark_success(&self) {
        *self
            .last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Forget the last success so the next call goes to the network.
    pub fn reset(&self) {
        *self
            .last_success
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Rate-limit periods for the three operation classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub login: Duration,
    pub data: Duration,
    pub timeline: Duration,
}

impl Default for RateLimits {
    fn default() -> Self {
        let period = Duration::from_secs(300);
        Self {
            login: period,
            data: period,
            timeline: period,
        }
    }
}

/// Session state owned by a single client.
#[derive(Debug)]
pub struct Session {
    device_id: String,
    token: ArcSwapOption<SecretString>,
    etags: DashMap<String, String>,
    login: RateWindow,
    data: RateWindow,
    timeline: RateWindow,
}

impl Session {
    /// Create a session with a freshly generated device identifier.
    pub fn new(limits: RateLimits) -> Self {
        Self {
            device_id: Uuid::new_v4().to_string(),
            token: ArcSwapOption::empty(),
            etags: DashMap::new(),
            login: RateWindow::new(limits.login),
            data: RateWindow::new(limits.data),
            timeline: RateWindow::new(limits.timeline),
        }
    }

    /// Stable identifier sent as `X-Device-Id` and in the login body.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    // ── Token ────────────────────────────────────────────────────────

    pub fn token(&self) -> Option<Arc<SecretString>> {
        self.token.load_full()
    }

    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    pub(crate) fn set_token(&self, token: SecretString) {
        trace!("storing bearer token");
        self.token.store(Some(Arc::new(token)));
    }

    pub(crate) fn clear_token(&self) {
        if self.token.swap(None).is_some() {
            trace!("bearer token invalidated");
        }
    }

    /// Clear the token only if it is still the one a rejected request
    /// carried. A token renewed since then is kept.
    pub(crate) fn invalidate_token(&self, sent: Option<&Arc<SecretString>>) {
        let Some(sent) = sent else {
            return;
        };
        let expected = Some(Arc::clone(sent));
        let previous = self.token.compare_and_swap(&expected, None::<Arc<SecretString>>);
        if (*previous).as_ref().is_some_and(|p| Arc::ptr_eq(p, sent)) {
            trace!("bearer token invalidated");
        }
    }

    /// Whether the held token differs from `stale` (another caller has
    /// logged in since `stale` was read).
    pub(crate) fn token_renewed_since(&self, stale: Option<&Arc<SecretString>>) -> bool {
        let current = self.token.load();
        match ((*current).as_ref(), stale) {
            (Some(current), Some(stale)) => !Arc::ptr_eq(current, stale),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    // ── ETag cache ───────────────────────────────────────────────────

    /// Cached ETag for a resource URL.
    pub fn etag(&self, resource: &str) -> Option<String> {
        self.etags.get(resource).map(|e| e.value().clone())
    }

    pub(crate) fn store_etag(&self, resource: &str, etag: &str) {
        let etag = etag.trim().trim_matches('"');
        trace!(resource, etag, "caching etag");
        self.etags.insert(resource.to_owned(), etag.to_owned());
    }

    // ── Rate-limit windows ───────────────────────────────────────────

    pub fn login_window(&self) -> &RateWindow {
        &self.login
    }

    pub fn data_window(&self) -> &RateWindow {
        &self.data
    }

    pub fn timeline_window(&self) -> &RateWindow {
        &self.timeline
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_window_is_open() {
        let window = RateWindow::new(Duration::from_secs(300));
        assert!(!window.is_throttled());
    }

    #[tokio::test(start_paused = true)]
    async fn window_closes_after_success_and_reopens_after_period() {
        let window = RateWindow::new(Duration::from_secs(300));
        window.mark_success();
        assert!(window.is_throttled());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(window.is_throttled());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!window.is_throttled());
    }

    #[test]
    fn zero_period_never_throttles() {
        let window = RateWindow::new(Duration::ZERO);
        window.mark_success();
        assert!(!window.is_throttled());
    }

    #[test]
    fn reset_reopens_window() {
        let window = RateWindow::new(Duration::from_secs(300));
        window.mark_success();
        window.reset();
        assert!(!window.is_throttled());
    }

    #[test]
    fn invalidation_keeps_a_renewed_token() {
        let session = Session::new(RateLimits::default());
        session.set_token(SecretString::from("old".to_string()));
        let sent = session.token();

        session.set_token(SecretString::from("new".to_string()));
        assert!(session.token_renewed_since(sent.as_ref()));
        session.invalidate_token(sent.as_ref());
        assert!(session.has_token());

        let current = session.token();
        assert!(!session.token_renewed_since(current.as_ref()));
        session.invalidate_token(current.as_ref());
        assert!(!session.has_token());
    }

    #[test]
    fn etag_quotes_are_stripped_and_scoped_per_resource() {
        let session = Session::new(RateLimits::default());
        session.store_etag("https://x/a", "\"111\"");
        session.store_etag("https://x/b", "222");
        assert_eq!(session.etag("https://x/a").as_deref(), Some("111"));
        assert_eq!(session.etag("https://x/b").as_deref(), Some("222"));

        session.store_etag("https://x/a", "\"333\"");
        assert_eq!(session.etag("https://x/a").as_deref(), Some("333"));
        assert_eq!(session.etag("https://x/b").as_deref(), Some("222"));
    }

    #[test]
    fn token_set_and_clear() {
        let session = Session::new(RateLimits::default());
        assert!(!session.has_token());
        session.set_token(SecretString::from("t".to_string()));
        assert!(session.has_token());
        session.clear_token();
        assert!(session.token().is_none());
    }

    #[test]
    fn device_id_is_stable() {
        let session = Session::new(RateLimits::default());
        assert_eq!(session.device_id(), session.device_id());
        assert!(Uuid::parse_str(session.device_id()).is_ok());
    }
}
