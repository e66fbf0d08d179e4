// ── Petcare client facade ──
//
// Owns the API client, the published entity store and the serialization
// domains for snapshot and timeline refreshes. Cheap to clone; every clone
// shares the same session and state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use petcare_api::{Credentials, Method, PetcareClient};

use crate::config::PetcareConfig;
use crate::convert;
use crate::error::CoreError;
use crate::model::{Device, Flap, Hub, Pet};
use crate::store::EntityStore;

/// The main entry point for hosts.
///
/// Call [`login()`](Self::login), then
/// [`refresh_device_data()`](Self::refresh_device_data), then read
/// [`hubs()`](Self::hubs) / [`flaps()`](Self::flaps) / [`pets()`](Self::pets).
#[derive(Clone)]
pub struct Petcare {
    pub(crate) inner: Arc<PetcareInner>,
}

pub(crate) struct PetcareInner {
    config: PetcareConfig,
    pub(crate) api: PetcareClient,
    pub(crate) store: EntityStore,
    data_lock: Mutex<()>,
    pub(crate) timeline_lock: Mutex<()>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Petcare {
    /// Build a client from configuration. Does not touch the network.
    pub fn new(config: PetcareConfig) -> Result<Self, CoreError> {
        let credentials = Credentials {
            email: config.auth.email.clone(),
            password: config.auth.password.clone(),
        };
        let api = PetcareClient::new(
            config.base_url.clone(),
            credentials,
            &config.transport(),
            config.rate_limits(),
        )?;

        Ok(Self {
            inner: Arc::new(PetcareInner {
                config,
                api,
                store: EntityStore::new(),
                data_lock: Mutex::new(()),
                timeline_lock: Mutex::new(()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the client configuration.
    pub fn config(&self) -> &PetcareConfig {
        &self.inner.config
    }

    /// Access the underlying API client.
    pub fn api(&self) -> &PetcareClient {
        &self.inner.api
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in unless a recent token is still held.
    ///
    /// Returns `Ok(false)` when the service refused the credentials.
    pub async fn login(&self) -> Result<bool, CoreError> {
        Ok(self.inner.api.login(false).await?)
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Fetch `me/start` and rebuild hubs, flaps and pets, then run a
    /// timeline pass.
    ///
    /// Inside the data window (and without `force`) the cached snapshot is
    /// returned as-is, with no request. If the service returns no result,
    /// cached collections are left untouched and
    /// [`CoreError::Unavailable`] is returned.
    pub async fn refresh_device_data(&self, force: bool) -> Result<Arc<Value>, CoreError> {
        let _guard = self.inner.data_lock.lock().await;
        let window = self.inner.api.session().data_window();

        if !force && window.is_throttled() {
            if let Some(raw) = self.inner.store.raw() {
                trace!("snapshot within rate-limit window, serving cache");
                return Ok(raw);
            }
        }

        let url = self.inner.api.me_start_url()?;
        let Some(body) = self.inner.api.fetch(Method::GET, &url, None).await? else {
            warn!(%url, "snapshot fetch returned no result, keeping cached data");
            return Err(CoreError::Unavailable {
                resource: url.to_string(),
            });
        };

        let raw = Arc::new(body);
        let projection = convert::project(&raw)?;
        info!(
            hubs = projection.hubs.len(),
            flaps = projection.flaps.len(),
            pets = projection.pets.len(),
            "device snapshot refreshed"
        );
        self.inner.store.apply_snapshot(Arc::clone(&raw), projection);
        window.mark_success();

        if let Err(e) = self.refresh_timeline(false).await {
            warn!(error = %e, "timeline refresh failed");
        }

        Ok(raw)
    }

    /// The last raw `me/start` payload, if any refresh succeeded.
    pub fn snapshot(&self) -> Option<Arc<Value>> {
        self.inner.store.raw()
    }

    /// When the published collections were last rebuilt.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.store.last_refresh()
    }

    pub fn hubs(&self) -> Arc<Vec<Hub>> {
        self.inner.store.hubs()
    }

    pub fn flaps(&self) -> Arc<Vec<Flap>> {
        self.inner.store.flaps()
    }

    pub fn pets(&self) -> Arc<Vec<Pet>> {
        self.inner.store.pets()
    }

    /// Look up an entity by id across hubs, flaps and pets (in that order).
    pub fn device(&self, id: i64) -> Option<Device> {
        self.inner.store.device(id)
    }

    // ── Background polling ───────────────────────────────────────────

    /// Spawn a task that calls `refresh_device_data(false)` every `period`
    /// until [`shutdown()`](Self::shutdown).
    pub async fn spawn_polling(&self, period: Duration) {
        let this = self.clone();
        let cancel = self.inner.cancel.child_token();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        debug!("poll tick");
                        if let Err(e) = this.refresh_device_data(false).await {
                            warn!(error = %e, transient = e.is_transient(), "background refresh failed");
                        }
                    }
                }
            }
            debug!("polling task stopped");
        });

        self.inner.task_handles.lock().await.push(handle);
    }

    /// Stop background polling and wait for the tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("petcare client shut down");
    }
}
