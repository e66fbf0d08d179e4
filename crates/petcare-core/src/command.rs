// ── Flap control and pet details ──
//
// Mutations go straight to the API (one PUT per call, no retry beyond the
// fetcher's own 401/timeout recovery). Hosts observe the applied state
// through a forced snapshot refresh afterwards.

use petcare_api::Method;
use petcare_api::models::{ControlData, Envelope, LockRequest};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::Petcare;
use crate::error::CoreError;
use crate::model::LockState;

impl Petcare {
    /// Request a lock mode for a flap.
    ///
    /// Returns the full response only when the service echoes the requested
    /// mode back. `Ok(None)` covers both "no result" and "accepted but a
    /// different mode reported"; callers should force a refresh either way.
    pub async fn set_lock_mode(
        &self,
        flap_id: i64,
        mode: LockState,
    ) -> Result<Option<Value>, CoreError> {
        if !mode.is_settable() {
            return Err(CoreError::ValidationFailed {
                message: format!("lock mode {mode} cannot be requested"),
            });
        }
        if self.snapshot().is_some() && !self.flaps().iter().any(|f| f.id == flap_id) {
            return Err(CoreError::DeviceNotFound {
                identifier: flap_id.to_string(),
            });
        }

        let url = self.inner.api.control_url(flap_id)?;
        let body = serde_json::to_value(LockRequest {
            locking: mode.code(),
        })
        .map_err(|e| CoreError::Internal(e.to_string()))?;
        debug!(flap_id, %mode, "requesting lock mode");

        let Some(response) = self.inner.api.fetch(Method::PUT, &url, Some(&body)).await? else {
            warn!(flap_id, %mode, "lock request returned no result");
            return Ok(None);
        };

        let reported = serde_json::from_value::<Envelope<ControlData>>(response.clone())
            .ok()
            .and_then(|e| e.data.locking);

        if reported == Some(mode.code()) {
            info!(flap_id, %mode, "lock mode applied");
            Ok(Some(response))
        } else {
            warn!(flap_id, requested = mode.code(), ?reported, "lock mode not confirmed");
            Ok(None)
        }
    }

    /// Request a lock mode, then force a snapshot refresh so the flap's new
    /// state is visible. Returns whether the service confirmed the mode; a
    /// failed follow-up refresh is logged and leaves the cache as it was.
    pub async fn lock(&self, flap_id: i64, mode: LockState) -> Result<bool, CoreError> {
        let confirmed = self.set_lock_mode(flap_id, mode).await?.is_some();
        if let Err(e) = self.refresh_device_data(true).await {
            warn!(flap_id, error = %e, "refresh after lock command failed");
        }
        Ok(confirmed)
    }

    /// Full pet records (photo, breed, conditions, tag, food type, species,
    /// position, status) as returned by the service.
    pub async fn pet_details(&self) -> Result<Option<Value>, CoreError> {
        let url = self.inner.api.pet_url()?;
        let response = self.inner.api.fetch(Method::GET, &url, None).await?;
        Ok(response.and_then(|mut r| r.get_mut("data").map(Value::take)))
    }
}
