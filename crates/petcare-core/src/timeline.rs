// ── Timeline reconciliation ──
//
// Enriches pet and flap attributes with facts from each household's event
// log. Events are folded in the order the service returns them and every
// attribute is write-once, so the first matching event wins.

use petcare_api::Method;
use petcare_api::models::{LockEventData, TimelineEvent};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::client::Petcare;
use crate::convert::household_ids;
use crate::error::CoreError;
use crate::model::{EventKind, Flap, LockState, Pet, attr};

/// Events of one household timeline that parsed cleanly.
#[derive(Debug, Default)]
pub(crate) struct TimelineBatch {
    events: Vec<TimelineEvent>,
}

impl TimelineBatch {
    /// Parse raw event values, skipping any that do not decode.
    pub(crate) fn parse(values: &[Value]) -> Self {
        let events = values
            .iter()
            .filter_map(|v| match serde_json::from_value::<TimelineEvent>(v.clone()) {
                Ok(event) => Some(event),
                Err(e) => {
                    trace!(error = %e, "skipping undecodable timeline event");
                    None
                }
            })
            .collect();
        Self { events }
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &TimelineEvent> {
        self.events
            .iter()
            .filter(move |e| EventKind::from(e.kind) == kind)
    }
}

/// Attribute a movement direction is recorded under.
fn movement_key(direction: i64) -> Option<&'static str> {
    match direction {
        0 => Some(attr::LOOKED_THROUGH),
        1 => Some(attr::ENTERED),
        2 => Some(attr::LEFT),
        _ => None,
    }
}

/// Record first-seen entry, exit and look-through timestamps on pets.
pub(crate) fn apply_movements(batch: &TimelineBatch, pets: &mut [Pet]) -> usize {
    let mut applied = 0;
    for event in batch.of_kind(EventKind::Move) {
        if event.devices.is_none() {
            continue;
        }
        let Some(tag_id) = event.tags.as_ref().and_then(|t| t.first()).map(|t| t.id) else {
            continue;
        };
        let Some(key) = event
            .movements
            .as_ref()
            .and_then(|m| m.first())
            .and_then(|m| m.direction)
            .and_then(movement_key)
        else {
            continue;
        };
        let Some(created_at) = event.created_at.as_deref() else {
            continue;
        };

        for pet in pets.iter_mut().filter(|p| p.tag_id == Some(tag_id)) {
            if !pet.attributes.contains_key(key) {
                pet.attributes
                    .insert(key.to_owned(), Value::String(created_at.to_owned()));
                applied += 1;
            }
        }
    }
    applied
}

/// Record the first lock change seen for each flap, e.g.
/// `"locked_in by Alice at 2024-05-01T08:00:00+00:00"`.
pub(crate) fn apply_lock_changes(batch: &TimelineBatch, flaps: &mut [Flap]) -> usize {
    let mut applied = 0;
    for event in batch.of_kind(EventKind::LockStatus) {
        let Some(device_id) = event.devices.as_ref().and_then(|d| d.first()).map(|d| d.id) else {
            continue;
        };
        let Some(flap) = flaps.iter_mut().find(|f| f.id == device_id) else {
            continue;
        };
        if flap.attributes.contains_key(attr::EVENT) {
            continue;
        }
        let Some(description) = describe_lock_change(event) else {
            trace!(flap = device_id, "skipping incomplete lock event");
            continue;
        };
        flap.attributes
            .insert(attr::EVENT.to_owned(), Value::String(description));
        applied += 1;
    }
    applied
}

fn describe_lock_change(event: &TimelineEvent) -> Option<String> {
    let mode = event
        .data
        .as_deref()
        .and_then(|d| serde_json::from_str::<LockEventData>(d).ok())
        .and_then(|d| LockState::from_code(d.mode))?;
    let user = event
        .users
        .as_ref()
        .and_then(|u| u.first())
        .and_then(|u| u.name.as_deref())?;
    let at = event.updated_at.as_deref()?;
    Some(format!(
        "{} by {user} at {at}",
        mode.display_name().to_lowercase()
    ))
}

impl Petcare {
    /// Fetch every household timeline and fold its events into the
    /// current pets and flaps.
    ///
    /// Skipped inside the timeline window unless `force` is set. The window
    /// is only restarted when every household returned data.
    pub async fn refresh_timeline(&self, force: bool) -> Result<(), CoreError> {
        let _guard = self.inner.timeline_lock.lock().await;
        let window = self.inner.api.session().timeline_window();

        if !force && window.is_throttled() {
            trace!("timeline within rate-limit window, skipping");
            return Ok(());
        }

        let Some(raw) = self.inner.store.raw() else {
            debug!("no snapshot yet, nothing to reconcile");
            return Ok(());
        };

        let mut complete = true;
        for household_id in household_ids(&raw) {
            let url = self.inner.api.timeline_url(household_id)?;
            let Some(body) = self.inner.api.fetch(Method::GET, &url, None).await? else {
                warn!(household_id, "timeline fetch returned no result");
                complete = false;
                continue;
            };
            let Some(values) = body.get("data").and_then(Value::as_array) else {
                warn!(household_id, "timeline response has no event list");
                complete = false;
                continue;
            };

            let batch = TimelineBatch::parse(values);
            let applied = self.inner.store.reconcile(&batch);
            debug!(household_id, events = batch.len(), applied, "timeline reconciled");
        }

        if complete {
            window.mark_success();
        }
        Ok(())
    }
}
