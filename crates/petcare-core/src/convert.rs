// ── Snapshot projection ──
//
// Turns the raw `me/start` payload into hub, flap and pet records. A
// record that does not fit its expected shape is skipped with a warning;
// it never aborts the projection of its siblings.

use serde_json::{Value, json};
use tracing::{trace, warn};

use petcare_api::models::{RawDevice, RawPet};

use crate::error::CoreError;
use crate::model::{Attributes, Flap, Hub, LockState, Location, Pet, ProductId, attr};

pub const BATTERY_VOLTAGE_FULL: f64 = 1.6;
pub const BATTERY_VOLTAGE_LOW: f64 = 1.25;
/// Flaps run on four cells; the service reports their summed voltage.
pub const BATTERY_CELLS: f64 = 4.0;

/// Battery charge estimate from a single cell's voltage.
///
/// Capped at 100 but deliberately not floored: a cell below
/// [`BATTERY_VOLTAGE_LOW`] yields a negative value.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn battery_percent(voltage_per_cell: f64) -> i64 {
    let pct = (voltage_per_cell - BATTERY_VOLTAGE_LOW)
        / (BATTERY_VOLTAGE_FULL - BATTERY_VOLTAGE_LOW)
        * 100.0;
    (pct.round() as i64).min(100)
}

/// Entity collections projected from one snapshot.
#[derive(Debug, Default)]
pub struct Projection {
    pub hubs: Vec<Hub>,
    pub flaps: Vec<Flap>,
    pub pets: Vec<Pet>,
}

/// Project a raw `me/start` payload.
///
/// Fails only if the payload has no `data` object at all; missing
/// `devices` or `pets` arrays project as empty.
pub fn project(raw: &Value) -> Result<Projection, CoreError> {
    let data = raw
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| CoreError::MalformedResponse {
            message: "snapshot has no `data` object".into(),
        })?;

    let mut projection = Projection::default();

    for entry in array(data, "devices") {
        let device: RawDevice = match serde_json::from_value(entry.clone()) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "skipping malformed device record");
                continue;
            }
        };
        match ProductId::from_code(device.product_id) {
            Some(ProductId::Hub) => projection.hubs.push(hub_from_raw(device)),
            Some(product) if product.is_flap() => {
                if let Some(flap) = flap_from_raw(device, product) {
                    projection.flaps.push(flap);
                }
            }
            _ => trace!(id = device.id, product_id = device.product_id, "ignoring device kind"),
        }
    }

    for entry in array(data, "pets") {
        match serde_json::from_value::<RawPet>(entry.clone()) {
            Ok(pet) => projection.pets.push(pet_from_raw(pet)),
            Err(e) => warn!(error = %e, "skipping malformed pet record"),
        }
    }

    Ok(projection)
}

/// Distinct household ids of the snapshot's devices, in first-seen order.
pub fn household_ids(raw: &Value) -> Vec<i64> {
    let mut ids = Vec::new();
    let Some(data) = raw.get("data") else {
        return ids;
    };
    for id in array(data, "devices").filter_map(|d| d.get("household_id").and_then(Value::as_i64)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn array<'a>(data: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter())
        .into_iter()
        .flatten()
}

fn hub_from_raw(device: RawDevice) -> Hub {
    let status = device.status;
    let mut attributes = Attributes::new();
    if let Some(firmware) = status
        .version
        .and_then(|v| v.device)
        .and_then(|d| d.firmware)
    {
        attributes.insert(attr::FIRMWARE.into(), firmware);
    }

    Hub {
        id: device.id,
        household_id: device.household_id,
        name: device.name.unwrap_or_default(),
        led_mode: status.led_mode,
        available: status.online.unwrap_or(false),
        attributes,
    }
}

fn flap_from_raw(device: RawDevice, product: ProductId) -> Option<Flap> {
    let control = device.control;
    let Some(lock) = control
        .as_ref()
        .and_then(|c| c.locking)
        .and_then(LockState::from_code)
    else {
        warn!(id = device.id, "skipping flap without a recognizable lock mode");
        return None;
    };

    let status = device.status;
    let mut attributes = Attributes::new();
    attributes.insert(attr::LOCK.into(), json!(lock.display_name()));

    if let Some(voltage) = status.battery {
        let per_cell = voltage / BATTERY_CELLS;
        attributes.insert(attr::VOLTAGE.into(), json!(voltage));
        attributes.insert(attr::VOLTAGE_PER_BATTERY.into(), json!(per_cell));
        attributes.insert(attr::BATTERY.into(), json!(battery_percent(per_cell)));
    }

    if let Some(rssi) = status.signal.and_then(|s| s.device_rssi) {
        attributes.insert(attr::SIGNAL.into(), json!(rssi));
    }

    let curfew = control
        .and_then(|c| c.curfew)
        .map(|c| c.to_string())
        .unwrap_or_default();
    attributes.insert(attr::CONTROL.into(), Value::String(curfew));

    Some(Flap {
        id: device.id,
        household_id: device.household_id,
        name: device.name.unwrap_or_default(),
        product,
        lock,
        available: status.online.unwrap_or(false),
        attributes,
    })
}

fn pet_from_raw(pet: RawPet) -> Pet {
    let where_code = pet.position.as_ref().and_then(|p| p.location);
    let mut attributes = Attributes::new();
    if let Some(since) = pet.position.and_then(|p| p.since) {
        attributes.insert(attr::SINCE.into(), Value::String(since));
    }

    Pet {
        id: pet.id,
        tag_id: pet.tag_id,
        household_id: pet.household_id,
        name: pet.name.unwrap_or_default(),
        location: where_code.map_or(Location::Unknown, Location::from_code),
        available: where_code.is_some(),
        attributes,
    }
}
