// Wire-format types for the Sure Petcare API.
//
// Every response is wrapped as `{ "data": ... }`. Fields the service may
// omit are `Option`s; the projection in `petcare-core` decides what a
// missing field means for each entity kind.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic `{ "data": T }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

// ── Authentication ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email_address: &'a str,
    pub password: &'a str,
    pub device_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: Option<String>,
}

// ── me/start snapshot ───────────────────────────────────────────────

/// One entry of `data.devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    pub id: i64,
    pub household_id: i64,
    pub product_id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub status: RawDeviceStatus,
    pub control: Option<RawControl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeviceStatus {
    pub led_mode: Option<i64>,
    pub online: Option<bool>,
    /// Sum of the four cell voltages.
    pub battery: Option<f64>,
    pub signal: Option<RawSignal>,
    pub version: Option<RawVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSignal {
    pub device_rssi: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVersion {
    pub device: Option<RawFirmware>,
}

/// Firmware is reported as a number by some hubs and a string by others.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFirmware {
    pub firmware: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawControl {
    pub locking: Option<i64>,
    pub curfew: Option<Value>,
}

/// One entry of `data.pets`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPet {
    pub id: i64,
    pub household_id: i64,
    pub name: Option<String>,
    pub tag_id: Option<i64>,
    pub position: Option<RawPosition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    #[serde(rename = "where")]
    pub location: Option<i64>,
    pub since: Option<String>,
}

// ── Timeline ────────────────────────────────────────────────────────

/// One entry of a household timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEvent {
    #[serde(rename = "type")]
    pub kind: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub devices: Option<Vec<EventDevice>>,
    pub tags: Option<Vec<EventTag>>,
    pub movements: Option<Vec<EventMovement>>,
    pub users: Option<Vec<EventUser>>,
    /// JSON document encoded as a string, e.g. `"{\"mode\":1}"`.
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDevice {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventTag {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMovement {
    pub direction: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventUser {
    pub name: Option<String>,
}

/// Payload embedded in a `LOCK_ST` event's `data` string.
#[derive(Debug, Clone, Deserialize)]
pub struct LockEventData {
    pub mode: i64,
}

// ── Device control ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LockRequest {
    pub locking: i64,
}

#[derive(Debug, Deserialize)]
pub struct ControlData {
    pub locking: Option<i64>,
}
