// ── Derived entity records ──
//
// Projected from the `me/start` snapshot. Core fields are typed; the
// open-ended per-kind extras live in `attributes`.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::kinds::{LockState, Location, ProductId};

/// Auxiliary per-entity fields, keyed by the names in [`attr`].
pub type Attributes = BTreeMap<String, Value>;

/// Attribute keys.
pub mod attr {
    pub const FIRMWARE: &str = "firmware";
    pub const LOCK: &str = "lock";
    pub const VOLTAGE: &str = "voltage";
    pub const VOLTAGE_PER_BATTERY: &str = "voltage_per_battery";
    pub const BATTERY: &str = "battery";
    pub const SIGNAL: &str = "signal";
    pub const CONTROL: &str = "control";
    pub const SINCE: &str = "since";
    pub const ENTERED: &str = "entered";
    pub const LEFT: &str = "left";
    pub const LOOKED_THROUGH: &str = "looked_through";
    pub const EVENT: &str = "event";

    /// Keys written by the timeline reconciler rather than the projection.
    pub const TIMELINE: [&str; 4] = [ENTERED, LEFT, LOOKED_THROUGH, EVENT];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hub {
    pub id: i64,
    pub household_id: i64,
    pub name: String,
    pub led_mode: Option<i64>,
    pub available: bool,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flap {
    pub id: i64,
    pub household_id: i64,
    pub name: String,
    pub product: ProductId,
    pub lock: LockState,
    pub available: bool,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pet {
    pub id: i64,
    pub tag_id: Option<i64>,
    pub household_id: i64,
    pub name: String,
    pub location: Location,
    pub available: bool,
    pub attributes: Attributes,
}

/// Any entity, as returned by a lookup across all three collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Device {
    Hub(Hub),
    Flap(Flap),
    Pet(Pet),
}

impl Device {
    pub fn id(&self) -> i64 {
        match self {
            Self::Hub(h) => h.id,
            Self::Flap(f) => f.id,
            Self::Pet(p) => p.id,
        }
    }

    pub fn household_id(&self) -> i64 {
        match self {
            Self::Hub(h) => h.household_id,
            Self::Flap(f) => f.household_id,
            Self::Pet(p) => p.household_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Hub(h) => &h.name,
            Self::Flap(f) => &f.name,
            Self::Pet(p) => &p.name,
        }
    }

    pub fn product(&self) -> ProductId {
        match self {
            Self::Hub(_) => ProductId::Hub,
            Self::Flap(f) => f.product,
            Self::Pet(_) => ProductId::Pet,
        }
    }

    /// Current state as a display string: LED mode for hubs, lock-mode
    /// name for flaps, location name for pets.
    pub fn state(&self) -> String {
        match self {
            Self::Hub(h) => h.led_mode.map(|m| m.to_string()).unwrap_or_default(),
            Self::Flap(f) => f.lock.display_name().to_owned(),
            Self::Pet(p) => p.location.display_name().to_owned(),
        }
    }

    pub fn available(&self) -> bool {
        match self {
            Self::Hub(h) => h.available,
            Self::Flap(f) => f.available,
            Self::Pet(p) => p.available,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Hub(h) => &h.attributes,
            Self::Flap(f) => &f.attributes,
            Self::Pet(p) => &p.attributes,
        }
    }
}
