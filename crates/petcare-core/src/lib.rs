//! Cached device, flap and pet state for the Sure Petcare cloud API.
//!
//! - **[`Petcare`]**: Client facade. [`login()`](Petcare::login) obtains a
//!   token, [`refresh_device_data()`](Petcare::refresh_device_data) fetches
//!   the `me/start` snapshot (rate-limited) and projects it into hubs,
//!   flaps and pets, then runs a timeline pass that adds first-seen
//!   entry/exit and lock-change facts to their attributes.
//!
//! - **Commands**: [`set_lock_mode()`](Petcare::set_lock_mode) changes a
//!   flap's lock mode and reports whether the service confirmed it;
//!   [`lock()`](Petcare::lock) also refreshes afterwards.
//!
//! - **Domain model** ([`model`]): [`Hub`], [`Flap`], [`Pet`] records with
//!   typed state plus an attribute map, and the wire-coded enums
//!   [`LockState`], [`Location`], [`ProductId`], [`EventKind`].

pub mod client;
mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
mod store;
mod timeline;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::Petcare;
pub use config::{AuthCredentials, PetcareConfig};
pub use error::CoreError;
pub use model::{
    Attributes, Device, EventKind, Flap, Hub, LockState, Location, Pet, ProductId, attr,
};
