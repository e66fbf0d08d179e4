// ── Domain model ──

pub mod entity;
pub mod kinds;

pub use entity::{Attributes, Device, Flap, Hub, Pet, attr};
pub use kinds::{EventKind, LockState, Location, ProductId};
