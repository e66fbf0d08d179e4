// ── Wire-coded enumerations ──
//
// Each enum maps to the integer the service sends and, separately, to the
// display name hosts show. The two never share a representation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Product (device kind) identifiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductId {
    /// Not sent by the service; used to tag pet entities.
    Pet,
    Hub,
    Repeater,
    PetFlap,
    Feeder,
    Programmer,
    CatFlap,
}

impl ProductId {
    pub const fn code(self) -> i64 {
        match self {
            Self::Pet => 0,
            Self::Hub => 1,
            Self::Repeater => 2,
            Self::PetFlap => 3,
            Self::Feeder => 4,
            Self::Programmer => 5,
            Self::CatFlap => 6,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pet),
            1 => Some(Self::Hub),
            2 => Some(Self::Repeater),
            3 => Some(Self::PetFlap),
            4 => Some(Self::Feeder),
            5 => Some(Self::Programmer),
            6 => Some(Self::CatFlap),
            _ => None,
        }
    }

    /// Cat and pet flaps carry a lock mode.
    pub const fn is_flap(self) -> bool {
        matches!(self, Self::CatFlap | Self::PetFlap)
    }
}

/// Lock mode of a flap.
///
/// Only the first four are accepted by the control endpoint; the curfew
/// variants are reported by the service but cannot be requested.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum LockState {
    Unlocked,
    LockedIn,
    LockedOut,
    LockedAll,
    Curfew,
    CurfewLocked,
    CurfewUnlocked,
    CurfewUnknown,
}

impl LockState {
    pub const fn code(self) -> i64 {
        match self {
            Self::Unlocked => 0,
            Self::LockedIn => 1,
            Self::LockedOut => 2,
            Self::LockedAll => 3,
            Self::Curfew => 4,
            Self::CurfewLocked => -1,
            Self::CurfewUnlocked => -2,
            Self::CurfewUnknown => -3,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unlocked),
            1 => Some(Self::LockedIn),
            2 => Some(Self::LockedOut),
            3 => Some(Self::LockedAll),
            4 => Some(Self::Curfew),
            -1 => Some(Self::CurfewLocked),
            -2 => Some(Self::CurfewUnlocked),
            -3 => Some(Self::CurfewUnknown),
            _ => None,
        }
    }

    /// Display name, e.g. `"LOCKED_OUT"`.
    pub fn display_name(self) -> &'static str {
        self.into()
    }

    /// Whether the control endpoint accepts this mode.
    pub const fn is_settable(self) -> bool {
        matches!(
            self,
            Self::Unlocked | Self::LockedIn | Self::LockedOut | Self::LockedAll
        )
    }
}

/// Which side of the flap a pet was last seen on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Location {
    Inside,
    Outside,
    Unknown,
}

impl Location {
    pub const fn code(self) -> i64 {
        match self {
            Self::Inside => 1,
            Self::Outside => 2,
            Self::Unknown => -1,
        }
    }

    /// Unrecognized codes map to [`Location::Unknown`].
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Inside,
            2 => Self::Outside,
            _ => Self::Unknown,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.into()
    }
}

/// Timeline event types. Only [`Move`](Self::Move) and
/// [`LockStatus`](Self::LockStatus) feed entity attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Move,
    BatteryWarning,
    LockStatus,
    MoveUid,
    UserInfo,
    UserNew,
    Curfew,
    Other(i64),
}

impl From<i64> for EventKind {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Move,
            1 => Self::BatteryWarning,
            6 => Self::LockStatus,
            7 => Self::MoveUid,
            12 => Self::UserInfo,
            17 => Self::UserNew,
            20 => Self::Curfew,
            other => Self::Other(other),
        }
    }
}
