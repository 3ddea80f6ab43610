//! Timed status effects applied to entities by the host.
//!
//! Durations are tick counts relative to the moment the host applies the
//! effect; the host owns expiry.

use strum::{Display, EnumString};

use crate::state::Tick;

/// Status effects a revival applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusEffectKind {
    /// Health recovery over time.
    Regeneration,

    /// Temporary extra health that is consumed before real health.
    Absorption,

    /// Immunity to fire and lava damage.
    FireResistance,
}

/// A status effect with its duration and magnitude.
///
/// `amplifier` is zero-based: amplifier 1 is level II.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusEffectKind,
    pub duration: Tick,
    pub amplifier: u8,
}

impl StatusEffect {
    pub const fn new(kind: StatusEffectKind, duration: Tick, amplifier: u8) -> Self {
        Self {
            kind,
            duration,
            amplifier,
        }
    }

    /// Human-facing level (amplifier 0 is level 1).
    pub const fn level(&self) -> u16 {
        self.amplifier as u16 + 1
    }
}
