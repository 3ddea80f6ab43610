//! Audio and visual cues the host can play at a location.

use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sound {
    ItemTotemUse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Particle {
    TotemOfUndying,
}

/// A sound played to an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoundCue {
    pub sound: Sound,
    pub volume: f32,
    pub pitch: f32,
}

impl SoundCue {
    pub const fn new(sound: Sound, volume: f32, pitch: f32) -> Self {
        Self {
            sound,
            volume,
            pitch,
        }
    }
}

/// A burst of particles spawned around a location.
///
/// `height` lifts the burst above the entity's feet; `offset` is the random
/// spread on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticleCue {
    pub particle: Particle,
    pub count: u32,
    pub offset: [f64; 3],
    pub speed: f64,
    pub height: f64,
}

impl ParticleCue {
    pub const fn new(particle: Particle, count: u32, offset: [f64; 3], speed: f64) -> Self {
        Self {
            particle,
            count,
            offset,
            speed,
            height: 0.0,
        }
    }

    #[must_use]
    pub const fn raised(mut self, height: f64) -> Self {
        self.height = height;
        self
    }
}
