//! Host-independent data types shared by the revival runtime and its tools.
//!
//! `game-core` describes entities the way a game server reports them: stable
//! identities, world locations, the two hand slots and the stacks they hold,
//! timed status effects, and audio/visual cues. It performs no I/O and holds
//! no state of its own.
pub mod feedback;
pub mod state;

pub use feedback::{Particle, ParticleCue, Sound, SoundCue};
pub use state::{
    EntityId, Hand, HandFlags, HandSlots, ItemKind, ItemStack, Location, StatusEffect,
    StatusEffectKind, Tick, Timestamp,
};
