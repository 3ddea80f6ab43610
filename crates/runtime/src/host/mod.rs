//! Seam between the revival service and the game server hosting it.
//!
//! The service never reaches into the host directly. Everything it reads or
//! mutates goes through [`EntityHost`]; time comes from a [`Clock`]; and the
//! service announces which events it wants through an [`EventSource`]. Host
//! adapters implement these traits, and [`InMemoryHost`] implements them for
//! tests and the scenario server.
mod clock;
mod memory;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::{InMemoryHost, ParticleRecord, PlayerRecord, SoundRecord};

use game_core::{
    EntityId, Hand, HandSlots, ItemStack, Location, ParticleCue, SoundCue, StatusEffect,
    StatusEffectKind,
};
use serde::{Deserialize, Serialize};

use crate::api::Result;
use crate::events::{EventKind, EventPriority};

/// What the host reports about itself at service start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub name: String,
    pub version: String,
    /// Whether the platform can skip the death screen and respawn a dead
    /// entity on request.
    pub forced_respawn: bool,
}

impl PlatformInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            forced_respawn: true,
        }
    }

    #[must_use]
    pub fn without_forced_respawn(mut self) -> Self {
        self.forced_respawn = false;
        self
    }
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self::new("in-memory", env!("CARGO_PKG_VERSION"))
    }
}

/// Entity query and mutation API exposed by the host.
///
/// Queries return `None` for entities the host does not know. Mutations
/// report failures as [`HostError`](crate::api::HostError); callers decide
/// whether a failure aborts the revival or is only logged.
pub trait EntityHost {
    fn platform(&self) -> PlatformInfo;

    fn is_online(&self, entity: EntityId) -> bool;

    /// Name used in log lines.
    fn display_name(&self, entity: EntityId) -> String {
        entity.to_string()
    }

    /// Current location of the entity, as an independent snapshot.
    fn location(&self, entity: EntityId) -> Option<Location>;

    fn item_in_hand(&self, entity: EntityId, hand: Hand) -> Option<ItemStack>;

    /// Replaces the content of a hand slot; `None` empties it.
    fn set_item_in_hand(
        &mut self,
        entity: EntityId,
        hand: Hand,
        stack: Option<ItemStack>,
    ) -> Result<()>;

    fn set_health(&mut self, entity: EntityId, health: f64) -> Result<()>;

    fn remove_effect(&mut self, entity: EntityId, kind: StatusEffectKind) -> Result<()>;

    fn add_effect(&mut self, entity: EntityId, effect: StatusEffect) -> Result<()>;

    fn play_sound(&mut self, entity: EntityId, at: &Location, cue: SoundCue) -> Result<()>;

    fn spawn_particles(&mut self, at: &Location, cue: ParticleCue) -> Result<()>;

    /// Respawns a dead entity immediately, bypassing the death screen.
    ///
    /// The host is expected to fire its respawn event as a result.
    fn force_respawn(&mut self, entity: EntityId) -> Result<()>;

    /// Both hand slots in one read.
    fn hands(&self, entity: EntityId) -> HandSlots {
        HandSlots {
            main_hand: self.item_in_hand(entity, Hand::MainHand),
            off_hand: self.item_in_hand(entity, Hand::OffHand),
        }
    }
}

/// A request to observe one host event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub event: EventKind,
    pub handler: &'static str,
    pub priority: EventPriority,
    /// Skip delivery when an earlier observer cancelled the event.
    pub ignore_cancelled: bool,
}

/// Host-side registry the service subscribes its handlers with.
pub trait EventSource {
    fn register(&mut self, registration: Registration);
}
