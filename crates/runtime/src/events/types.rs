//! Host lifecycle events delivered to the revival handlers.
//!
//! Payloads mirror what the host hands to its observers. Death and respawn
//! events are mutable: handlers edit them in place and the host reads the
//! result once every observer has returned.

use std::fmt;

use game_core::{EntityId, ItemStack, Location};
use serde::{Deserialize, Serialize};

/// The four host event kinds the service observes.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Damage,
    Death,
    Respawn,
    Quit,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Damage => "damage",
            EventKind::Death => "death",
            EventKind::Respawn => "respawn",
            EventKind::Quit => "quit",
        };
        write!(f, "{}", label)
    }
}

/// Host-side ordering slot for an observer.
///
/// Observers run from `Lowest` to `Highest`; `Monitor` runs last and is meant
/// for observers that only read the final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventPriority {
    Lowest,
    Low,
    Normal,
    High,
    Highest,
    Monitor,
}

/// Common surface of the host event payloads.
pub trait HostEvent {
    const KIND: EventKind;

    /// Entity the event is about.
    fn entity(&self) -> EntityId;

    /// Whether another observer already cancelled the event.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Category of the damaged entity. Only players are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Creature,
    Other,
}

/// Damage about to be applied to an entity.
///
/// `final_damage` is the post-mitigation amount. `health` and `absorption`
/// are the entity's values before this damage lands.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageEvent {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub final_damage: f64,
    pub health: f64,
    pub absorption: f64,
    pub cancelled: bool,
}

impl DamageEvent {
    pub fn player(entity: EntityId, final_damage: f64, health: f64, absorption: f64) -> Self {
        Self {
            entity,
            kind: EntityKind::Player,
            final_damage,
            health,
            absorption,
            cancelled: false,
        }
    }

    /// Health left after this damage, counting the absorption buffer.
    pub fn projected_health(&self) -> f64 {
        self.health + self.absorption - self.final_damage
    }

    pub fn is_lethal(&self) -> bool {
        self.projected_health() <= 0.0
    }
}

impl HostEvent for DamageEvent {
    const KIND: EventKind = EventKind::Damage;

    fn entity(&self) -> EntityId {
        self.entity
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A player died. Every field except `entity` may be rewritten by observers.
#[derive(Debug, Clone, PartialEq)]
pub struct DeathEvent {
    pub entity: EntityId,
    pub drops: Vec<ItemStack>,
    pub keep_inventory: bool,
    pub keep_level: bool,
    pub dropped_exp: u32,
    pub death_message: Option<String>,
}

impl DeathEvent {
    pub fn new(entity: EntityId, drops: Vec<ItemStack>, dropped_exp: u32) -> Self {
        Self {
            entity,
            drops,
            keep_inventory: false,
            keep_level: false,
            dropped_exp,
            death_message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.death_message = Some(message.into());
        self
    }

    /// Suppresses every default death consequence: item and experience loss,
    /// dropped experience, the drop list and the broadcast message.
    pub fn suppress_consequences(&mut self) {
        self.keep_inventory = true;
        self.keep_level = true;
        self.dropped_exp = 0;
        self.drops.clear();
        self.death_message = None;
    }
}

impl HostEvent for DeathEvent {
    const KIND: EventKind = EventKind::Death;

    fn entity(&self) -> EntityId {
        self.entity
    }
}

/// A player is respawning; `respawn_location` is where the host will place them.
#[derive(Debug, Clone, PartialEq)]
pub struct RespawnEvent {
    pub entity: EntityId,
    pub respawn_location: Location,
}

impl RespawnEvent {
    pub fn new(entity: EntityId, respawn_location: Location) -> Self {
        Self {
            entity,
            respawn_location,
        }
    }
}

impl HostEvent for RespawnEvent {
    const KIND: EventKind = EventKind::Respawn;

    fn entity(&self) -> EntityId {
        self.entity
    }
}

/// A player disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitEvent {
    pub entity: EntityId,
}

impl QuitEvent {
    pub fn new(entity: EntityId) -> Self {
        Self { entity }
    }
}

impl HostEvent for QuitEvent {
    const KIND: EventKind = EventKind::Quit;

    fn entity(&self) -> EntityId {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::ItemKind;

    #[test]
    fn projected_health_counts_absorption() {
        let event = DamageEvent::player(EntityId(1), 5.0, 2.0, 0.0);
        assert_eq!(event.projected_health(), -3.0);
        assert!(event.is_lethal());

        let shielded = DamageEvent::player(EntityId(1), 5.0, 2.0, 4.0);
        assert_eq!(shielded.projected_health(), 1.0);
        assert!(!shielded.is_lethal());
    }

    #[test]
    fn exactly_zero_is_lethal() {
        let event = DamageEvent::player(EntityId(1), 6.0, 4.0, 2.0);
        assert!(event.is_lethal());
    }

    #[test]
    fn suppress_clears_all_consequences() {
        let mut event = DeathEvent::new(
            EntityId(7),
            vec![ItemStack::new(ItemKind::Bread, 12)],
            42,
        )
        .with_message("Steve fell from a high place");

        event.suppress_consequences();

        assert!(event.keep_inventory);
        assert!(event.keep_level);
        assert_eq!(event.dropped_exp, 0);
        assert!(event.drops.is_empty());
        assert_eq!(event.death_message, None);
    }
}
