//! Broadcast bus for revival outcomes.

use std::fmt;

use game_core::{EntityId, Hand, HandFlags, Location};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why a revival attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    /// Neither hand held the qualifying item when the death event fired.
    NoItemAtDeath,
    /// The host refused the write-back of the decremented stack.
    ConsumeFailed,
    /// A deferred task could not be scheduled.
    ScheduleFailed,
    /// The host failed to force the respawn.
    RespawnFailed,
    /// The entity went offline before a deferred task ran.
    Disconnected,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AbortReason::NoItemAtDeath => "no qualifying item at death",
            AbortReason::ConsumeFailed => "consumption write-back failed",
            AbortReason::ScheduleFailed => "deferred task could not be scheduled",
            AbortReason::RespawnFailed => "forced respawn failed",
            AbortReason::Disconnected => "entity disconnected",
        };
        write!(f, "{}", label)
    }
}

/// Outcome notifications published as a revival progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RevivalEvent {
    /// Lethal damage observed while holding the qualifying item.
    LethalDamageDetected {
        entity: EntityId,
        hands: HandFlags,
        location: Location,
    },

    /// One unit was removed from `hand` at the moment of death.
    ItemConsumed { entity: EntityId, hand: Hand },

    /// The forced respawn was requested from the host.
    RespawnForced { entity: EntityId },

    /// Revival finished: effects applied and cooldown started.
    Revived { entity: EntityId, location: Location },

    /// The attempt was dropped and its pending entry deleted.
    RevivalAborted { entity: EntityId, reason: AbortReason },

    /// Quit cleanup removed tracked state for the entity.
    Forgotten { entity: EntityId },
}

impl RevivalEvent {
    pub fn entity(&self) -> EntityId {
        match self {
            RevivalEvent::LethalDamageDetected { entity, .. }
            | RevivalEvent::ItemConsumed { entity, .. }
            | RevivalEvent::RespawnForced { entity }
            | RevivalEvent::Revived { entity, .. }
            | RevivalEvent::RevivalAborted { entity, .. }
            | RevivalEvent::Forgotten { entity } => *entity,
        }
    }
}

/// Broadcast bus for [`RevivalEvent`]s.
///
/// Publishing is fire-and-forget: with no subscribers the event is dropped,
/// and slow subscribers observe `Lagged` rather than blocking the handlers.
pub struct EventBus {
    sender: broadcast::Sender<RevivalEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Creates a new event bus with the given channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: RevivalEvent) {
        if self.sender.send(event).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!("No subscribers for revival events");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevivalEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.publish(RevivalEvent::RespawnForced {
            entity: EntityId(1),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_receive_in_order() {
        let bus = EventBus::with_capacity(4);
        let mut rx = bus.subscribe();

        bus.publish(RevivalEvent::ItemConsumed {
            entity: EntityId(3),
            hand: Hand::OffHand,
        });
        bus.publish(RevivalEvent::RespawnForced {
            entity: EntityId(3),
        });

        assert!(matches!(
            rx.try_recv(),
            Ok(RevivalEvent::ItemConsumed {
                hand: Hand::OffHand,
                ..
            })
        ));
        assert_eq!(rx.try_recv().map(|e| e.entity()), Ok(EntityId(3)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn outcomes_serialize_with_variant_tags() {
        let event = RevivalEvent::RevivalAborted {
            entity: EntityId(5),
            reason: AbortReason::ScheduleFailed,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "RevivalAborted": { "entity": 5, "reason": "ScheduleFailed" } })
        );
    }
}
