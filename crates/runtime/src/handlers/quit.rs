//! Handler that forgets departing entities.

use tracing::debug;

use super::{EventHandler, HandlerContext};
use crate::events::{QuitEvent, RevivalEvent};

/// Drops the pending save and cooldown of an entity that disconnects, so
/// the tables only ever hold connected entities. Safe to run any number of
/// times for the same entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuitHandler;

impl EventHandler for QuitHandler {
    type Event = QuitEvent;

    fn name(&self) -> &'static str {
        "quit_cleanup"
    }

    fn handle(&self, event: &mut QuitEvent, ctx: &mut HandlerContext<'_>) {
        let entity = event.entity;
        let (removed_pending, removed_cooldown) = ctx.state.forget(entity);

        if removed_pending || removed_cooldown {
            debug!(
                target: "totem::quit",
                %entity,
                removed_pending,
                removed_cooldown,
                "cleaned up revival state on quit"
            );
            ctx.events.publish(RevivalEvent::Forgotten { entity });
        }
    }
}
