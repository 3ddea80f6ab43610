//! Handler for player death.

use game_core::{EntityId, Hand, ItemKind};
use tracing::{debug, error, info, warn};

use super::{EventHandler, HandlerContext, abort};
use crate::api::Result;
use crate::events::{AbortReason, DeathEvent, EventPriority, RevivalEvent};
use crate::host::EntityHost;
use crate::scheduler::DeferredTask;
use crate::state::SaveId;

/// Intercepts the death of an entity with a pending save.
///
/// At the moment of death the hands are read again: the item may have been
/// moved, dropped or consumed since the damage was observed. The offhand is
/// checked first, then the main hand. One unit is removed from the first hand
/// that qualifies; if neither does, the save is dropped and the death
/// proceeds untouched.
///
/// On success the default death consequences are suppressed and a forced
/// respawn is scheduled for the next step.
///
/// Registered at `Highest` so it runs before observers that act on drops
/// (graves, loggers) and sees the event before they do.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeathInterceptor;

impl EventHandler for DeathInterceptor {
    type Event = DeathEvent;

    fn name(&self) -> &'static str {
        "death_interceptor"
    }

    fn priority(&self) -> EventPriority {
        EventPriority::Highest
    }

    fn handle(&self, event: &mut DeathEvent, ctx: &mut HandlerContext<'_>) {
        let entity = event.entity;
        let Some(save) = ctx.state.pending(entity).map(|entry| entry.id) else {
            return;
        };
        let name = ctx.host.display_name(entity);

        let hand = match consume_one(&mut *ctx.host, entity, ctx.config.qualifying_item) {
            Ok(Some(hand)) => hand,
            Ok(None) => {
                warn!(
                    target: "totem::interceptor",
                    %entity,
                    %save,
                    "Aborting revival for {}. No qualifying item in either hand at the moment of death, despite one being detected earlier. Death proceeds normally.",
                    name
                );
                abort(ctx, entity, AbortReason::NoItemAtDeath);
                return;
            }
            Err(error) => {
                error!(
                    target: "totem::interceptor",
                    %entity,
                    %save,
                    error = %error,
                    "Aborting revival for {}: could not write back consumed item",
                    name
                );
                abort(ctx, entity, AbortReason::ConsumeFailed);
                return;
            }
        };

        info!(
            target: "totem::interceptor",
            %entity,
            %save,
            "Consumed qualifying item from {} for {}. Proceeding with revival.",
            hand,
            name
        );

        event.suppress_consequences();
        ctx.events.publish(RevivalEvent::ItemConsumed { entity, hand });

        let task = DeferredTask::ForceRespawn { entity, save };
        if let Err(error) = ctx.scheduler.schedule(ctx.config.respawn_delay, task) {
            error!(
                target: "totem::interceptor",
                %entity,
                %save,
                error = %error,
                "Failed to schedule forced respawn for {}",
                name
            );
            abort(ctx, entity, AbortReason::ScheduleFailed);
        }
    }
}

impl DeathInterceptor {
    /// Body of [`DeferredTask::ForceRespawn`].
    ///
    /// Runs a step after the death event. Does nothing if the save it was
    /// scheduled for is gone; drops the save if the entity went offline or
    /// the host refuses the respawn. A refused respawn is not retried.
    pub fn force_respawn(&self, entity: EntityId, save: SaveId, ctx: &mut HandlerContext<'_>) {
        if !ctx.state.is_current(entity, save) {
            debug!(target: "totem::interceptor", %entity, %save, "stale forced respawn skipped");
            return;
        }

        if !ctx.host.is_online(entity) {
            debug!(
                target: "totem::interceptor",
                %entity,
                %save,
                "entity went offline before forced respawn, clearing pending save"
            );
            abort(ctx, entity, AbortReason::Disconnected);
            return;
        }

        match ctx.host.force_respawn(entity) {
            Ok(()) => {
                debug!(target: "totem::interceptor", %entity, %save, "forced respawn requested");
                ctx.events.publish(RevivalEvent::RespawnForced { entity });
            }
            Err(error) => {
                error!(
                    target: "totem::interceptor",
                    %entity,
                    %save,
                    error = %error,
                    "Failed to force respawn for {}",
                    ctx.host.display_name(entity)
                );
                abort(ctx, entity, AbortReason::RespawnFailed);
            }
        }
    }
}

/// Removes one unit of `kind` from the first qualifying hand.
///
/// Explicit read-modify-write: read the slot, compute the remaining stack,
/// write back the replacement or an empty slot.
fn consume_one(host: &mut dyn EntityHost, entity: EntityId, kind: ItemKind) -> Result<Option<Hand>> {
    for hand in Hand::CONSUMPTION_ORDER {
        if let Some(stack) = host.item_in_hand(entity, hand)
            && stack.is(kind)
        {
            host.set_item_in_hand(entity, hand, stack.decremented())?;
            return Ok(Some(hand));
        }
    }
    Ok(None)
}
