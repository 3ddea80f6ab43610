//! Handler that completes a revival once the entity respawns.

use game_core::EntityId;
use tracing::{debug, error, info, warn};

use super::{EventHandler, HandlerContext, abort};
use crate::api::Result;
use crate::events::{AbortReason, EventPriority, RespawnEvent, RevivalEvent};
use crate::scheduler::DeferredTask;
use crate::state::SaveId;

/// Puts a revived entity back where it died and schedules the revival
/// effects.
///
/// Overriding the respawn location is what makes the revival look like a
/// regular save: without it the entity would come back at its bed or the
/// world spawn. Registered at `Highest` so later observers see the override
/// instead of replacing it unknowingly.
///
/// This stage is the only writer of cooldowns and ends the pending save on
/// the success path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespawnFinalizer;

impl EventHandler for RespawnFinalizer {
    type Event = RespawnEvent;

    fn name(&self) -> &'static str {
        "respawn_finalizer"
    }

    fn priority(&self) -> EventPriority {
        EventPriority::Highest
    }

    fn handle(&self, event: &mut RespawnEvent, ctx: &mut HandlerContext<'_>) {
        let entity = event.entity;
        let Some(entry) = ctx.state.pending(entity) else {
            return;
        };
        let save = entry.id;
        let name = ctx.host.display_name(entity);

        info!(
            target: "totem::finalizer",
            %entity,
            %save,
            location = %entry.death_location,
            "Finalizing revival for {} on respawn.",
            name
        );
        event.respawn_location = entry.death_location.clone();

        let task = DeferredTask::ApplyRevival { entity, save };
        if let Err(error) = ctx.scheduler.schedule(ctx.config.effect_delay, task) {
            error!(
                target: "totem::finalizer",
                %entity,
                %save,
                error = %error,
                "Failed to schedule revival effects for {}",
                name
            );
            abort(ctx, entity, AbortReason::ScheduleFailed);
        }
    }
}

impl RespawnFinalizer {
    /// Body of [`DeferredTask::ApplyRevival`].
    ///
    /// Host failures while applying health, effects or feedback are logged
    /// and skipped; the cooldown is still started and the save still ends.
    pub fn apply_revival(&self, entity: EntityId, save: SaveId, ctx: &mut HandlerContext<'_>) {
        if !ctx.state.is_current(entity, save) {
            debug!(target: "totem::finalizer", %entity, %save, "stale revival skipped");
            return;
        }

        if !ctx.host.is_online(entity) {
            debug!(
                target: "totem::finalizer",
                %entity,
                %save,
                "entity went offline before revival effects, clearing pending save"
            );
            abort(ctx, entity, AbortReason::Disconnected);
            return;
        }

        let config = ctx.config;
        let host = &mut *ctx.host;

        absorb(
            host.set_health(entity, config.revival_health),
            entity,
            "set health",
        );
        for effect in &config.effects {
            absorb(host.remove_effect(entity, effect.kind), entity, "remove effect");
        }
        for effect in &config.effects {
            absorb(host.add_effect(entity, *effect), entity, "add effect");
        }

        let location = host.location(entity);
        match &location {
            Some(at) => {
                absorb(host.play_sound(entity, at, config.sound), entity, "play sound");
                let burst = at.offset(0.0, config.particles.height, 0.0);
                absorb(
                    host.spawn_particles(&burst, config.particles),
                    entity,
                    "spawn particles",
                );
            }
            None => warn!(
                target: "totem::finalizer",
                %entity,
                "no location for revival feedback"
            ),
        }

        let expires_at = ctx.clock.now().saturating_add(config.cooldown);
        ctx.state.start_cooldown(entity, expires_at);
        ctx.state.clear_pending(entity);

        info!(
            target: "totem::finalizer",
            %entity,
            %save,
            cooldown_until = %expires_at,
            "{} was revived.",
            ctx.host.display_name(entity)
        );
        ctx.events.publish(RevivalEvent::Revived {
            entity,
            location: location.unwrap_or_default(),
        });
    }
}

fn absorb(result: Result<()>, entity: EntityId, step: &'static str) {
    if let Err(error) = result {
        warn!(target: "totem::finalizer", %entity, step, error = %error, "revival step failed");
    }
}
