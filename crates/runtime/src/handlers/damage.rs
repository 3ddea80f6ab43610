//! Handler that arms a revival when lethal damage meets a qualifying item.

use tracing::{debug, info, trace, warn};

use super::{EventHandler, HandlerContext};
use crate::events::{DamageEvent, EntityKind, EventPriority, RevivalEvent};

/// Watches finalized damage and records a pending save.
///
/// Purely advisory: it never touches the inventory and never cancels the
/// event. The item may be gone by the time the entity actually dies, which
/// is why the death stage validates again.
///
/// # Ordering
///
/// Registered at `Monitor` with `ignore_cancelled`, so it sees post-mitigation
/// damage and only damage that will actually be applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct LethalDamageWatcher;

impl EventHandler for LethalDamageWatcher {
    type Event = DamageEvent;

    fn name(&self) -> &'static str {
        "lethal_damage_watcher"
    }

    fn priority(&self) -> EventPriority {
        EventPriority::Monitor
    }

    fn ignore_cancelled(&self) -> bool {
        true
    }

    fn handle(&self, event: &mut DamageEvent, ctx: &mut HandlerContext<'_>) {
        if event.kind != EntityKind::Player {
            return;
        }
        let entity = event.entity;

        // Cooldown suppresses detection entirely, lethal or not.
        if ctx.state.is_on_cooldown(entity, ctx.clock.now()) {
            trace!(target: "totem::watcher", %entity, "on revival cooldown, ignoring damage");
            return;
        }

        if !event.is_lethal() {
            return;
        }

        let hands = ctx.host.hands(entity).holding(ctx.config.qualifying_item);
        let Some(first_hand) = hands.preferred() else {
            return;
        };

        if ctx.state.has_pending(entity) {
            debug!(target: "totem::watcher", %entity, "revival already pending");
            return;
        }

        let Some(location) = ctx.host.location(entity) else {
            warn!(
                target: "totem::watcher",
                %entity,
                "lethal damage with qualifying item but host reported no location"
            );
            return;
        };

        if let Some(save) = ctx.state.begin_save(entity, location.clone(), hands) {
            info!(
                target: "totem::watcher",
                %entity,
                %save,
                projected_health = event.projected_health(),
                "Detected lethal damage for {}. Item found initially in {}. Preparing for death interception.",
                ctx.host.display_name(entity),
                first_hand
            );
            ctx.events.publish(RevivalEvent::LethalDamageDetected {
                entity,
                hands,
                location,
            });
        }
    }
}
