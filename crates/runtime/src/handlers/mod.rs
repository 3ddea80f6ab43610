//! Handlers for the host lifecycle events.
//!
//! Each handler observes one event kind and runs one stage of the revival:
//!
//! ```text
//! damage  ─► LethalDamageWatcher   records a pending save
//! death   ─► DeathInterceptor      consumes the item, suppresses loss,
//!                                  schedules ForceRespawn
//! respawn ─► RespawnFinalizer      restores the death location,
//!                                  schedules ApplyRevival
//! quit    ─► QuitHandler           drops everything tracked for the entity
//! ```
//!
//! Handlers never return errors. The host's dispatcher ignores return values,
//! so every failure is logged, the pending save is dropped where the stage
//! cannot continue, and the host carries on.

mod damage;
mod death;
mod quit;
mod respawn;

pub use damage::LethalDamageWatcher;
pub use death::DeathInterceptor;
pub use quit::QuitHandler;
pub use respawn::RespawnFinalizer;

use game_core::EntityId;

use crate::config::RevivalConfig;
use crate::events::{AbortReason, EventBus, EventPriority, HostEvent, RevivalEvent};
use crate::host::{Clock, EntityHost, Registration};
use crate::scheduler::Scheduler;
use crate::state::RevivalState;

/// Everything a handler may read or mutate while processing one event or
/// one deferred task.
pub struct HandlerContext<'a> {
    /// Revival tables owned by the service
    pub state: &'a mut RevivalState,
    pub host: &'a mut dyn EntityHost,
    pub scheduler: &'a mut dyn Scheduler,
    pub config: &'a RevivalConfig,
    pub clock: &'a dyn Clock,
    /// Outcome notifications
    pub events: &'a EventBus,
}

/// Observer of one host event kind.
pub trait EventHandler: Send + Sync {
    type Event: HostEvent;

    /// Returns the handler name for logging and registration.
    fn name(&self) -> &'static str;

    /// Host ordering slot for this handler.
    fn priority(&self) -> EventPriority {
        EventPriority::Normal
    }

    /// Whether the host should skip this handler for cancelled events.
    fn ignore_cancelled(&self) -> bool {
        false
    }

    fn handle(&self, event: &mut Self::Event, ctx: &mut HandlerContext<'_>);

    fn registration(&self) -> Registration {
        Registration {
            event: <Self::Event as HostEvent>::KIND,
            handler: self.name(),
            priority: self.priority(),
            ignore_cancelled: self.ignore_cancelled(),
        }
    }
}

/// Ends a pending save that cannot continue and reports why.
fn abort(ctx: &mut HandlerContext<'_>, entity: EntityId, reason: AbortReason) {
    ctx.state.clear_pending(entity);
    ctx.events.publish(RevivalEvent::RevivalAborted { entity, reason });
}
