//! Death-handling service that makes totem revivals survive lag.
//!
//! A revival is split across the host's event pipeline instead of being
//! resolved inside one damage event:
//!
//! 1. lethal damage while holding the qualifying item records a pending save
//! 2. the death event consumes the item, suppresses the death consequences
//!    and schedules a forced respawn
//! 3. the respawn event puts the entity back where it died and schedules the
//!    revival effects
//!
//! Modules are organized by responsibility:
//! - [`guard`] hosts the service and its builder
//! - [`handlers`] implements the individual stages
//! - [`host`] defines the seam to the game server, plus an in-memory host
//! - [`events`] holds host event payloads and the outcome bus
//! - [`state`] and [`scheduler`] keep per-entity tables and deferred work
pub mod api;
pub mod config;
pub mod events;
pub mod guard;
pub mod handlers;
pub mod host;
pub mod scheduler;
pub mod state;

pub use api::{HostError, Result};
pub use config::RevivalConfig;
pub use events::{
    AbortReason, DamageEvent, DeathEvent, EntityKind, EventBus, EventKind, EventPriority,
    HostEvent, QuitEvent, RespawnEvent, RevivalEvent,
};
pub use guard::{TotemGuard, TotemGuardBuilder};
pub use handlers::{
    DeathInterceptor, EventHandler, HandlerContext, LethalDamageWatcher, QuitHandler,
    RespawnFinalizer,
};
pub use host::{
    Clock, EntityHost, EventSource, InMemoryHost, ManualClock, ParticleRecord, PlatformInfo,
    PlayerRecord, Registration, SoundRecord, SystemClock,
};
pub use scheduler::{DeferredTask, Scheduler, TickScheduler};
pub use state::{CooldownEntry, PendingSave, RevivalState, SaveId};
