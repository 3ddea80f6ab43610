//! Host lifecycle events and revival outcome notifications.
//!
//! [`types`] holds the payloads the host delivers to the handlers; [`bus`]
//! broadcasts what the handlers decided so tooling and tests can follow a
//! revival without scraping logs.

mod bus;
mod types;

pub use bus::{AbortReason, EventBus, RevivalEvent};
pub use types::{
    DamageEvent, DeathEvent, EntityKind, EventKind, EventPriority, HostEvent, QuitEvent,
    RespawnEvent,
};
