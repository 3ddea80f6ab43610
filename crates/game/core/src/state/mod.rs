//! Value types describing entities as the host reports them.
//!
//! Nothing in this module talks to the host; these are plain snapshots that
//! the runtime reads from and writes back through its host seam.
pub mod types;

pub use types::{
    EntityId, Hand, HandFlags, HandSlots, ItemKind, ItemStack, Location, StatusEffect,
    StatusEffectKind, Tick, Timestamp,
};
