pub mod common;
pub mod item;
pub mod status;

pub use common::{EntityId, Location, Tick, Timestamp};
pub use item::{Hand, HandFlags, HandSlots, ItemKind, ItemStack};
pub use status::{StatusEffect, StatusEffectKind};
