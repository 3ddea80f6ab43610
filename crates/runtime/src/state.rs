//! Per-entity revival bookkeeping owned by the service.
//!
//! Two independent tables keyed by [`EntityId`]:
//! - pending saves: entities whose imminent death is being tracked
//! - cooldowns: entities that were just revived and must not be re-detected
//!
//! All access is single-threaded (handlers and deferred tasks run one at a
//! time on the host's simulation thread), so plain maps suffice.

use std::collections::HashMap;
use std::fmt;

use game_core::{EntityId, HandFlags, Location, Timestamp};

/// Identifies one pending save. Deferred tasks carry the id they were
/// scheduled for so a task outliving its entry cannot act on a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveId(pub u64);

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save-{}", self.0)
    }
}

/// An entity currently believed to be mid-revival.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub id: SaveId,
    /// Where the entity stood when lethal damage was detected.
    pub death_location: Location,
    /// Hands holding the qualifying item at detection time. Diagnostic only:
    /// consumption re-reads both hands at death.
    pub initial_hands: HandFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownEntry {
    pub expires_at: Timestamp,
}

#[derive(Debug, Default)]
pub struct RevivalState {
    pending: HashMap<EntityId, PendingSave>,
    cooldowns: HashMap<EntityId, CooldownEntry>,
    next_save_id: u64,
}

impl RevivalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending save unless one already exists for `entity`.
    ///
    /// Returns the id of the new entry, or `None` if an entry was already
    /// present (the existing entry is left untouched).
    pub fn begin_save(
        &mut self,
        entity: EntityId,
        death_location: Location,
        initial_hands: HandFlags,
    ) -> Option<SaveId> {
        if self.pending.contains_key(&entity) {
            return None;
        }
        self.next_save_id += 1;
        let id = SaveId(self.next_save_id);
        self.pending.insert(
            entity,
            PendingSave {
                id,
                death_location,
                initial_hands,
            },
        );
        Some(id)
    }

    pub fn pending(&self, entity: EntityId) -> Option<&PendingSave> {
        self.pending.get(&entity)
    }

    pub fn has_pending(&self, entity: EntityId) -> bool {
        self.pending.contains_key(&entity)
    }

    /// True if `entity` still has the entry identified by `save`.
    pub fn is_current(&self, entity: EntityId, save: SaveId) -> bool {
        self.pending.get(&entity).is_some_and(|entry| entry.id == save)
    }

    pub fn clear_pending(&mut self, entity: EntityId) -> Option<PendingSave> {
        self.pending.remove(&entity)
    }

    /// True while `now` is strictly before the entity's cooldown expiry.
    pub fn is_on_cooldown(&self, entity: EntityId, now: Timestamp) -> bool {
        self.cooldowns
            .get(&entity)
            .is_some_and(|entry| now < entry.expires_at)
    }

    pub fn cooldown(&self, entity: EntityId) -> Option<CooldownEntry> {
        self.cooldowns.get(&entity).copied()
    }

    /// Inserts or overwrites the cooldown for `entity`.
    pub fn start_cooldown(&mut self, entity: EntityId, expires_at: Timestamp) {
        self.cooldowns.insert(entity, CooldownEntry { expires_at });
    }

    /// Drops everything tracked for `entity`.
    ///
    /// Returns `(removed_pending, removed_cooldown)`; calling it again for the
    /// same entity is a no-op returning `(false, false)`.
    pub fn forget(&mut self, entity: EntityId) -> (bool, bool) {
        let removed_pending = self.pending.remove(&entity).is_some();
        let removed_cooldown = self.cooldowns.remove(&entity).is_some();
        (removed_pending, removed_cooldown)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.cooldowns.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn cooldown_len(&self) -> usize {
        self.cooldowns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot() -> Location {
        Location::new("world", 1.0, 2.0, 3.0)
    }

    #[test]
    fn begin_save_keeps_first_entry() {
        let mut state = RevivalState::new();
        let entity = EntityId(1);

        let first = state.begin_save(entity, spot(), HandFlags::OFF_HAND);
        let second = state.begin_save(
            entity,
            Location::new("nether", 0.0, 0.0, 0.0),
            HandFlags::MAIN_HAND,
        );

        assert!(first.is_some());
        assert_eq!(second, None);
        let entry = state.pending(entity).unwrap();
        assert_eq!(entry.death_location, spot());
        assert_eq!(entry.initial_hands, HandFlags::OFF_HAND);
        assert_eq!(state.pending_len(), 1);
    }

    #[test]
    fn save_ids_are_not_reused() {
        let mut state = RevivalState::new();
        let entity = EntityId(4);

        let first = state.begin_save(entity, spot(), HandFlags::OFF_HAND).unwrap();
        state.clear_pending(entity);
        let second = state.begin_save(entity, spot(), HandFlags::OFF_HAND).unwrap();

        assert_ne!(first, second);
        assert!(!state.is_current(entity, first));
        assert!(state.is_current(entity, second));
    }

    #[test]
    fn cooldown_is_strictly_before_expiry() {
        let mut state = RevivalState::new();
        let entity = EntityId(2);
        state.start_cooldown(entity, Timestamp(1_500));

        assert!(state.is_on_cooldown(entity, Timestamp(1_000)));
        assert!(state.is_on_cooldown(entity, Timestamp(1_499)));
        assert!(!state.is_on_cooldown(entity, Timestamp(1_500)));
        assert!(!state.is_on_cooldown(EntityId(3), Timestamp(0)));
    }

    #[test]
    fn forget_is_idempotent() {
        let mut state = RevivalState::new();
        let entity = EntityId(5);
        state.begin_save(entity, spot(), HandFlags::MAIN_HAND);
        state.start_cooldown(entity, Timestamp(10));

        assert_eq!(state.forget(entity), (true, true));
        assert_eq!(state.forget(entity), (false, false));
        assert_eq!(state.forget(entity), (false, false));
        assert_eq!(state.pending_len(), 0);
        assert_eq!(state.cooldown_len(), 0);
    }
}
