//! In-process host for tests and local scenario runs.

use std::collections::{BTreeMap, HashSet};

use game_core::{
    EntityId, Hand, HandSlots, ItemStack, Location, ParticleCue, SoundCue, StatusEffect,
    StatusEffectKind,
};
use serde::{Deserialize, Serialize};

use super::{EntityHost, EventSource, PlatformInfo, Registration};
use crate::api::{HostError, Result};

/// Everything the in-memory host tracks about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub online: bool,
    pub alive: bool,
    pub health: f64,
    pub max_health: f64,
    pub absorption: f64,
    pub location: Location,
    pub hands: HandSlots,
    pub effects: Vec<StatusEffect>,
    pub level: u32,
}

impl PlayerRecord {
    pub const DEFAULT_MAX_HEALTH: f64 = 20.0;

    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            online: true,
            alive: true,
            health: Self::DEFAULT_MAX_HEALTH,
            max_health: Self::DEFAULT_MAX_HEALTH,
            absorption: 0.0,
            location,
            hands: HandSlots::default(),
            effects: Vec::new(),
            level: 0,
        }
    }

    #[must_use]
    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health;
        self
    }

    #[must_use]
    pub fn with_absorption(mut self, absorption: f64) -> Self {
        self.absorption = absorption;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn holding(mut self, hand: Hand, stack: ItemStack) -> Self {
        self.hands.set(hand, Some(stack));
        self
    }

    pub fn effect(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRecord {
    pub entity: EntityId,
    pub location: Location,
    pub cue: SoundCue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub location: Location,
    pub cue: ParticleCue,
}

/// [`EntityHost`] backed by plain maps.
///
/// Forced respawns are not performed inline: they are queued and the caller
/// drains them with [`InMemoryHost::take_respawn_requests`] to fire the
/// respawn event, the way a real host fires it on a later step.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    platform: PlatformInfo,
    players: BTreeMap<EntityId, PlayerRecord>,
    sounds: Vec<SoundRecord>,
    particles: Vec<ParticleRecord>,
    respawn_requests: Vec<EntityId>,
    rejected_respawns: HashSet<EntityId>,
    rejected_writes: HashSet<EntityId>,
    registrations: Vec<Registration>,
}

impl InMemoryHost {
    pub fn new(platform: PlatformInfo) -> Self {
        Self {
            platform,
            ..Self::default()
        }
    }

    pub fn add_player(&mut self, id: EntityId, record: PlayerRecord) {
        self.players.insert(id, record);
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: EntityId) -> Option<&mut PlayerRecord> {
        self.players.get_mut(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = (EntityId, &PlayerRecord)> + '_ {
        self.players.iter().map(|(id, record)| (*id, record))
    }

    pub fn disconnect(&mut self, id: EntityId) -> Result<()> {
        self.record_mut(id)?.online = false;
        Ok(())
    }

    pub fn reconnect(&mut self, id: EntityId) -> Result<()> {
        self.record_mut(id)?.online = true;
        Ok(())
    }

    /// Marks the player dead with zero health, as the host does before
    /// firing its death event.
    pub fn kill(&mut self, id: EntityId) -> Result<()> {
        let record = self.record_mut(id)?;
        record.alive = false;
        record.health = 0.0;
        record.absorption = 0.0;
        Ok(())
    }

    /// Completes a respawn at `location`: alive, full health, no effects.
    pub fn complete_respawn(&mut self, id: EntityId, location: Location) -> Result<()> {
        let record = self.record_mut(id)?;
        record.alive = true;
        record.health = record.max_health;
        record.absorption = 0.0;
        record.effects.clear();
        record.location = location;
        Ok(())
    }

    pub fn set_hand(&mut self, id: EntityId, hand: Hand, stack: Option<ItemStack>) -> Result<()> {
        self.record_mut(id)?.hands.set(hand, stack);
        Ok(())
    }

    /// Makes every subsequent forced respawn for `id` fail.
    pub fn reject_respawns_for(&mut self, id: EntityId) {
        self.rejected_respawns.insert(id);
    }

    /// Makes every subsequent hand, health and effect write for `id` fail
    /// through the [`EntityHost`] seam. The inherent setters are unaffected.
    pub fn reject_writes_for(&mut self, id: EntityId) {
        self.rejected_writes.insert(id);
    }

    pub fn accept_writes_for(&mut self, id: EntityId) {
        self.rejected_writes.remove(&id);
    }

    pub fn take_respawn_requests(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.respawn_requests)
    }

    pub fn respawn_requests(&self) -> &[EntityId] {
        &self.respawn_requests
    }

    pub fn sounds(&self) -> &[SoundRecord] {
        &self.sounds
    }

    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    fn record_mut(&mut self, id: EntityId) -> Result<&mut PlayerRecord> {
        self.players.get_mut(&id).ok_or(HostError::UnknownEntity(id))
    }

    fn writable(&mut self, id: EntityId, operation: &'static str) -> Result<&mut PlayerRecord> {
        if self.rejected_writes.contains(&id) {
            return Err(HostError::WriteRejected {
                entity: id,
                operation,
            });
        }
        self.record_mut(id)
    }
}

impl EntityHost for InMemoryHost {
    fn platform(&self) -> PlatformInfo {
        self.platform.clone()
    }

    fn is_online(&self, entity: EntityId) -> bool {
        self.players.get(&entity).is_some_and(|p| p.online)
    }

    fn display_name(&self, entity: EntityId) -> String {
        self.players
            .get(&entity)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| entity.to_string())
    }

    fn location(&self, entity: EntityId) -> Option<Location> {
        self.players.get(&entity).map(|p| p.location.clone())
    }

    fn item_in_hand(&self, entity: EntityId, hand: Hand) -> Option<ItemStack> {
        self.players.get(&entity).and_then(|p| p.hands.get(hand))
    }

    fn set_item_in_hand(
        &mut self,
        entity: EntityId,
        hand: Hand,
        stack: Option<ItemStack>,
    ) -> Result<()> {
        self.writable(entity, "set item in hand")?.hands.set(hand, stack);
        Ok(())
    }

    fn set_health(&mut self, entity: EntityId, health: f64) -> Result<()> {
        let record = self.writable(entity, "set health")?;
        record.health = health.clamp(0.0, record.max_health);
        Ok(())
    }

    fn remove_effect(&mut self, entity: EntityId, kind: StatusEffectKind) -> Result<()> {
        self.writable(entity, "remove effect")?
            .effects
            .retain(|effect| effect.kind != kind);
        Ok(())
    }

    fn add_effect(&mut self, entity: EntityId, effect: StatusEffect) -> Result<()> {
        let record = self.writable(entity, "add effect")?;
        record.effects.retain(|existing| existing.kind != effect.kind);
        record.effects.push(effect);
        Ok(())
    }

    fn play_sound(&mut self, entity: EntityId, at: &Location, cue: SoundCue) -> Result<()> {
        if !self.is_online(entity) {
            return Err(HostError::EntityOffline(entity));
        }
        self.sounds.push(SoundRecord {
            entity,
            location: at.clone(),
            cue,
        });
        Ok(())
    }

    fn spawn_particles(&mut self, at: &Location, cue: ParticleCue) -> Result<()> {
        self.particles.push(ParticleRecord {
            location: at.clone(),
            cue,
        });
        Ok(())
    }

    fn force_respawn(&mut self, entity: EntityId) -> Result<()> {
        if !self.platform.forced_respawn {
            return Err(HostError::Unsupported("forced respawn"));
        }
        let record = self
            .players
            .get(&entity)
            .ok_or(HostError::UnknownEntity(entity))?;
        if !record.online {
            return Err(HostError::EntityOffline(entity));
        }
        if self.rejected_respawns.contains(&entity) {
            return Err(HostError::RespawnRejected(format!(
                "respawn refused for {}",
                record.name
            )));
        }
        if record.alive {
            return Err(HostError::RespawnRejected(format!(
                "{} is not dead",
                record.name
            )));
        }
        self.respawn_requests.push(entity);
        Ok(())
    }
}

impl EventSource for InMemoryHost {
    fn register(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }
}
