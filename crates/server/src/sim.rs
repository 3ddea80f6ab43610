//! Host pipeline around the revival service.
//!
//! [`Simulation`] plays the game server: it owns the players, applies damage,
//! resolves deaths and respawns, runs the scheduler, and delivers each
//! lifecycle event to the [`TotemGuard`] at the point a real server would.

use std::collections::BTreeMap;
use std::time::Duration;

use game_core::{EntityId, Hand, HandSlots, ItemKind, ItemStack, Location, StatusEffect};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use totem_runtime::{
    Clock, DamageEvent, DeathEvent, EntityHost, EventBus, InMemoryHost, ManualClock,
    PlayerRecord, QuitEvent, RespawnEvent, Result, RevivalConfig, RevivalEvent, TickScheduler,
    TotemGuard,
};

use crate::scenario::{Scenario, Step};

/// Wall time covered by one tick.
pub const TICK_DURATION: Duration = Duration::from_millis(50);

/// Experience dropped per level on a normal death, capped like the host does.
const EXP_PER_LEVEL: u32 = 7;
const MAX_DROPPED_EXP: u32 = 100;

#[derive(Debug, Clone)]
struct PlayerMeta {
    bed: Option<Location>,
    ghost: bool,
}

/// A death the host resolved, with what the service left of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathRecord {
    pub entity: EntityId,
    pub tick: u64,
    pub message: Option<String>,
    pub drops: Vec<ItemStack>,
    pub dropped_exp: u32,
    pub kept_inventory: bool,
}

/// The host's own totem resolution saved a player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSave {
    pub entity: EntityId,
    pub tick: u64,
    pub hand: Hand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReport {
    pub id: EntityId,
    pub name: String,
    pub online: bool,
    pub alive: bool,
    pub health: f64,
    pub location: Location,
    pub hands: HandSlots,
    pub effects: Vec<StatusEffect>,
    pub level: u32,
    pub pending_save: bool,
    pub on_cooldown: bool,
}

/// Final state of a run, printed as JSON by the binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub scenario: String,
    pub ticks: u64,
    pub players: Vec<PlayerReport>,
    pub deaths: Vec<DeathRecord>,
    pub host_saves: Vec<HostSave>,
    pub outcomes: Vec<RevivalEvent>,
}

pub struct Simulation {
    name: String,
    guard: TotemGuard,
    host: InMemoryHost,
    scheduler: TickScheduler,
    clock: ManualClock,
    outcomes: broadcast::Receiver<RevivalEvent>,
    collected: Vec<RevivalEvent>,
    meta: BTreeMap<EntityId, PlayerMeta>,
    spawn: Location,
    deaths: Vec<DeathRecord>,
    host_saves: Vec<HostSave>,
}

impl Simulation {
    /// Sets up the host, registers and starts the service.
    ///
    /// The scenario's own revival config wins over `fallback`.
    pub fn new(scenario: &Scenario, fallback: RevivalConfig, events: EventBus) -> Self {
        let config = scenario.config.clone().unwrap_or(fallback);
        let clock = ManualClock::default();
        let outcomes = events.subscribe();

        let mut host = InMemoryHost::new(scenario.platform.clone());
        let mut meta = BTreeMap::new();
        for spec in &scenario.players {
            let id = EntityId(spec.id);
            let mut record = PlayerRecord::new(spec.name.clone(), spec.location.clone())
                .with_health(spec.health)
                .with_absorption(spec.absorption)
                .with_level(spec.level);
            record.hands = HandSlots {
                main_hand: spec.main_hand,
                off_hand: spec.off_hand,
            };
            host.add_player(id, record);
            meta.insert(
                id,
                PlayerMeta {
                    bed: spec.bed.clone(),
                    ghost: spec.ghost,
                },
            );
        }

        let mut guard = TotemGuard::builder()
            .config(config)
            .clock(clock.clone())
            .events(events)
            .build();
        guard.register(&mut host);
        guard.start(&host);

        info!(
            scenario = %scenario.name,
            players = scenario.players.len(),
            steps = scenario.steps.len(),
            "Scenario loaded"
        );

        Self {
            name: scenario.name.clone(),
            guard,
            host,
            scheduler: TickScheduler::new(),
            clock,
            outcomes,
            collected: Vec::new(),
            meta,
            spawn: scenario.spawn.clone(),
            deaths: Vec::new(),
            host_saves: Vec::new(),
        }
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        debug!(?step, tick = self.scheduler.now().0, "applying step");
        match step {
            Step::Damage {
                player,
                amount,
                cancelled,
            } => self.damage(EntityId(*player), *amount, *cancelled)?,
            Step::SetHand { player, hand, item } => {
                self.host.set_hand(EntityId(*player), *hand, *item)?;
            }
            Step::Tick(count) => {
                for _ in 0..*count {
                    self.tick()?;
                }
            }
            Step::Respawn { player } => self.manual_respawn(EntityId(*player))?,
            Step::Quit { player } => self.quit(EntityId(*player))?,
            Step::Join { player } => {
                self.host.reconnect(EntityId(*player))?;
                info!(entity = %EntityId(*player), "player joined");
            }
            Step::AdvanceClock(millis) => self.clock.advance(Duration::from_millis(*millis)),
        }
        self.drain_outcomes();
        Ok(())
    }

    /// One server step: clock, due tasks, then respawn events for any
    /// respawns those tasks forced. Outcomes are collected every step so a
    /// long `Tick(n)` cannot outrun the bus capacity.
    pub fn tick(&mut self) -> Result<()> {
        self.clock.advance(TICK_DURATION);
        for task in self.scheduler.advance() {
            self.guard
                .run_task(task, &mut self.host, &mut self.scheduler);
        }
        for entity in self.host.take_respawn_requests() {
            self.respawn(entity)?;
        }
        self.drain_outcomes();
        Ok(())
    }

    pub fn host(&self) -> &InMemoryHost {
        &self.host
    }

    pub fn guard(&self) -> &TotemGuard {
        &self.guard
    }

    /// Stops the service and produces the report.
    pub fn finish(mut self) -> Report {
        self.drain_outcomes();

        let now = self.clock.now();
        let players = self
            .host
            .players()
            .map(|(id, record)| PlayerReport {
                id,
                name: record.name.clone(),
                online: record.online,
                alive: record.alive,
                health: record.health,
                location: record.location.clone(),
                hands: record.hands,
                effects: record.effects.clone(),
                level: record.level,
                pending_save: self.guard.state().has_pending(id),
                on_cooldown: self.guard.state().is_on_cooldown(id, now),
            })
            .collect();

        let report = Report {
            scenario: self.name.clone(),
            ticks: self.scheduler.now().0,
            players,
            deaths: std::mem::take(&mut self.deaths),
            host_saves: std::mem::take(&mut self.host_saves),
            outcomes: std::mem::take(&mut self.collected),
        };

        self.guard.stop();
        report
    }

    fn damage(&mut self, entity: EntityId, amount: f64, cancelled: bool) -> Result<()> {
        let Some(record) = self.host.player(entity) else {
            return Ok(());
        };
        if !record.online || !record.alive {
            debug!(%entity, "damage to offline or dead player skipped");
            return Ok(());
        }

        let mut event = DamageEvent::player(entity, amount, record.health, record.absorption);
        event.cancelled = cancelled;
        self.guard
            .on_entity_damage(&mut event, &mut self.host, &mut self.scheduler);
        if event.cancelled {
            return Ok(());
        }

        let Some(record) = self.host.player_mut(entity) else {
            return Ok(());
        };
        let absorbed = record.absorption.min(event.final_damage);
        record.absorption -= absorbed;
        record.health -= event.final_damage - absorbed;

        if record.health <= 0.0 {
            self.resolve_lethal(entity)?;
        }
        Ok(())
    }

    /// The host's own totem check, then death.
    fn resolve_lethal(&mut self, entity: EntityId) -> Result<()> {
        let ghost = self.meta.get(&entity).is_some_and(|meta| meta.ghost);
        if !ghost
            && let Some(hand) = self
                .host
                .hands(entity)
                .holding(ItemKind::TotemOfUndying)
                .preferred()
        {
            return self.host_totem(entity, hand);
        }

        self.die(entity)
    }

    fn host_totem(&mut self, entity: EntityId, hand: Hand) -> Result<()> {
        let remaining = self
            .host
            .item_in_hand(entity, hand)
            .and_then(ItemStack::decremented);
        self.host.set_item_in_hand(entity, hand, remaining)?;
        self.host.set_health(entity, 1.0)?;
        if let Some(record) = self.host.player_mut(entity) {
            record.effects.clear();
        }

        let config = self.guard.config().clone();
        for effect in &config.effects {
            self.host.add_effect(entity, *effect)?;
        }
        if let Some(at) = self.host.location(entity) {
            self.host.play_sound(entity, &at, config.sound)?;
            let burst = at.offset(0.0, config.particles.height, 0.0);
            self.host.spawn_particles(&burst, config.particles)?;
        }

        info!(%entity, %hand, "host totem saved player");
        self.host_saves.push(HostSave {
            entity,
            tick: self.scheduler.now().0,
            hand,
        });
        Ok(())
    }

    fn die(&mut self, entity: EntityId) -> Result<()> {
        self.host.kill(entity)?;
        let name = self.host.display_name(entity);
        let hands = self.host.hands(entity);
        let level = self.host.player(entity).map_or(0, |record| record.level);

        let drops = [hands.main_hand, hands.off_hand]
            .into_iter()
            .flatten()
            .collect();
        let exp = level.saturating_mul(EXP_PER_LEVEL).min(MAX_DROPPED_EXP);
        let mut event = DeathEvent::new(entity, drops, exp).with_message(format!("{name} died"));

        self.guard
            .on_player_death(&mut event, &mut self.host, &mut self.scheduler);

        if !event.keep_inventory {
            self.host.set_hand(entity, Hand::MainHand, None)?;
            self.host.set_hand(entity, Hand::OffHand, None)?;
        }
        if !event.keep_level
            && let Some(record) = self.host.player_mut(entity)
        {
            record.level = 0;
        }
        if let Some(message) = &event.death_message {
            info!(%entity, "{}", message);
        }

        self.deaths.push(DeathRecord {
            entity,
            tick: self.scheduler.now().0,
            message: event.death_message,
            drops: event.drops,
            dropped_exp: event.dropped_exp,
            kept_inventory: event.keep_inventory,
        });
        Ok(())
    }

    fn manual_respawn(&mut self, entity: EntityId) -> Result<()> {
        match self.host.player(entity) {
            Some(record) if record.online && !record.alive => self.respawn(entity),
            _ => {
                warn!(%entity, "respawn requested for a player that is not on the death screen");
                Ok(())
            }
        }
    }

    fn respawn(&mut self, entity: EntityId) -> Result<()> {
        let default = self
            .meta
            .get(&entity)
            .and_then(|meta| meta.bed.clone())
            .unwrap_or_else(|| self.spawn.clone());

        let mut event = RespawnEvent::new(entity, default);
        self.guard
            .on_player_respawn(&mut event, &mut self.host, &mut self.scheduler);

        debug!(%entity, location = %event.respawn_location, "player respawned");
        self.host.complete_respawn(entity, event.respawn_location)
    }

    fn quit(&mut self, entity: EntityId) -> Result<()> {
        self.host.disconnect(entity)?;
        let mut event = QuitEvent::new(entity);
        self.guard
            .on_player_quit(&mut event, &mut self.host, &mut self.scheduler);
        info!(%entity, "player quit");
        Ok(())
    }

    fn drain_outcomes(&mut self) {
        loop {
            match self.outcomes.try_recv() {
                Ok(event) => self.collected.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "outcome receiver lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
