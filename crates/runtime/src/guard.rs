//! The revival service.
//!
//! [`TotemGuard`] owns the revival tables and routes host events and due
//! deferred tasks to the handlers. The host calls one `on_*` method per
//! delivered event and [`TotemGuard::run_task`] for every task its scheduler
//! hands back.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, trace, warn};

use crate::config::RevivalConfig;
use crate::events::{
    DamageEvent, DeathEvent, EventBus, HostEvent, QuitEvent, RespawnEvent, RevivalEvent,
};
use crate::handlers::{
    DeathInterceptor, EventHandler, HandlerContext, LethalDamageWatcher, QuitHandler,
    RespawnFinalizer,
};
use crate::host::{Clock, EntityHost, EventSource, Registration, SystemClock};
use crate::scheduler::{DeferredTask, Scheduler};
use crate::state::RevivalState;

/// Revival service hosted by a game server.
///
/// Construct with [`TotemGuard::builder`], call [`start`](Self::start) once
/// the host is up and [`stop`](Self::stop) on shutdown. While stopped every
/// event and task is ignored.
pub struct TotemGuard {
    config: RevivalConfig,
    clock: Arc<dyn Clock>,
    events: EventBus,
    state: RevivalState,
    running: bool,
}

impl TotemGuard {
    pub fn builder() -> TotemGuardBuilder {
        TotemGuardBuilder::new()
    }

    /// Enables the service.
    ///
    /// Logs a warning when the platform cannot force respawns: revivals will
    /// still consume the item but the entity then sits on the death screen.
    pub fn start(&mut self, host: &dyn EntityHost) {
        let platform = host.platform();
        info!(
            target: "totem::guard",
            platform = %platform.name,
            version = %platform.version,
            cooldown_ms = self.config.cooldown.as_millis() as u64,
            "Totem guard enabled."
        );
        if !platform.forced_respawn {
            warn!(
                target: "totem::guard",
                platform = %platform.name,
                "platform does not advertise forced respawn; revivals will leave players on the death screen"
            );
        }
        self.running = true;
    }

    /// Disables the service and drops every pending save and cooldown.
    pub fn stop(&mut self) {
        let pending = self.state.pending_len();
        let cooldowns = self.state.cooldown_len();
        self.state.clear();
        self.running = false;
        info!(
            target: "totem::guard",
            pending,
            cooldowns,
            "Totem guard disabled."
        );
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn on_entity_damage(
        &mut self,
        event: &mut DamageEvent,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        self.dispatch(&LethalDamageWatcher, event, host, scheduler);
    }

    pub fn on_player_death(
        &mut self,
        event: &mut DeathEvent,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        self.dispatch(&DeathInterceptor, event, host, scheduler);
    }

    pub fn on_player_respawn(
        &mut self,
        event: &mut RespawnEvent,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        self.dispatch(&RespawnFinalizer, event, host, scheduler);
    }

    pub fn on_player_quit(
        &mut self,
        event: &mut QuitEvent,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        self.dispatch(&QuitHandler, event, host, scheduler);
    }

    /// Runs a deferred task the scheduler reported as due.
    pub fn run_task(
        &mut self,
        task: DeferredTask,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        if !self.running {
            trace!(target: "totem::guard", task = task.name(), "guard stopped, dropping task");
            return;
        }

        let mut ctx = self.context(host, scheduler);
        match task {
            DeferredTask::ForceRespawn { entity, save } => {
                DeathInterceptor.force_respawn(entity, save, &mut ctx);
            }
            DeferredTask::ApplyRevival { entity, save } => {
                RespawnFinalizer.apply_revival(entity, save, &mut ctx);
            }
        }
    }

    /// Handler metadata, in the order the host should register them.
    pub fn registrations(&self) -> [Registration; 4] {
        [
            LethalDamageWatcher.registration(),
            DeathInterceptor.registration(),
            RespawnFinalizer.registration(),
            QuitHandler.registration(),
        ]
    }

    /// Registers every handler with the host's event source.
    pub fn register(&self, source: &mut dyn EventSource) {
        for registration in self.registrations() {
            trace!(
                target: "totem::guard",
                event = %registration.event,
                handler = registration.handler,
                "registering handler"
            );
            source.register(registration);
        }
    }

    pub fn state(&self) -> &RevivalState {
        &self.state
    }

    pub fn config(&self) -> &RevivalConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RevivalEvent> {
        self.events.subscribe()
    }

    fn dispatch<H: EventHandler>(
        &mut self,
        handler: &H,
        event: &mut H::Event,
        host: &mut dyn EntityHost,
        scheduler: &mut dyn Scheduler,
    ) {
        if !self.running {
            return;
        }
        if handler.ignore_cancelled() && event.is_cancelled() {
            trace!(
                target: "totem::guard",
                handler = handler.name(),
                entity = %event.entity(),
                "skipping cancelled event"
            );
            return;
        }

        let mut ctx = self.context(host, scheduler);
        handler.handle(event, &mut ctx);
    }

    fn context<'a>(
        &'a mut self,
        host: &'a mut dyn EntityHost,
        scheduler: &'a mut dyn Scheduler,
    ) -> HandlerContext<'a> {
        HandlerContext {
            state: &mut self.state,
            host,
            scheduler,
            config: &self.config,
            clock: self.clock.as_ref(),
            events: &self.events,
        }
    }
}

/// Builder for [`TotemGuard`].
pub struct TotemGuardBuilder {
    config: RevivalConfig,
    clock: Option<Arc<dyn Clock>>,
    events: Option<EventBus>,
}

impl TotemGuardBuilder {
    fn new() -> Self {
        Self {
            config: RevivalConfig::default(),
            clock: None,
            events: None,
        }
    }

    /// Override revival configuration
    pub fn config(mut self, config: RevivalConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source for cooldowns (defaults to [`SystemClock`])
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Share an existing bus instead of creating one
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> TotemGuard {
        TotemGuard {
            config: self.config,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            events: self.events.unwrap_or_default(),
            state: RevivalState::new(),
            running: false,
        }
    }
}

impl Default for TotemGuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::host::{InMemoryHost, PlatformInfo};

    #[test]
    fn registrations_follow_handler_ordering() {
        let guard = TotemGuard::builder().build();
        let mut host = InMemoryHost::default();

        guard.register(&mut host);

        let registrations = host.registrations();
        assert_eq!(registrations.len(), 4);
        assert_eq!(registrations[0].event, EventKind::Damage);
        assert!(registrations[0].ignore_cancelled);
        assert_eq!(registrations[0].priority, crate::events::EventPriority::Monitor);
        assert_eq!(registrations[1].event, EventKind::Death);
        assert_eq!(registrations[2].event, EventKind::Respawn);
        assert_eq!(registrations[3].event, EventKind::Quit);
    }

    #[test]
    fn start_and_stop_toggle_running() {
        let mut guard = TotemGuard::builder().build();
        let host = InMemoryHost::new(PlatformInfo::default().without_forced_respawn());

        assert!(!guard.is_running());
        guard.start(&host);
        assert!(guard.is_running());
        guard.stop();
        assert!(!guard.is_running());
    }
}
