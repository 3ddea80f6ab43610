//! Deferred work queued for a later simulation step.
//!
//! Continuations are plain data ([`DeferredTask`]) so the host can hold them
//! in whatever queue it already runs, and hand them back to
//! [`TotemGuard::run_task`](crate::TotemGuard::run_task) once they are due.

use std::collections::BTreeMap;

use game_core::{EntityId, Tick};

use crate::api::{HostError, Result};
use crate::state::SaveId;

/// Work scheduled by a handler, bound to the pending save it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// Skip the death screen and respawn the entity.
    ForceRespawn { entity: EntityId, save: SaveId },
    /// Apply health, effects and feedback after the respawn landed.
    ApplyRevival { entity: EntityId, save: SaveId },
}

impl DeferredTask {
    pub fn entity(&self) -> EntityId {
        match self {
            DeferredTask::ForceRespawn { entity, .. } | DeferredTask::ApplyRevival { entity, .. } => {
                *entity
            }
        }
    }

    pub fn save(&self) -> SaveId {
        match self {
            DeferredTask::ForceRespawn { save, .. } | DeferredTask::ApplyRevival { save, .. } => {
                *save
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeferredTask::ForceRespawn { .. } => "force_respawn",
            DeferredTask::ApplyRevival { .. } => "apply_revival",
        }
    }
}

/// "Run this after about `delay` steps." Fire-and-forget: the only thing the
/// caller observes is a failure to enqueue.
pub trait Scheduler {
    fn schedule(&mut self, delay: Tick, task: DeferredTask) -> Result<()>;
}

/// Manually stepped scheduler.
///
/// Tasks due on the same tick come out in the order they were scheduled.
/// A delay of zero is treated as one step: a task never runs inside the
/// event that scheduled it.
#[derive(Debug, Default)]
pub struct TickScheduler {
    now: Tick,
    sequence: u64,
    queue: BTreeMap<(Tick, u64), DeferredTask>,
    rejecting: Option<String>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Makes every subsequent `schedule` call fail with `reason`.
    pub fn reject_with(&mut self, reason: impl Into<String>) {
        self.rejecting = Some(reason.into());
    }

    pub fn accept(&mut self) {
        self.rejecting = None;
    }

    /// Moves one step forward and returns the tasks that became due.
    pub fn advance(&mut self) -> Vec<DeferredTask> {
        self.now = self.now.saturating_add(Tick::ONE);
        let due = match self.now.checked_add(Tick::ONE) {
            Some(next) => {
                let later = self.queue.split_off(&(next, 0));
                std::mem::replace(&mut self.queue, later)
            }
            None => std::mem::take(&mut self.queue),
        };
        due.into_values().collect()
    }
}

impl Scheduler for TickScheduler {
    fn schedule(&mut self, delay: Tick, task: DeferredTask) -> Result<()> {
        if let Some(reason) = &self.rejecting {
            return Err(HostError::SchedulerRejected(reason.clone()));
        }
        let due = self.now.saturating_add(delay.max(Tick::ONE));
        self.sequence += 1;
        self.queue.insert((due, self.sequence), task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respawn(n: u64) -> DeferredTask {
        DeferredTask::ForceRespawn {
            entity: EntityId(n),
            save: SaveId(n),
        }
    }

    #[test]
    fn zero_delay_runs_next_step() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(Tick::ZERO, respawn(1)).unwrap();

        assert_eq!(scheduler.advance(), vec![respawn(1)]);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn same_tick_tasks_keep_schedule_order() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(Tick(2), respawn(3)).unwrap();
        scheduler.schedule(Tick(1), respawn(1)).unwrap();
        scheduler.schedule(Tick(1), respawn(2)).unwrap();

        assert_eq!(scheduler.advance(), vec![respawn(1), respawn(2)]);
        assert_eq!(scheduler.pending_tasks(), 1);
        assert_eq!(scheduler.advance(), vec![respawn(3)]);
        assert_eq!(scheduler.now(), Tick(2));
    }

    #[test]
    fn rejecting_scheduler_reports_error() {
        let mut scheduler = TickScheduler::new();
        scheduler.reject_with("plugin disabled");

        assert_eq!(
            scheduler.schedule(Tick::ONE, respawn(1)),
            Err(HostError::SchedulerRejected("plugin disabled".into()))
        );
        assert!(scheduler.is_idle());

        scheduler.accept();
        assert!(scheduler.schedule(Tick::ONE, respawn(1)).is_ok());
    }

    #[test]
    fn huge_delay_saturates_instead_of_wrapping() {
        let mut scheduler = TickScheduler::new();
        scheduler.advance();

        assert!(scheduler.schedule(Tick(u64::MAX), respawn(1)).is_ok());
        assert_eq!(scheduler.pending_tasks(), 1);
        assert!(scheduler.advance().is_empty());
        assert_eq!(scheduler.pending_tasks(), 1);
    }
}
