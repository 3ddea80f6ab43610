//! Background consumer that logs revival outcomes as they are published.
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use totem_runtime::RevivalEvent;

/// Spawns a task that logs every outcome until the bus closes.
///
/// Resolves to the number of outcomes seen.
pub fn spawn_outcome_logger(mut rx: broadcast::Receiver<RevivalEvent>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut seen = 0;
        loop {
            match rx.recv().await {
                Ok(event) => {
                    seen += 1;
                    log_outcome(&event);
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(target: "totem::outcome", missed, "outcome logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    })
}

fn log_outcome(event: &RevivalEvent) {
    match event {
        RevivalEvent::LethalDamageDetected { entity, hands, .. } => {
            info!(target: "totem::outcome", %entity, ?hands, "lethal damage detected");
        }
        RevivalEvent::ItemConsumed { entity, hand } => {
            info!(target: "totem::outcome", %entity, %hand, "totem consumed");
        }
        RevivalEvent::RespawnForced { entity } => {
            info!(target: "totem::outcome", %entity, "respawn forced");
        }
        RevivalEvent::Revived { entity, location } => {
            info!(target: "totem::outcome", %entity, %location, "revived");
        }
        RevivalEvent::RevivalAborted { entity, reason } => {
            warn!(target: "totem::outcome", %entity, %reason, "revival aborted");
        }
        RevivalEvent::Forgotten { entity } => {
            info!(target: "totem::outcome", %entity, "state forgotten");
        }
    }
}

#[cfg(test)]
mod tests {
    use game_core::EntityId;
    use totem_runtime::EventBus;

    use super::*;

    #[tokio::test]
    async fn logger_counts_until_bus_closes() {
        let bus = EventBus::new();
        let logger = spawn_outcome_logger(bus.subscribe());

        bus.publish(RevivalEvent::RespawnForced {
            entity: EntityId(1),
        });
        bus.publish(RevivalEvent::Forgotten {
            entity: EntityId(1),
        });
        drop(bus);

        assert_eq!(logger.await.unwrap(), 2);
    }
}
