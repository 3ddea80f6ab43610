//! Error types surfaced by the host seam.
//!
//! None of these escape the event handlers: the host's dispatcher expects no
//! return value, so every failure is logged and absorbed where it happens.
use thiserror::Error;

use game_core::EntityId;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("entity {0} is not online")]
    EntityOffline(EntityId),

    #[error("entity {0} is not known to the host")]
    UnknownEntity(EntityId),

    #[error("host rejected forced respawn: {0}")]
    RespawnRejected(String),

    #[error("host rejected write to entity {entity}: {operation}")]
    WriteRejected {
        entity: EntityId,
        operation: &'static str,
    },

    #[error("host scheduler rejected deferred task: {0}")]
    SchedulerRejected(String),

    #[error("operation not supported by this platform: {0}")]
    Unsupported(&'static str),
}
