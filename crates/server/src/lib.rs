//! Scenario server for the totem revival service.
//!
//! Replays a RON scenario of host events against [`InMemoryHost`] with a
//! [`TotemGuard`] attached, the way a game server would deliver them, and
//! reports the resulting player states.
//!
//! [`InMemoryHost`]: totem_runtime::InMemoryHost
//! [`TotemGuard`]: totem_runtime::TotemGuard
pub mod config;
pub mod logging;
pub mod outcomes;
pub mod scenario;
pub mod sim;

pub use config::ServerConfig;
pub use outcomes::spawn_outcome_logger;
pub use scenario::{PlayerSpec, Scenario, ScenarioError, Step};
pub use sim::{DeathRecord, HostSave, PlayerReport, Report, Simulation};
