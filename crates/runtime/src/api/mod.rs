//! Public API surface shared by the service, its handlers and host adapters.

pub mod errors;

pub use errors::{HostError, Result};
