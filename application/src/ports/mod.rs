//! Ports (abstract collaborator interfaces)
//!
//! The orchestrator consumes these traits; implementations live in the
//! infrastructure layer.

pub mod classifier;
pub mod crisis;
pub mod gateway;
pub mod history;
pub mod random;
pub mod transport;
