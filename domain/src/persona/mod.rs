//! Persona identity, configuration, and activation state

pub mod id;
pub mod profile;
pub mod registry;
