//! Domain layer for persona-chorus
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Chorus
//!
//! One inbound chat message fans out to one or more independently-voiced
//! personas. Their replies may then be unified by the Governor, a special
//! summarizing role that never joins the main rotation.
//!
//! ## Isolation
//!
//! The registry can restrict the chorus to a single persona, either by an
//! explicit command or as a side effect of deactivating everyone else.

pub mod command;
pub mod core;
pub mod persona;
pub mod prompt;
pub mod sanitize;
pub mod turn;

// Re-export commonly used types
pub use command::{Command, CommandError, is_command};
pub use core::error::DomainError;
pub use persona::{
    id::{PersonaId, forced_mentions},
    profile::PersonaProfile,
    registry::PersonaRegistry,
};
pub use prompt::TurnPrompt;
pub use sanitize::sanitize;
pub use turn::{
    plan::{ResponsePlan, plan_turns},
    record::Turn,
};
