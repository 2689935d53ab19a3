//! Use cases

pub mod handle_message;
pub mod run_command;

use chorus_domain::PersonaRegistry;
use std::sync::{Mutex, MutexGuard};

/// Lock the shared registry, recovering from poisoning.
///
/// Registry mutations are infallible, so a panic while holding the lock
/// cannot leave the state half-written.
pub(crate) fn lock_registry(registry: &Mutex<PersonaRegistry>) -> MutexGuard<'_, PersonaRegistry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
