//! Persona activation state machine
//!
//! Process-wide registry of which personas may respond. Mutated only by
//! admin commands and orchestration side effects; callers serialize access
//! (the use cases hold it behind a mutex).
//!
//! Invariants:
//! - at least one main persona is always active; deactivating the last one
//!   is a silent no-op
//! - the Governor is always active and can be neither deactivated nor
//!   isolated
//! - isolation always names exactly one main persona, and `active_set()`
//!   then returns only that persona
//! - activating a second main persona clears isolation

use super::id::PersonaId;

/// Activation and isolation state for the chorus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRegistry {
    /// Activation flags for the four main personas, indexed per `MAIN`
    active: [bool; 4],
    /// When set, only this persona responds
    isolated: Option<PersonaId>,
}

impl PersonaRegistry {
    /// All personas active, isolation off
    pub fn new() -> Self {
        Self {
            active: [true; 4],
            isolated: None,
        }
    }

    fn index(persona: PersonaId) -> Option<usize> {
        PersonaId::MAIN.iter().position(|p| *p == persona)
    }

    fn main_active(&self) -> Vec<PersonaId> {
        PersonaId::MAIN
            .iter()
            .zip(self.active)
            .filter(|(_, active)| *active)
            .map(|(p, _)| *p)
            .collect()
    }

    /// Deactivate a persona.
    ///
    /// The Governor is never deactivated. Removing the last active main
    /// persona is silently reverted. Removing the second-to-last one
    /// engages isolation on the survivor.
    pub fn deactivate(&mut self, persona: PersonaId) {
        let Some(idx) = Self::index(persona) else {
            return;
        };
        self.active[idx] = false;

        let remaining = self.main_active();
        match remaining.len() {
            0 => {
                // Can't remove everyone; revert
                self.active[idx] = true;
            }
            1 => {
                self.isolated = Some(remaining[0]);
            }
            _ => {}
        }
    }

    /// Reactivate a persona. Clears isolation once more than one main
    /// persona is active, even if the persona was already active.
    pub fn activate(&mut self, persona: PersonaId) {
        if let Some(idx) = Self::index(persona) {
            self.active[idx] = true;
        }
        if self.main_active().len() > 1 {
            self.isolated = None;
        }
    }

    /// Reset every persona to active and turn isolation off
    pub fn reset_all(&mut self) {
        self.active = [true; 4];
        self.isolated = None;
    }

    /// Force a single persona to be the only responder.
    ///
    /// No-op for the Governor.
    pub fn isolate(&mut self, persona: PersonaId) {
        if persona.is_governor() {
            return;
        }
        for (i, p) in PersonaId::MAIN.iter().enumerate() {
            self.active[i] = *p == persona;
        }
        self.isolated = Some(persona);
    }

    /// The personas eligible to respond right now.
    ///
    /// Under isolation this is exactly the isolated persona, regardless of
    /// the underlying activation flags.
    pub fn active_set(&self) -> Vec<PersonaId> {
        if let Some(p) = self.isolated {
            return vec![p];
        }
        self.main_active()
    }

    /// Whether isolation mode is engaged
    pub fn is_isolating(&self) -> bool {
        self.isolated.is_some()
    }

    /// The isolated persona, if any
    pub fn isolated_persona(&self) -> Option<PersonaId> {
        self.isolated
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_fully_active() {
        let registry = PersonaRegistry::new();
        assert_eq!(registry.active_set(), PersonaId::MAIN.to_vec());
        assert!(!registry.is_isolating());
    }

    #[test]
    fn test_deactivate_down_to_one_engages_isolation() {
        let mut registry = PersonaRegistry::new();
        registry.deactivate(PersonaId::Cyclo);
        registry.deactivate(PersonaId::Emo);
        assert!(!registry.is_isolating());

        registry.deactivate(PersonaId::Prim);
        assert!(registry.is_isolating());
        assert_eq!(registry.isolated_persona(), Some(PersonaId::Spri));
        assert_eq!(registry.active_set(), vec![PersonaId::Spri]);
    }

    #[test]
    fn test_deactivating_last_persona_is_a_silent_noop() {
        let mut registry = PersonaRegistry::new();
        for p in [PersonaId::Cyclo, PersonaId::Emo, PersonaId::Prim] {
            registry.deactivate(p);
        }
        let before = registry.clone();

        registry.deactivate(PersonaId::Spri);
        assert_eq!(registry, before);
        assert_eq!(registry.active_set(), vec![PersonaId::Spri]);
    }

    #[test]
    fn test_governor_cannot_be_deactivated() {
        let mut registry = PersonaRegistry::new();
        registry.deactivate(PersonaId::Governor);
        assert_eq!(registry.active_set(), PersonaId::MAIN.to_vec());
    }

    #[test]
    fn test_activate_second_persona_clears_isolation() {
        let mut registry = PersonaRegistry::new();
        registry.isolate(PersonaId::Emo);
        assert!(registry.is_isolating());

        registry.activate(PersonaId::Prim);
        assert!(!registry.is_isolating());
        assert_eq!(registry.active_set(), vec![PersonaId::Emo, PersonaId::Prim]);
    }

    #[test]
    fn test_activate_already_active_persona_still_clears_isolation() {
        let mut registry = PersonaRegistry::new();
        registry.deactivate(PersonaId::Cyclo);
        registry.deactivate(PersonaId::Emo);
        registry.deactivate(PersonaId::Prim);
        assert!(registry.is_isolating());

        // Spri is already active, but two mains are not, so isolation holds
        registry.activate(PersonaId::Spri);
        assert!(registry.is_isolating());

        registry.activate(PersonaId::Cyclo);
        assert!(!registry.is_isolating());
    }

    #[test]
    fn test_active_set_under_isolation_ignores_flags() {
        let mut registry = PersonaRegistry::new();
        registry.isolate(PersonaId::Prim);
        assert_eq!(registry.active_set(), vec![PersonaId::Prim]);

        // Isolation answer is independent of the underlying map
        registry.isolate(PersonaId::Cyclo);
        assert_eq!(registry.active_set(), vec![PersonaId::Cyclo]);
    }

    #[test]
    fn test_isolate_governor_is_a_noop() {
        let mut registry = PersonaRegistry::new();
        registry.isolate(PersonaId::Governor);
        assert!(!registry.is_isolating());
        assert_eq!(registry.active_set(), PersonaId::MAIN.to_vec());
    }

    #[test]
    fn test_reset_all_clears_everything() {
        let mut registry = PersonaRegistry::new();
        registry.isolate(PersonaId::Emo);
        registry.reset_all();
        assert!(!registry.is_isolating());
        assert_eq!(registry.active_set(), PersonaId::MAIN.to_vec());
    }
}
