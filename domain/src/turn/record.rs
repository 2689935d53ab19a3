//! Turn record (Entity, ephemeral)
//!
//! Scoped to one inbound user message: created at receipt, dropped after
//! delivery. No persistent identity.

use crate::persona::id::PersonaId;

/// Everything produced while processing one inbound message
#[derive(Debug, Clone)]
pub struct Turn {
    channel_id: String,
    user_text: String,
    responses: Vec<(PersonaId, String)>,
}

impl Turn {
    pub fn new(channel_id: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_text: user_text.into(),
            responses: Vec::new(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// Record one persona's sanitized response, in arrival order
    pub fn record(&mut self, persona: PersonaId, text: impl Into<String>) {
        self.responses.push((persona, text.into()));
    }

    /// Ordered (persona, response) pairs produced so far
    pub fn responses(&self) -> &[(PersonaId, String)] {
        &self.responses
    }

    /// How many distinct personas have responded.
    ///
    /// The Governor merge only runs when this is at least two.
    pub fn distinct_responders(&self) -> usize {
        let mut seen: Vec<PersonaId> = Vec::with_capacity(self.responses.len());
        for (persona, _) in &self.responses {
            if !seen.contains(persona) {
                seen.push(*persona);
            }
        }
        seen.len()
    }
}
