//! Persona relevance classifier port

use async_trait::async_trait;
use chorus_domain::PersonaId;

/// Maps user text to the personas most relevant to it.
///
/// Fail-open contract: on any backend failure the adapter returns the full
/// main persona set rather than an error. The orchestrator additionally
/// falls back to the active set when the classified pool intersects it to
/// nothing.
#[async_trait]
pub trait PersonaClassifier: Send + Sync {
    async fn classify(&self, user_text: &str) -> Vec<PersonaId>;
}
