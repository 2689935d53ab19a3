//! Persona relevance classifier adapter
//!
//! Asks the backend which personas a message is for and parses its
//! comma-separated reply. Fail-open: any error, or a reply naming no known
//! persona, yields the full main set.

use crate::gateway::ChatCompletionsGateway;
use async_trait::async_trait;
use chorus_application::ports::classifier::PersonaClassifier;
use chorus_domain::PersonaId;
use std::sync::Arc;
use tracing::warn;

const CLASSIFIER_SYSTEM: &str = "You are a persona classifier.";

const CLASSIFIER_INSTRUCTIONS: &str = "We have four persona categories: Cyclo, Emo, Prim, Spri.\n\
Given the user's message, decide which persona(s) are most relevant.\n\
Output a comma-separated list with no extra text.";

const CLASSIFIER_TEMPERATURE: f32 = 0.1;
const CLASSIFIER_MAX_TOKENS: u32 = 50;

/// LLM-backed classifier riding on the shared gateway
pub struct GatewayClassifier {
    gateway: Arc<ChatCompletionsGateway>,
}

impl GatewayClassifier {
    pub fn new(gateway: Arc<ChatCompletionsGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PersonaClassifier for GatewayClassifier {
    async fn classify(&self, user_text: &str) -> Vec<PersonaId> {
        let content = format!("User text:\n{user_text}\n\n{CLASSIFIER_INSTRUCTIONS}");
        match self
            .gateway
            .chat(
                CLASSIFIER_SYSTEM,
                &content,
                CLASSIFIER_TEMPERATURE,
                CLASSIFIER_MAX_TOKENS,
            )
            .await
        {
            Ok(reply) => parse_persona_list(&reply),
            Err(e) => {
                warn!("classification failed, falling back to all personas: {e}");
                PersonaId::MAIN.to_vec()
            }
        }
    }
}

/// Parse a comma-separated persona list; unknown names are dropped and an
/// empty result falls open to the full set.
fn parse_persona_list(reply: &str) -> Vec<PersonaId> {
    let mut personas: Vec<PersonaId> = Vec::new();
    for part in reply.split(',') {
        if let Ok(persona) = part.trim().parse::<PersonaId>() {
            if persona.is_main() && !personas.contains(&persona) {
                personas.push(persona);
            }
        }
    }
    if personas.is_empty() {
        PersonaId::MAIN.to_vec()
    } else {
        personas
    }
}
