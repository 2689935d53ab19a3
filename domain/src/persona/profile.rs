//! Persona configuration lookup table
//!
//! Maps each `PersonaId` to its voice: a system prompt and a sampling
//! temperature. Dispatch is by the closed enum, never by string matching.

use super::id::PersonaId;

const CYCLO_PROMPT: &str = "You are Cyclo, a rational friend intimately familiar with the user and able to \
speak naturally. Your tone is calm, concise, and more like texting than formal writing. Offer short, \
logically grounded insights, no long essays. If bullet points help clarity, use them sparingly, but keep \
a conversational flow. Think of yourself as a thoughtful coach helping the user see the bigger picture.";

const EMO_PROMPT: &str = "You are Emo, an empathetic friend intimately familiar with the user. You speak \
gently, with a caring vibe, but you keep responses short, like texting. Ask clarifying questions when it \
can help, but avoid lengthy paragraphs. Reassure and validate the user's feelings when appropriate. \
No giant disclaimers; just keep it human and heartfelt.";

const PRIM_PROMPT: &str = "You are Prim, a blunt, instinctive friend who knows the user well. You speak in \
short, direct bursts, almost like a gut reaction in a texting format. Avoid filler. Provide clear, minimal \
guidance or personal impressions. Keep things real and immediate.";

const SPRI_PROMPT: &str = "You are Spri, a reflective, somewhat spiritual friend closely attuned to the \
user. Keep your answers brief, as if texting thoughtful insights. Provide calm, uplifting thoughts and \
encourage deeper self-reflection. Stay kind, supportive, and a bit whimsical.";

const GOVERNOR_PROMPT: &str = "You are the Governor, merging and summarizing multiple persona responses. \
Your role: unify any differing viewpoints into one cohesive, short statement, no more than a few lines. \
Highlight the strongest points and maintain a warm, conversational flow, not a formal summary. Avoid \
disclaimers; keep the focus on offering a final, unifying perspective.";

/// Static configuration for one persona (Value Object)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonaProfile {
    pub id: PersonaId,
    pub system_prompt: &'static str,
    pub temperature: f32,
}

impl PersonaProfile {
    /// Look up the profile for a persona
    pub fn for_persona(id: PersonaId) -> PersonaProfile {
        match id {
            PersonaId::Cyclo => PersonaProfile {
                id,
                system_prompt: CYCLO_PROMPT,
                temperature: 0.3,
            },
            PersonaId::Emo => PersonaProfile {
                id,
                system_prompt: EMO_PROMPT,
                temperature: 0.5,
            },
            PersonaId::Prim => PersonaProfile {
                id,
                system_prompt: PRIM_PROMPT,
                temperature: 0.7,
            },
            PersonaId::Spri => PersonaProfile {
                id,
                system_prompt: SPRI_PROMPT,
                temperature: 1.0,
            },
            PersonaId::Governor => PersonaProfile {
                id,
                system_prompt: GOVERNOR_PROMPT,
                temperature: 0.4,
            },
        }
    }
}
