//! Prompt templates for the turn flow

use crate::persona::id::PersonaId;

/// Templates for generating prompts at each step of a turn
pub struct TurnPrompt;

impl TurnPrompt {
    /// Prefix a prompt with conversation history, most-recent-last
    pub fn with_context(history: &[String], input: &str) -> String {
        if history.is_empty() {
            return input.to_string();
        }
        format!("Context:\n{}\n\n{}", history.join("\n"), input)
    }

    /// Input for the second responder: the original text plus the first reply
    pub fn second(user_text: &str, first_response: &str) -> String {
        format!("User said:\n{user_text}\n\nThe first response was:\n{first_response}")
    }

    /// Input for a brief follow-up by the first responder
    pub fn follow_up(second_response: &str, persona: PersonaId) -> String {
        format!(
            "Second response:\n{second_response}\n\nPlease provide a short final follow-up, {persona}."
        )
    }

    /// Input for a third persona offering an independent perspective
    pub fn perspective(
        user_text: &str,
        first_response: &str,
        second_response: &str,
        persona: PersonaId,
    ) -> String {
        format!(
            "User said:\n{user_text}\n\nFirst response:\n{first_response}\n\n\
             Second response:\n{second_response}\n\nPlease offer your unique perspective, {persona}."
        )
    }

    /// Content handed to the Governor merge call
    pub fn merge_content(responses: &[(PersonaId, String)], user_text: &str) -> String {
        let mut content = format!("User's question:\n{user_text}\n\nPersona responses:\n");
        for (persona, text) in responses {
            content.push_str(&format!("{persona} responded:\n{text}\n\n"));
        }
        content
    }

    /// Fixed safety message for crisis-flagged input
    pub fn crisis_notice() -> &'static str {
        "I'm really sorry you're feeling this way. If you're considering hurting yourself, \
         please reach out. Call 988 (US) or visit https://findahelpline.com for help."
    }

    /// Static help text for `!commands`
    pub fn help_text() -> &'static str {
        "**Commands:**\n\
         `!remove [PersonaName]` - Disable a persona.\n\
         `!add [PersonaName]` - Re-enable a persona.\n\
         `!reset` - Reset to all personas active.\n\
         `!isolate [PersonaName]` - Only that persona is active.\n\
         `!commands` - Show this help.\n\
         `!new` - Reset memory & reset all personas.\n\
         `!private` - Create a private conversation with all personas.\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefix_only_with_history() {
        assert_eq!(TurnPrompt::with_context(&[], "hi"), "hi");
        let history = vec!["You: earlier".to_string()];
        assert_eq!(
            TurnPrompt::with_context(&history, "hi"),
            "Context:\nYou: earlier\n\nhi"
        );
    }

    #[test]
    fn test_merge_content_lists_every_responder() {
        let responses = vec![
            (PersonaId::Cyclo, "think it through".to_string()),
            (PersonaId::Emo, "be gentle with yourself".to_string()),
        ];
        let content = TurnPrompt::merge_content(&responses, "what should I do?");
        assert!(content.starts_with("User's question:\nwhat should I do?"));
        assert!(content.contains("Cyclo responded:\nthink it through"));
        assert!(content.contains("Emo responded:\nbe gentle with yourself"));
    }

    #[test]
    fn test_follow_up_addresses_persona() {
        let prompt = TurnPrompt::follow_up("second text", PersonaId::Prim);
        assert!(prompt.contains("short final follow-up, Prim."));
    }
}
