//! Persona gateway port
//!
//! Defines the interface for the language-model backends that voice the
//! personas. Calls are treated as slow, failing network operations: a
//! failure costs that persona's contribution for the turn, never the turn.

use async_trait::async_trait;
use chorus_domain::PersonaId;
use thiserror::Error;

/// Errors that can occur during backend generation calls
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for persona text generation
///
/// One trait covers both the per-persona generation call and the Governor
/// merge call: the merge is itself a generation under the Governor voice.
#[async_trait]
pub trait PersonaGateway: Send + Sync {
    /// Generate a response in the given persona's voice.
    ///
    /// `history` is the channel's recent conversation, most-recent-last.
    async fn generate(
        &self,
        persona: PersonaId,
        prompt: &str,
        history: &[String],
    ) -> Result<String, GatewayError>;

    /// Merge multiple persona responses into one Governor statement
    async fn merge(
        &self,
        responses: &[(PersonaId, String)],
        user_text: &str,
        history: &[String],
    ) -> Result<String, GatewayError>;
}
