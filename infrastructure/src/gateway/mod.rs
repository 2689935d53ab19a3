//! Persona gateway adapter
//!
//! Voices every persona through one OpenAI-compatible chat completions
//! endpoint: the persona's profile supplies the system prompt and sampling
//! temperature, the channel history arrives as a context prefix.

mod wire;

use chorus_application::ports::gateway::{GatewayError, PersonaGateway};
use async_trait::async_trait;
use chorus_domain::{PersonaId, PersonaProfile, TurnPrompt};
use std::time::Duration;
use tracing::debug;
use wire::{ChatRequest, ChatResponse, Message};

use crate::config::BackendConfig;

/// HTTP adapter for persona generation and the Governor merge
pub struct ChatCompletionsGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ChatCompletionsGateway {
    /// Build a gateway from backend config, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &BackendConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::Unavailable(format!("missing API key in ${}", config.api_key_env))
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// One raw chat completion call. Also used by the classifier adapter.
    pub(crate) async fn chat(
        &self,
        system_prompt: &str,
        user_content: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message::system(system_prompt),
                Message::user(user_content),
            ],
            max_tokens,
            temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("chat completion request to {url}");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "{status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        parsed
            .first_content()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".to_string()))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::Unavailable(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl PersonaGateway for ChatCompletionsGateway {
    async fn generate(
        &self,
        persona: PersonaId,
        prompt: &str,
        history: &[String],
    ) -> Result<String, GatewayError> {
        let profile = PersonaProfile::for_persona(persona);
        let content = TurnPrompt::with_context(history, prompt);
        self.chat(
            profile.system_prompt,
            &content,
            profile.temperature,
            self.max_tokens,
        )
        .await
    }

    async fn merge(
        &self,
        responses: &[(PersonaId, String)],
        user_text: &str,
        history: &[String],
    ) -> Result<String, GatewayError> {
        let profile = PersonaProfile::for_persona(PersonaId::Governor);
        let content =
            TurnPrompt::with_context(history, &TurnPrompt::merge_content(responses, user_text));
        self.chat(
            profile.system_prompt,
            &content,
            profile.temperature,
            self.max_tokens,
        )
        .await
    }
}
