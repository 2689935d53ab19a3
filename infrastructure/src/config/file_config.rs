//! File configuration schema

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backend: BackendConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible chat completions endpoint
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Per-request timeout, seconds
    pub request_timeout_secs: u64,
    /// Token cap per response
    pub max_tokens: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "CHORUS_API_KEY".to_string(),
            model: "gpt-4".to_string(),
            request_timeout_secs: 60,
            max_tokens: 350,
        }
    }
}

/// Turn orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Upper bound on the forced-mention fan-out, seconds
    pub fanout_timeout_secs: u64,
    /// Pause between showing the thinking indicator and generating,
    /// milliseconds
    pub thinking_delay_ms: u64,
    /// History lines sent as context with each generation
    pub history_window: usize,
    /// History lines retained per channel
    pub history_cap: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fanout_timeout_secs: 20,
            thinking_delay_ms: 2000,
            history_window: 20,
            history_cap: 40,
        }
    }
}

impl OrchestratorConfig {
    pub fn fanout_timeout(&self) -> Duration {
        Duration::from_secs(self.fanout_timeout_secs)
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = FileConfig::default();
        assert_eq!(config.orchestrator.fanout_timeout(), Duration::from_secs(20));
        assert_eq!(config.orchestrator.history_cap, 40);
        assert!(config.backend.base_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [orchestrator]
            thinking_delay_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.orchestrator.thinking_delay(), Duration::ZERO);
        assert_eq!(config.orchestrator.history_window, 20);
        assert_eq!(config.backend.max_tokens, 350);
    }
}
