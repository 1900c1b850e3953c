//! Generation backend
//!
//! OpenAI-compatible chat-completions client. The upstream service is an
//! external collaborator; its output is untrusted text that may or may not
//! follow the structured reply contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use onboard_config::constants::llm;
use onboard_config::LlmSettings;

use crate::prompt::Message;
use crate::LlmError;

/// Generation backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API endpoint base, e.g. `https://api.siliconflow.cn/v1`
    pub endpoint: String,
    /// API key (bearer)
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: llm::DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: llm::DEFAULT_MODEL.to_string(),
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            temperature: llm::DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(llm::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Raw generated text, untrusted
    pub text: String,
    /// Completion tokens reported by the service, if any
    pub tokens: usize,
    /// Wall-clock generation time (ms)
    pub total_time_ms: u64,
}

/// Generation backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response for the given messages
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Model name
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    completion_tokens: usize,
}

/// OpenAI-compatible chat-completions backend
pub struct ChatBackend {
    config: LlmConfig,
    client: Client,
}

impl ChatBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() && !config.endpoint.starts_with("http://localhost") {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmBackend for ChatBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let start = std::time::Instant::now();

        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {status}: {error_text}")));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            model = %self.config.model,
            total_time_ms,
            "Generation complete"
        );

        Ok(GenerationResult {
            text: choice.message.content.trim().to_string(),
            tokens: response.usage.map(|u| u.completion_tokens).unwrap_or(0),
            total_time_ms,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_endpoint_requires_api_key() {
        let config = LlmConfig::default();
        assert!(ChatBackend::new(config).is_err());
    }

    #[test]
    fn test_localhost_endpoint_allows_empty_key() {
        let config = LlmConfig {
            endpoint: "http://localhost:11434/v1".to_string(),
            ..LlmConfig::default()
        };
        let backend = ChatBackend::new(config).unwrap();
        assert_eq!(
            backend.chat_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let config = LlmConfig {
            endpoint: "http://localhost:11434/v1/".to_string(),
            ..LlmConfig::default()
        };
        let backend = ChatBackend::new(config).unwrap();
        assert_eq!(
            backend.chat_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
