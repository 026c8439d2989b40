//! Generation backend client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::prompt::ChatMessage;
use crate::LlmError;

/// Generation backend configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name
    pub model: String,
    /// OpenAI-compatible API base URL, e.g. `http://localhost:11434/v1`
    pub endpoint: String,
    /// API key, if the endpoint requires one
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff, doubles each retry
    pub initial_backoff: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "qwen2.5:7b-instruct-q4_K_M".to_string(),
            endpoint: "http://127.0.0.1:11434/v1".to_string(),
            api_key: None,
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// Generation backend interface
#[async_trait]
pub trait LlmBackend: Send + Sync + 'static {
    /// Generate a completion for the given chat messages
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for any OpenAI-compatible chat completion endpoint
#[derive(Clone)]
pub struct OpenAiChatBackend {
    client: Client,
    config: LlmConfig,
}

impl OpenAiChatBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    async fn execute(&self, request: &ChatCompletionRequest<'_>) -> Result<String, LlmError> {
        let mut builder = self.client.post(self.api_url()).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {}: {}", status, body)));
            }
            return Err(LlmError::Api(format!("{}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices".to_string()))
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_))
    }
}

#[async_trait]
impl LlmBackend for OpenAiChatBackend {
    /// Generate with exponential-backoff retry on transient failures
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                warn!(
                    ?backoff,
                    attempt,
                    max = self.config.max_retries,
                    "generation request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute(&request).await {
                Ok(text) => return Ok(text),
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:11434/v1");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        let backend = OpenAiChatBackend::new(LlmConfig {
            endpoint: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(backend.api_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_retryability() {
        assert!(OpenAiChatBackend::is_retryable(&LlmError::Network(
            "timeout".into()
        )));
        assert!(!OpenAiChatBackend::is_retryable(&LlmError::Api(
            "400 bad request".into()
        )));
    }
}
