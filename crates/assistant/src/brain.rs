//! LLM backend abstraction. The resolver only ever needs "prompt in, text
//! out", so the trait surface stays minimal; `OpenAiBackend` speaks the
//! chat-completions wire format and covers any OpenAI-compatible endpoint
//! (including a local Ollama server).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Error type for backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),
}

/// Configuration for the text-generation backend.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Bound on the whole request so a stalled backend surfaces as an error
    /// instead of leaving the conversation stuck in "sending".
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 600,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Defaults with `TASKNEST_LLM_*` / `OPENAI_API_KEY` overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("TASKNEST_LLM_MODEL") {
            config.model = model;
        }
        if let Ok(endpoint) = std::env::var("TASKNEST_LLM_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(temp) = std::env::var("TASKNEST_LLM_TEMPERATURE") {
            if let Ok(temp) = temp.parse() {
                config.temperature = temp;
            }
        }
        if let Ok(max_tokens) = std::env::var("TASKNEST_LLM_MAX_TOKENS") {
            if let Ok(max_tokens) = max_tokens.parse() {
                config.max_tokens = max_tokens;
            }
        }
        if let Ok(timeout) = std::env::var("TASKNEST_LLM_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout.parse() {
                config.timeout_secs = timeout;
            }
        }
        config.api_key = std::env::var("OPENAI_API_KEY").ok();
        config
    }
}

/// Black-box text-generation backend: one prompt, one completion.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend name for logging/display.
    fn name(&self) -> &'static str;

    /// Whether the backend has the credentials/endpoint it needs.
    fn is_configured(&self) -> bool;

    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// OpenAI chat-completions backend.
pub struct OpenAiBackend {
    client: Client,
    config: LlmConfig,
}

impl OpenAiBackend {
    pub fn new(config: LlmConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!(
                "LLM backend created without API key - set OPENAI_API_KEY or point \
                 TASKNEST_LLM_ENDPOINT at a local server"
            );
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    fn uses_local_endpoint(&self) -> bool {
        !self.config.endpoint.starts_with("https://api.openai.com")
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some() || self.uses_local_endpoint()
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        let payload = serde_json::json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        tracing::debug!(
            "[{}] sending completion request: model={}, prompt_len={}",
            self.name(),
            self.config.model,
            prompt.len()
        );

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        } else if !self.uses_local_endpoint() {
            return Err(BackendError::AuthError(
                "no API key configured".to_string(),
            ));
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                BackendError::ParseError("response carried no message content".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 600);
        assert!(config.endpoint.contains("api.openai.com"));
    }

    #[test]
    fn test_local_endpoint_counts_as_configured() {
        let config = LlmConfig {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            api_key: None,
            ..LlmConfig::default()
        };
        let backend = OpenAiBackend::new(config);
        assert!(backend.is_configured());
    }

    #[tokio::test]
    async fn test_complete_without_credentials_fails() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::default()
        };
        let backend = OpenAiBackend::new(config);
        let result = backend.complete("hello").await;
        assert!(matches!(result, Err(BackendError::AuthError(_))));
    }
}
