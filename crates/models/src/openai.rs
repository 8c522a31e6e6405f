//! OpenAI-compatible chat completions client

use crate::error::ModelError;
use crate::provider::ChatModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use vulnrag_core::{ModelConfig, PromptEnvelope};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChatModel {
    client: Client,
    completions_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    failure_cooldown: Duration,
    debug_sample_interval: usize,
    requests: AtomicUsize,
    failures: AtomicUsize,
}

impl OpenAiChatModel {
    /// Create a client; the API key comes from the config or `OPENAI_API_KEY`
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ModelError::ConfigError(
                    "no API key: set model.api_key or OPENAI_API_KEY".to_string(),
                )
            })?;

        info!("Initializing chat model client");
        info!("  Model: {}", config.model);
        info!("  API Base URL: {}", config.api_base_url);
        info!("  Temperature: {}", config.temperature);
        info!("  Timeout: {}s", config.timeout_secs);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                config.api_base_url.trim_end_matches('/')
            ),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            failure_cooldown: Duration::from_secs(config.failure_cooldown_secs),
            debug_sample_interval: config.debug_sample_interval,
            requests: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    /// Failed calls so far
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    async fn complete(&self, prompt: &PromptEnvelope) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system_text,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user_text,
                },
            ],
            temperature: self.temperature,
        };

        let count = self.requests.fetch_add(1, Ordering::Relaxed);
        if self.debug_sample_interval > 0 && count % self.debug_sample_interval == 0 {
            debug!("Chat request #{count}: {request:?}");
        }

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ModelError::BadStatus { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::ParseError(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ModelError::ParseError("response has no message content".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn invoke(&self, prompt: &PromptEnvelope) -> String {
        match self.complete(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Chat model call failed ({failures} so far): {e}");
                if !self.failure_cooldown.is_zero() {
                    tokio::time::sleep(self.failure_cooldown).await;
                }
                String::new()
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base_url: &str) -> ModelConfig {
        ModelConfig {
            api_base_url: api_base_url.to_string(),
            api_key: Some("test-key".to_string()),
            failure_cooldown_secs: 0,
            timeout_secs: 5,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_completions_url_joins_base() {
        let model = OpenAiChatModel::new(&config("https://api.example.com/v1/")).unwrap();
        assert_eq!(
            model.completions_url,
            "https://api.example.com/v1/chat/completions"
        );
        assert_eq!(model.name(), "deepseek-chat");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        let mut cfg = config("http://localhost:1");
        cfg.api_key = None;
        assert!(matches!(
            OpenAiChatModel::new(&cfg),
            Err(ModelError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_empty_answer() {
        let model = OpenAiChatModel::new(&config("http://127.0.0.1:9")).unwrap();
        let answer = model.invoke(&PromptEnvelope::default()).await;
        assert_eq!(answer, "");
        assert_eq!(model.failure_count(), 1);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "system",
                content: "s",
            }],
            temperature: 0.1,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["model"], "m");
    }
}
