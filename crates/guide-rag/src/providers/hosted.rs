//! Hosted chat-completions provider (OpenAI or OpenRouter)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{HostedProvider, LlmConfig};
use crate::error::{Error, Result};

use super::llm::LlmProvider;

/// Chat-completions client for a remote API
pub struct HostedLlm {
    client: Client,
    provider: HostedProvider,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HostedLlm {
    /// Create a client for the configured provider
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        if config.api_key().trim().is_empty() {
            tracing::warn!("No API key configured for {:?}; generation will fail", config.provider);
        }

        Ok(Self {
            client,
            provider: config.provider,
            base_url: config.provider.base_url().to_string(),
            api_key: config.api_key().to_string(),
            model: config.hosted_model.clone(),
            temperature: config.temperature,
        })
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| Error::Config("Invalid API key characters".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl LlmProvider for HostedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with {:?} model: {}", self.provider, self.model);

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Chat completion request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::generation(format!("{:?} returned {}: {}", self.provider, status, text)));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse chat response: {}", e)))?;

        Ok(parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.api_key.trim().is_empty())
    }

    fn name(&self) -> &str {
        match self.provider {
            HostedProvider::OpenRouter => "openrouter",
            HostedProvider::OpenAi => "openai",
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selects_base_url() {
        let mut config = LlmConfig::default();
        config.openrouter_api_key = "or-key".to_string();
        let llm = HostedLlm::new(&config).unwrap();
        assert_eq!(llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(llm.name(), "openrouter");
        assert_eq!(llm.model(), "gpt-3.5-turbo");

        config.provider = HostedProvider::OpenAi;
        let llm = HostedLlm::new(&config).unwrap();
        assert_eq!(llm.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_chat_response_tolerates_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_generation_failure() {
        let config = LlmConfig {
            openrouter_api_key: "key".to_string(),
            timeout_secs: 1,
            ..LlmConfig::default()
        };
        let llm = HostedLlm::new(&config).unwrap().with_base_url("http://127.0.0.1:9");
        let err = llm.generate("hi").await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailure(_)));
    }
}
