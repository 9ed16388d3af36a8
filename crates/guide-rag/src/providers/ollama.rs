//! Ollama-based providers for embeddings and locally served quantized models

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Thin Ollama HTTP API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a client with a request timeout
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed(&self, model: &str, text: &str) -> std::result::Result<Vec<f32>, String> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest { model, prompt: text })
            .send()
            .await
            .map_err(|e| format!("Embedding request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Embedding failed: HTTP {}", response.status()));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse embedding response: {}", e))?;

        Ok(body.embedding)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> std::result::Result<String, String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Generation request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Generation failed: HTTP {} - {}", status, body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse generation response: {}", e))?;

        Ok(body.response)
    }
}

/// Ollama embedding provider (all-minilm or similar)
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dimensions: usize,
    model: String,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(&config.base_url, config.timeout_secs)?),
            dimensions: config.dimensions,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed(&self.model, text)
            .await
            .map_err(|message| Error::dependency("ollama-embeddings", message))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Locally served quantized model (8-bit or 4-bit tag)
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
    max_new_tokens: usize,
}

impl OllamaLlm {
    /// Create a provider for the configured local model tag
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: Arc::new(OllamaClient::new(&config.local_base_url, config.timeout_secs)?),
            model: config.local_model_tag(),
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!("Generating answer with local model: {}", self.model);

        let options = GenerateOptions {
            temperature: self.temperature,
            num_predict: self.max_new_tokens,
        };

        self.client
            .generate(&self.model, prompt, options)
            .await
            .map_err(Error::GenerationFailure)
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
