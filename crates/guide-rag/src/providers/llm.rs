//! LLM provider trait and mode-based construction

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::Result;

pub use crate::config::ModelMode;

use super::hosted::HostedLlm;
use super::ollama::OllamaLlm;

/// Trait for answer generation
///
/// Implementations:
/// - `HostedLlm`: OpenAI / OpenRouter chat completions
/// - `OllamaLlm`: Locally served 8-bit or 4-bit model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a fully built prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Build the provider for the configured mode; called once at startup
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.mode {
        ModelMode::Hosted => Arc::new(HostedLlm::new(config)?),
        ModelMode::Local8Bit | ModelMode::Local4Bit => Arc::new(OllamaLlm::new(config)?),
    };

    tracing::info!(
        "LLM provider: {} (mode {:?}, model {})",
        llm.name(),
        config.mode,
        llm.model()
    );
    Ok(llm)
}
