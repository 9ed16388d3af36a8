//! Provider abstractions for embeddings, answer generation, and vector indexing
//!
//! Each external capability sits behind a trait so the pipeline can be built
//! with real backends at startup and with fakes in tests.

pub mod embedding;
pub mod hashing;
pub mod hosted;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use hosted::HostedLlm;
pub use llm::{build_llm, LlmProvider, ModelMode};
pub use local::LocalVectorIndex;
pub use ollama::{OllamaEmbedder, OllamaLlm};
pub use vector_store::VectorIndex;

/// Build the configured embedding provider
pub fn build_embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.backend {
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(config)?),
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(config.dimensions)),
    };
    tracing::info!(
        "Embedding provider: {} ({} dimensions)",
        provider.name(),
        provider.dimensions()
    );
    Ok(provider)
}
