//! Batch embedding adapter over an [`EmbeddingProvider`]

mod similarity;

pub use similarity::{cosine_distance, cosine_similarity, l2_norm};

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{Chunk, EmbeddedChunk};

/// Annotates chunks with vectors, preserving order one-to-one
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Embed a batch of chunks
    ///
    /// Fails with `DependencyUnavailable` rather than returning unembedded
    /// or partially embedded chunks.
    pub async fn embed(&self, chunks: Vec<Chunk>) -> Result<Vec<EmbeddedChunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!("Embedding {} chunks with {}", chunks.len(), self.provider.name());

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .provider
            .embed_batch(&texts)
            .await
            .map_err(|e| self.unavailable(e))?;

        if vectors.len() != chunks.len() {
            return Err(Error::dependency(
                self.provider.name(),
                format!("returned {} vectors for {} chunks", vectors.len(), chunks.len()),
            ));
        }

        Ok(chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector })
            .collect())
    }

    /// Embed a single query text
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.embed(text).await.map_err(|e| self.unavailable(e))
    }

    fn unavailable(&self, err: Error) -> Error {
        match err {
            Error::DependencyUnavailable { .. } => err,
            other => Error::dependency(self.provider.name(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use async_trait::async_trait;

    struct ShortBatchProvider;

    #[async_trait]
    impl EmbeddingProvider for ShortBatchProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }

        fn dimensions(&self) -> usize {
            1
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::internal("model not loaded"))
        }

        fn dimensions(&self) -> usize {
            1
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n).map(|i| Chunk::new("a.md", format!("chunk number {}", i), i)).collect()
    }

    #[tokio::test]
    async fn test_preserves_order_one_to_one() {
        let embedder = Embedder::new(Arc::new(HashingEmbedder::new(32)));
        let embedded = embedder.embed(chunks(3)).await.unwrap();

        assert_eq!(embedded.len(), 3);
        for (i, e) in embedded.iter().enumerate() {
            assert_eq!(e.chunk.sequence_index, i);
            assert_eq!(e.vector.len(), 32);
        }
    }

    #[tokio::test]
    async fn test_count_mismatch_is_dependency_error() {
        let embedder = Embedder::new(Arc::new(ShortBatchProvider));
        let err = embedder.embed(chunks(2)).await.unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_is_dependency_error() {
        let embedder = Embedder::new(Arc::new(BrokenProvider));
        let err = embedder.embed(chunks(1)).await.unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable { ref dependency, .. } if dependency == "broken"));

        let err = embedder.embed_query("q").await.unwrap_err();
        assert!(matches!(err, Error::DependencyUnavailable { .. }));
    }
}
