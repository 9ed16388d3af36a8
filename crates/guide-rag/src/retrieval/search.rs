//! Full-corpus retrieval: load, chunk, embed, and rank against the question

use std::sync::Arc;

use crate::embeddings::Embedder;
use crate::error::{Error, Result};
use crate::ingestion::{Chunker, CorpusLoader};
use crate::types::{Chunk, RankedChunk};

use super::ranker::rank;

/// Scans the whole corpus for the chunks most similar to a question
pub struct CorpusSearcher {
    loader: Arc<dyn CorpusLoader>,
    chunker: Arc<dyn Chunker>,
    embedder: Embedder,
    top_k: usize,
}

impl CorpusSearcher {
    pub fn new(
        loader: Arc<dyn CorpusLoader>,
        chunker: Arc<dyn Chunker>,
        embedder: Embedder,
        top_k: usize,
    ) -> Self {
        Self {
            loader,
            chunker,
            embedder,
            top_k,
        }
    }

    /// Retrieve ranked chunks for a question
    ///
    /// Returns `CorpusEmpty` when no documents load and `NoContentFound`
    /// when nothing ranks; both are recoverable for the caller.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RankedChunk>> {
        let documents = self.loader.load_all().await?;
        if documents.is_empty() {
            return Err(Error::CorpusEmpty(self.loader.root().to_path_buf()));
        }

        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunker.chunk_document(doc))
            .collect();
        tracing::info!(
            "Total chunks created: {} from {} documents ({})",
            chunks.len(),
            documents.len(),
            self.chunker.name()
        );

        if chunks.is_empty() {
            return Err(Error::NoContentFound);
        }

        let embedded = self.embedder.embed(chunks).await?;
        let query = self.embedder.embed_query(question).await?;

        let ranked = rank(&query, embedded, self.top_k);
        if ranked.is_empty() {
            return Err(Error::NoContentFound);
        }

        tracing::debug!(
            "Top chunks: {:?}",
            ranked
                .iter()
                .map(|r| (r.chunk.record_id(), r.score))
                .collect::<Vec<_>>()
        );
        Ok(ranked)
    }
}
