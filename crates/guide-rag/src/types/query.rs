//! Query request and retrieval result types

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Query request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

impl QueryRequest {
    /// Create a new query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// A chunk returned by the vector index with its distance (lower = more similar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk: Chunk,
    pub distance: f32,
}

impl RetrievalResult {
    pub fn new(chunk: Chunk, distance: f32) -> Self {
        Self { chunk, distance }
    }
}

/// A chunk ranked by the full-corpus path (higher score = more relevant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the question embedding
    pub score: f32,
}
