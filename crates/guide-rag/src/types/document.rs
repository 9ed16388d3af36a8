//! Document, chunk, and index record types

use serde::{Deserialize, Serialize};

/// A source document loaded from the corpus
///
/// Immutable once loaded; discarded after chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier (path relative to the corpus root, `/`-separated)
    pub source_id: String,
    /// Raw text content
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// A bounded span of text derived from one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier
    pub source_id: String,
    /// Chunk text
    pub text: String,
    /// Position of this chunk within its document (0-based)
    pub sequence_index: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(source_id: impl Into<String>, text: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
            sequence_index,
        }
    }

    /// Deterministic record id used for idempotent indexing
    pub fn record_id(&self) -> String {
        format!("{}-{}", self.sequence_index, self.source_id)
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk annotated with its embedding vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Metadata persisted alongside each indexed record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Source document identifier
    pub source: String,
    /// Tags derived from the source path and text content
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A chunk as stored in the vector index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedRecord {
    /// `{sequence_index}-{source_id}`
    pub id: String,
    pub text: String,
    pub metadata: RecordMetadata,
    /// Position of the chunk within its source document
    #[serde(default)]
    pub sequence_index: usize,
}

impl IndexedRecord {
    /// Build a record from a chunk and its tags
    pub fn from_chunk(chunk: &Chunk, tags: Vec<String>) -> Self {
        Self {
            id: chunk.record_id(),
            text: chunk.text.clone(),
            metadata: RecordMetadata {
                source: chunk.source_id.clone(),
                tags,
            },
            sequence_index: chunk.sequence_index,
        }
    }

    /// Recover the chunk this record was built from
    pub fn to_chunk(&self) -> Chunk {
        Chunk::new(self.metadata.source.clone(), self.text.clone(), self.sequence_index)
    }
}
