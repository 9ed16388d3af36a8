//! Text chunking strategies
//!
//! Two interchangeable policies: fixed-length character windows for the
//! full-corpus path, and blank-line paragraphs for the index refresh.

use serde::{Deserialize, Serialize};

use crate::config::ChunkingConfig;
use crate::types::{Chunk, Document};

/// Splits a document's text into ordered chunks
pub trait Chunker: Send + Sync {
    /// Chunk raw text belonging to `source_id`
    fn chunk(&self, source_id: &str, text: &str) -> Vec<Chunk>;

    /// Chunk a whole document
    fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.chunk(&doc.source_id, &doc.text)
    }

    /// Strategy name for logging
    fn name(&self) -> &str;
}

/// Consecutive, non-overlapping windows of `max_length` characters
///
/// Concatenating the chunks of a document reproduces its text exactly.
#[derive(Debug, Clone)]
pub struct FixedLengthChunker {
    max_length: usize,
}

impl FixedLengthChunker {
    /// Create a new chunker; a zero length is treated as 1
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Chunker for FixedLengthChunker {
    fn chunk(&self, source_id: &str, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut window = String::new();
        let mut window_chars = 0usize;

        for ch in text.chars() {
            window.push(ch);
            window_chars += 1;

            if window_chars == self.max_length {
                chunks.push(Chunk::new(source_id, std::mem::take(&mut window), chunks.len()));
                window_chars = 0;
            }
        }

        if !window.is_empty() {
            chunks.push(Chunk::new(source_id, window, chunks.len()));
        }

        tracing::debug!("Created {} chunks from {}", chunks.len(), source_id);
        chunks
    }

    fn name(&self) -> &str {
        "fixed-length"
    }
}

/// Blank-line delimited paragraphs, trimmed, with tiny fragments dropped
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    /// Paragraphs whose trimmed length is at most this many characters are discarded
    min_length: usize,
}

impl ParagraphChunker {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, source_id: &str, text: &str) -> Vec<Chunk> {
        let text = text.replace("\r\n", "\n");
        let chunks: Vec<Chunk> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| p.chars().count() > self.min_length)
            .enumerate()
            .map(|(i, p)| Chunk::new(source_id, p, i))
            .collect();

        tracing::debug!("Chunked {} into {} parts", source_id, chunks.len());
        chunks
    }

    fn name(&self) -> &str {
        "paragraph"
    }
}

/// Chunking policy selectable per corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkStrategy {
    FixedLength,
    Paragraph,
}

impl ChunkStrategy {
    /// Build the chunker for this strategy from configuration
    pub fn build(self, config: &ChunkingConfig) -> Box<dyn Chunker> {
        match self {
            Self::FixedLength => Box::new(FixedLengthChunker::new(config.max_chunk_length)),
            Self::Paragraph => Box::new(ParagraphChunker::new(config.paragraph_min_length)),
        }
    }
}
