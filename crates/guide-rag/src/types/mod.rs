//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, EmbeddedChunk, IndexedRecord, RecordMetadata};
pub use query::{QueryRequest, RankedChunk, RetrievalResult};
pub use response::{Answer, AnswerRoute, IndexStatus, QueryResponse};
