//! guide-rag: question answering over a markdown guide corpus
//!
//! A curated local index answers confident matches directly. Otherwise the
//! whole corpus is chunked, embedded, and ranked against the question, and a
//! bounded prompt is sent to the configured language model.

pub mod config;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{PipelineContext, QueryPipeline, FALLBACK_MESSAGE};
pub use types::{
    document::{Chunk, Document, EmbeddedChunk, IndexedRecord},
    query::{QueryRequest, RetrievalResult},
    response::{Answer, AnswerRoute, QueryResponse},
};
