//! Corpus ingestion: loading, chunking, tagging, and index refresh

mod chunker;
mod loader;
mod refresh;
mod tagger;

pub use chunker::{ChunkStrategy, Chunker, FixedLengthChunker, ParagraphChunker};
pub use loader::{CorpusLoader, FsCorpusLoader};
pub use refresh::{IndexRefresher, RefreshReport};
pub use tagger::Tagger;
