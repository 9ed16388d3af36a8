//! Out-of-band re-indexing of the curated corpus into the vector index

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::VectorIndex;
use crate::types::IndexedRecord;

use super::chunker::Chunker;
use super::loader::{CorpusLoader, FsCorpusLoader};
use super::tagger::Tagger;

/// Summary of one refresh run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Documents scanned
    pub documents: usize,
    /// Chunks produced
    pub chunks: usize,
    /// Records newly added to the index
    pub inserted: usize,
    /// Records in the index afterwards
    pub total: usize,
}

/// Rebuilds index records from the corpus; at most one run at a time
pub struct IndexRefresher {
    loader: Arc<dyn CorpusLoader>,
    chunker: Arc<dyn Chunker>,
    tagger: Tagger,
    index: Arc<dyn VectorIndex>,
    running: Mutex<()>,
}

impl IndexRefresher {
    pub fn new(
        loader: Arc<dyn CorpusLoader>,
        chunker: Arc<dyn Chunker>,
        tagger: Tagger,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            loader,
            chunker,
            tagger,
            index,
            running: Mutex::new(()),
        }
    }

    /// Refresher over `corpus.index_root` using `chunking.index_strategy`
    pub fn for_config(config: &RagConfig, index: Arc<dyn VectorIndex>) -> Self {
        let loader = Arc::new(FsCorpusLoader::new(
            &config.corpus.index_root,
            &config.corpus.extension,
        ));
        let chunker: Arc<dyn Chunker> = config.chunking.index_strategy.build(&config.chunking).into();

        Self::new(loader, chunker, Tagger::new(&config.corpus.collection_tag), index)
    }

    /// Chunk, tag, and upsert every corpus document
    ///
    /// Fails with `RefreshInProgress` if another refresh holds the guard.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let _guard = self.running.try_lock().map_err(|_| Error::RefreshInProgress)?;

        let root = self.loader.root();
        if !root.is_dir() {
            tracing::error!("Path not found: {}", root.display());
            return Err(Error::Config(format!("Index root not found: {}", root.display())));
        }

        tracing::info!("Refreshing index '{}' from {}", self.index.name(), root.display());

        let documents = self.loader.load_all().await?;
        let records: Vec<IndexedRecord> = documents
            .iter()
            .flat_map(|doc| self.chunker.chunk_document(doc))
            .map(|chunk| self.tagger.record(&chunk))
            .collect();

        let inserted = if records.is_empty() {
            tracing::warn!("No chunks found to store");
            0
        } else {
            self.index.upsert(&records).await?
        };

        let report = RefreshReport {
            documents: documents.len(),
            chunks: records.len(),
            inserted,
            total: self.index.count().await?,
        };

        tracing::info!(
            "Refresh complete: {} documents, {} chunks, {} new, {} total",
            report.documents,
            report.chunks,
            report.inserted,
            report.total
        );
        Ok(report)
    }
}
