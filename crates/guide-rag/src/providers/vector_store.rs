//! Vector index trait for storing records and querying by text

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{IndexedRecord, RetrievalResult};

/// Trait for a persistent, text-queried vector index
///
/// Implementations:
/// - `LocalVectorIndex`: JSON-file backed collection with cosine distance
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert records whose id is not yet present; returns how many were inserted
    ///
    /// Existing ids are skipped, never overwritten.
    async fn upsert(&self, records: &[IndexedRecord]) -> Result<usize>;

    /// Nearest records to `text`, ascending by distance (best first)
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalResult>>;

    /// Get total number of records stored
    async fn count(&self) -> Result<usize>;

    /// Check if index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    /// Get index name for logging
    fn name(&self) -> &str;
}
