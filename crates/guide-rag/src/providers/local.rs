//! Local vector index persisted as a single JSON file
//!
//! Records are embedded on insert and kept in memory for brute-force cosine
//! search. Every upsert rewrites the file atomically (tmp + rename); a failed
//! write leaves the collection dirty and the next upsert retries it.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::embeddings::{cosine_distance, Embedder};
use crate::error::{Error, Result};
use crate::types::{IndexedRecord, RetrievalResult};

use super::vector_store::VectorIndex;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(flatten)]
    record: IndexedRecord,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCollection {
    name: String,
    records: Vec<StoredRecord>,
}

#[derive(Default)]
struct Collection {
    records: Vec<StoredRecord>,
    ids: HashSet<String>,
    /// Bumped on every insert
    version: u64,
    /// Version last written to disk
    persisted: u64,
}

impl Collection {
    fn insert(&mut self, stored: StoredRecord) -> bool {
        if !self.ids.insert(stored.record.id.clone()) {
            return false;
        }
        self.records.push(stored);
        self.version += 1;
        true
    }

    fn is_dirty(&self) -> bool {
        self.version != self.persisted
    }
}

/// File-backed vector index
pub struct LocalVectorIndex {
    name: String,
    path: Option<PathBuf>,
    embedder: Embedder,
    inner: RwLock<Collection>,
}

impl LocalVectorIndex {
    /// Open (or create) the collection stored at `path`
    pub fn open(path: impl Into<PathBuf>, name: impl Into<String>, embedder: Embedder) -> Result<Self> {
        let path = path.into();
        let name = name.into();
        let mut collection = Collection::default();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let stored: StoredCollection = serde_json::from_str(&raw).map_err(|e| {
                Error::dependency("vector-index", format!("Corrupt index {}: {}", path.display(), e))
            })?;
            if stored.name != name {
                tracing::warn!(
                    "Index file {} holds collection '{}', expected '{}'",
                    path.display(),
                    stored.name,
                    name
                );
            }
            for record in stored.records {
                collection.insert(record);
            }
            collection.persisted = collection.version;
        }

        tracing::info!(
            "Opened collection '{}' at {} with {} records",
            name,
            path.display(),
            collection.records.len()
        );

        Ok(Self {
            name,
            path: Some(path),
            embedder,
            inner: RwLock::new(collection),
        })
    }

    /// Non-persistent index
    pub fn in_memory(name: impl Into<String>, embedder: Embedder) -> Self {
        Self {
            name: name.into(),
            path: None,
            embedder,
            inner: RwLock::new(Collection::default()),
        }
    }

    /// Storage path, if persistent
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            let mut inner = self.inner.write();
            inner.persisted = inner.version;
            return Ok(());
        };

        let (json, version) = {
            let inner = self.inner.read();
            let snapshot = StoredCollection {
                name: self.name.clone(),
                records: inner.records.clone(),
            };
            (serde_json::to_vec(&snapshot)?, inner.version)
        };

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

        let mut inner = self.inner.write();
        inner.persisted = inner.persisted.max(version);
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn upsert(&self, records: &[IndexedRecord]) -> Result<usize> {
        let fresh: Vec<IndexedRecord> = {
            let inner = self.inner.read();
            let mut seen = HashSet::new();
            records
                .iter()
                .filter(|r| !inner.ids.contains(&r.id) && seen.insert(r.id.clone()))
                .cloned()
                .collect()
        };

        if fresh.is_empty() {
            tracing::info!("All {} records already present in '{}'", records.len(), self.name);
            let dirty = self.inner.read().is_dirty();
            if dirty {
                tracing::warn!("Retrying unsaved write of '{}'", self.name);
                self.persist().await?;
            }
            return Ok(0);
        }

        let chunks = fresh.iter().map(IndexedRecord::to_chunk).collect();
        let embedded = self.embedder.embed(chunks).await?;

        let inserted = {
            let mut inner = self.inner.write();
            fresh
                .into_iter()
                .zip(embedded)
                .filter(|(record, e)| {
                    inner.insert(StoredRecord {
                        record: record.clone(),
                        embedding: e.vector.clone(),
                    })
                })
                .count()
        };

        self.persist().await?;
        tracing::info!(
            "Added {} records to '{}' ({} skipped)",
            inserted,
            self.name,
            records.len() - inserted
        );
        Ok(inserted)
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        if top_k == 0 || self.inner.read().records.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed_query(text).await?;

        let inner = self.inner.read();
        let mut results: Vec<RetrievalResult> = inner
            .records
            .iter()
            .map(|stored| {
                RetrievalResult::new(
                    stored.record.to_chunk(),
                    cosine_distance(&query, &stored.embedding),
                )
            })
            .collect();

        // Stable sort keeps insertion order on equal distances
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(top_k);
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().records.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::HashingEmbedder;
    use crate::types::Chunk;
    use std::sync::Arc;

    fn embedder() -> Embedder {
        Embedder::new(Arc::new(HashingEmbedder::new(384)))
    }

    fn record(seq: usize, source: &str, text: &str) -> IndexedRecord {
        IndexedRecord::from_chunk(&Chunk::new(source, text, seq), vec!["base".into()])
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let index = LocalVectorIndex::in_memory("project-docs", embedder());
        let records = vec![
            record(0, "a.md", "Install git and configure it"),
            record(1, "a.md", "Create a virtual environment"),
        ];

        assert_eq!(index.upsert(&records).await.unwrap(), 2);
        assert_eq!(index.upsert(&records).await.unwrap(), 0);
        assert_eq!(index.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_existing_ids_are_not_overwritten() {
        let index = LocalVectorIndex::in_memory("project-docs", embedder());
        index.upsert(&[record(0, "a.md", "original text")]).await.unwrap();
        index.upsert(&[record(0, "a.md", "replacement text")]).await.unwrap();

        let results = index.query("original text", 1).await.unwrap();
        assert_eq!(results[0].chunk.text, "original text");
    }

    #[tokio::test]
    async fn test_duplicate_ids_within_batch_count_once() {
        let index = LocalVectorIndex::in_memory("project-docs", embedder());
        let inserted = index
            .upsert(&[record(0, "a.md", "one"), record(0, "a.md", "two")])
            .await
            .unwrap();
        assert_eq!(inserted, 1);
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let index = LocalVectorIndex::in_memory("project-docs", embedder());
        index
            .upsert(&[
                record(0, "a.md", "audio guides for the explore section"),
                record(1, "b.md", "clone the git repository"),
                record(2, "c.md", "the git repository clone"),
            ])
            .await
            .unwrap();

        let results = index.query("git clone repository", 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(results[2].chunk.source_id, "a.md");

        // same token set gives an exact tie; insertion order wins
        assert_eq!(results[0].chunk.source_id, "b.md");
        assert_eq!(results[1].chunk.source_id, "c.md");
    }

    #[tokio::test]
    async fn test_empty_index_query_is_empty() {
        let index = LocalVectorIndex::in_memory("project-docs", embedder());
        assert!(index.query("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.json");

        {
            let index = LocalVectorIndex::open(&path, "project-docs", embedder()).unwrap();
            index.upsert(&[record(0, "a.md", "persist me please")]).await.unwrap();
        }

        let reopened = LocalVectorIndex::open(&path, "project-docs", embedder()).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        assert_eq!(reopened.upsert(&[record(0, "a.md", "persist me please")]).await.unwrap(), 0);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["records"][0]["id"], "0-a.md");
        assert_eq!(raw["records"][0]["metadata"]["source"], "a.md");
    }

    #[tokio::test]
    async fn test_failed_write_is_retried_on_next_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("index.json");

        let index = LocalVectorIndex::open(&path, "project-docs", embedder()).unwrap();
        let records = [record(0, "a.md", "persist me please")];
        assert!(index.upsert(&records).await.is_err());

        std::fs::remove_file(&blocker).unwrap();
        assert_eq!(index.upsert(&records).await.unwrap(), 0);
        assert!(path.exists());

        let reopened = LocalVectorIndex::open(&path, "project-docs", embedder()).unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
