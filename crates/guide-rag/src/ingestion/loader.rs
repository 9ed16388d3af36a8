//! Corpus loading from the filesystem

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Document;

/// Source of corpus documents
#[async_trait]
pub trait CorpusLoader: Send + Sync {
    /// Load every document, in a stable order
    async fn load_all(&self) -> Result<Vec<Document>>;

    /// Location description for logging and errors
    fn root(&self) -> &Path;
}

/// Recursive scan of a directory for files with one extension
#[derive(Debug, Clone)]
pub struct FsCorpusLoader {
    root: PathBuf,
    extension: String,
}

impl FsCorpusLoader {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_lowercase(),
        }
    }

    fn scan(root: &Path, extension: &str) -> Vec<Document> {
        if !root.is_dir() {
            tracing::warn!("Corpus root {} not found", root.display());
            return Vec::new();
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let matches = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase() == extension)
                .unwrap_or(false);
            if !matches {
                continue;
            }

            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping unreadable file {}: {}", path.display(), e);
                    continue;
                }
            };

            documents.push(Document::new(
                source_id_for(root, path),
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        tracing::info!("Loaded {} files from {}", documents.len(), root.display());
        documents
    }
}

/// Path relative to the root with `/` separators
fn source_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl CorpusLoader for FsCorpusLoader {
    async fn load_all(&self) -> Result<Vec<Document>> {
        let root = self.root.clone();
        let extension = self.extension.clone();

        tokio::task::spawn_blocking(move || Self::scan(&root, &extension))
            .await
            .map_err(|e| Error::internal(format!("Corpus scan task failed: {}", e)))
    }

    fn root(&self) -> &Path {
        &self.root
    }
}
