//! Re-index the curated corpus into the persistent vector index
//!
//! Run with: cargo run -p guide-rag --features cli --bin guide-rag-refresh

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use guide_rag::{
    config::{EmbeddingBackend, RagConfig},
    embeddings::Embedder,
    ingestion::IndexRefresher,
    providers::{build_embedding_provider, LocalVectorIndex},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "guide-rag-refresh",
    about = "Chunk, tag, and upsert the curated markdown corpus into the vector index"
)]
struct RefreshCli {
    /// Optional TOML configuration file
    #[arg(long, env = "GUIDE_RAG_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to index (defaults to corpus.index_root)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Index file (defaults to vector_db.storage_path)
    #[arg(long)]
    index: Option<PathBuf>,

    /// Use the offline hashing embedder
    #[arg(long, default_value_t = false)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guide_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = RefreshCli::parse();
    let mut config = RagConfig::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.corpus.index_root = root;
    }
    if let Some(index) = cli.index {
        config.vector_db.storage_path = index;
    }
    if cli.offline {
        config.embeddings.backend = EmbeddingBackend::Hashing;
    }

    let embedder = Embedder::new(build_embedding_provider(&config.embeddings)?);
    let index = Arc::new(LocalVectorIndex::open(
        &config.vector_db.storage_path,
        &config.vector_db.collection,
        embedder,
    )?);

    let report = IndexRefresher::for_config(&config, index).refresh().await?;

    println!(
        "Indexed {} documents ({} chunks): {} new, {} total in '{}'",
        report.documents,
        report.chunks,
        report.inserted,
        report.total,
        config.vector_db.collection
    );
    Ok(())
}
