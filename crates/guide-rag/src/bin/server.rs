//! Guide RAG server binary
//!
//! Run with: cargo run -p guide-rag --bin guide-rag-server

use std::path::PathBuf;

use guide_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guide_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("GUIDE_RAG_CONFIG").ok().map(PathBuf::from);
    let config = RagConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Environment: {:?}", config.environment);
    tracing::info!("  - Corpus: {}", config.corpus.root.display());
    tracing::info!("  - Index: {}", config.vector_db.storage_path.display());
    tracing::info!("  - Embeddings: {:?} ({})", config.embeddings.backend, config.embeddings.model);
    tracing::info!("  - Model mode: {:?}", config.llm.mode);
    tracing::info!("  - Confidence threshold: {}", config.retrieval.confidence_threshold);

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/query         - Ask a question");
    println!("  GET  /api/index         - Index status");
    println!("  POST /api/index/refresh - Re-index the curated corpus");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
