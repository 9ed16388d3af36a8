//! Application state for the RAG server

use std::sync::Arc;

use crate::config::{Environment, RagConfig};
use crate::error::Result;
use crate::ingestion::{IndexRefresher, RefreshReport};
use crate::pipeline::{PipelineContext, QueryPipeline};
use crate::providers::VectorIndex;

use super::rate_limit::RateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Startup collaborators
    context: PipelineContext,
    /// Query pipeline built from the context
    pipeline: QueryPipeline,
    /// Curated index maintenance
    refresher: IndexRefresher,
    /// Per-IP throttling of the query route
    rate_limiter: RateLimiter,
}

impl AppState {
    /// Create new application state from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing application state (environment: {:?}, model mode: {:?})...",
            config.environment,
            config.llm.mode
        );
        let context = PipelineContext::from_config(config)?;
        Ok(Self::from_context(context))
    }

    /// Create state around an already built context
    pub fn from_context(context: PipelineContext) -> Self {
        let pipeline = QueryPipeline::new(&context);
        let refresher = context.refresher();
        let rate_limiter = RateLimiter::per_hour(context.config.server.rate_limit_per_hour);

        tracing::info!("Application state initialized");

        Self {
            inner: Arc::new(AppStateInner {
                context,
                pipeline,
                refresher,
                rate_limiter,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.context.config
    }

    /// Whether the query route runs the pipeline
    pub fn serves_queries(&self) -> bool {
        self.config().environment == Environment::Dev
    }

    /// Get the query pipeline
    pub fn pipeline(&self) -> &QueryPipeline {
        &self.inner.pipeline
    }

    /// Get the vector index
    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.inner.context.index
    }

    /// Get the rate limiter
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Re-index the curated corpus
    pub async fn refresh_index(&self) -> Result<RefreshReport> {
        self.inner.refresher.refresh().await
    }

    /// Populate the index before serving if it is empty and bootstrapping is enabled
    pub async fn bootstrap(&self) -> Result<()> {
        if !self.config().vector_db.index_on_startup {
            return Ok(());
        }

        let count = self.index().count().await?;
        if count > 0 {
            tracing::info!("Index already holds {} records", count);
            return Ok(());
        }

        tracing::info!("Index is empty, running initial refresh");
        match self.refresh_index().await {
            Ok(report) => {
                tracing::info!("Initial refresh stored {} records", report.inserted);
                Ok(())
            }
            Err(e) if e.is_recoverable() || matches!(e, crate::error::Error::Config(_)) => {
                tracing::warn!("Initial refresh skipped: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
