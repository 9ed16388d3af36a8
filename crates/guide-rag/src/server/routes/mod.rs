//! API routes for the RAG server

pub mod index;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Query
        .route("/query", post(query::query))
        // Index
        .route("/index", get(index::index_status))
        .route("/index/refresh", post(index::refresh_index))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "guide-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over a markdown guide corpus",
        "endpoints": {
            "POST /api/query": "Ask a question ({\"question\": \"...\"})",
            "GET /api/index": "Collection name and record count",
            "POST /api/index/refresh": "Re-index the curated corpus",
            "GET /api/info": "This document"
        },
        "routes": ["fast_path", "local_index", "generated", "fallback", "unavailable"]
    }))
}
