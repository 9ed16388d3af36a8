//! Index status and maintenance endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::ingestion::RefreshReport;
use crate::server::state::AppState;
use crate::types::IndexStatus;

/// GET /api/index - Collection name and record count
pub async fn index_status(State(state): State<AppState>) -> Result<Json<IndexStatus>> {
    Ok(Json(IndexStatus {
        collection: state.index().name().to_string(),
        records: state.index().count().await?,
    }))
}

/// POST /api/index/refresh - Re-index the curated corpus
pub async fn refresh_index(State(state): State<AppState>) -> Result<Json<RefreshReport>> {
    let report = state.refresh_index().await?;
    Ok(Json(report))
}
