//! Query endpoint

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{Answer, AnswerRoute, QueryRequest, QueryResponse};

/// Answer served when the query route is disabled outside development
pub const NOT_HOSTED_MESSAGE: &str = "Hello!\n\
Thank you for visiting. This assistant runs locally, but is not yet hosted for wider access.";

/// POST /api/query - Answer a question
pub async fn query(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<QueryRequest>,
) -> Result<Response> {
    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.rate_limiter().check(client) {
        tracing::warn!("Rate limit exceeded for {}", client);
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "detail": "Rate limit exceeded. Please try again later." })),
        )
            .into_response());
    }

    if !state.serves_queries() {
        let answer = Answer::new(NOT_HOSTED_MESSAGE, AnswerRoute::Unavailable);
        return Ok(Json(QueryResponse::from(answer)).into_response());
    }

    let start = Instant::now();
    tracing::info!("Query: \"{}\"", request.question);

    let answer = state.pipeline().answer(&request.question).await?;

    tracing::info!(
        "Answered via {:?} in {}ms",
        answer.route,
        start.elapsed().as_millis()
    );
    Ok(Json(QueryResponse::from(answer)).into_response())
}
