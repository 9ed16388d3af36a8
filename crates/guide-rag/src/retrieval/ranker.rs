//! Cosine ranking of embedded chunks against a query vector

use crate::embeddings::cosine_similarity;
use crate::types::{EmbeddedChunk, RankedChunk};

/// Order candidates by decreasing similarity and keep the best `top_k`
///
/// Ties keep discovery order.
pub fn rank(query: &[f32], candidates: Vec<EmbeddedChunk>, top_k: usize) -> Vec<RankedChunk> {
    let mut ranked: Vec<RankedChunk> = candidates
        .into_iter()
        .map(|c| RankedChunk {
            score: cosine_similarity(query, &c.vector),
            chunk: c.chunk,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_k);
    ranked
}
