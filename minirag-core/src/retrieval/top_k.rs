//! Exhaustive top-k search over a vector store

use super::cosine_similarity;
use crate::storage::{ChunkRecord, VectorStore};
use std::cmp::Ordering;

/// A stored record paired with its similarity to the query
#[derive(Debug, Clone, Copy)]
pub struct ScoredResult<'a> {
    pub score: f32,
    pub record: &'a ChunkRecord,
}

/// Score every record against `query` and return the best `k`, best first
///
/// Linear scan over the whole store. The sort is stable, so equal scores keep
/// store order. NaN scores rank below everything else.
pub fn top_k_search<'a>(query: &[f32], store: &'a VectorStore, k: usize) -> Vec<ScoredResult<'a>> {
    if k == 0 {
        return vec![];
    }

    let mut scored: Vec<ScoredResult<'a>> = store
        .all()
        .iter()
        .map(|record| ScoredResult {
            score: cosine_similarity(query, &record.embedding),
            record,
        })
        .collect();

    scored.sort_by(|a, b| {
        sort_key(b.score)
            .partial_cmp(&sort_key(a.score))
            .unwrap_or(Ordering::Equal)
    });
    scored.truncate(k);

    scored
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}
