//! Similarity scoring and exhaustive top-k retrieval

pub mod similarity;
pub mod top_k;

pub use similarity::{cosine_similarity, INVALID_SIMILARITY};
pub use top_k::{top_k_search, ScoredResult};
