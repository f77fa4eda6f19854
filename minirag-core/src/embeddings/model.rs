//! Embedding model abstraction
//!
//! Embedders turn text into vectors. An empty vector is a valid answer for
//! blank input; retrieval scores it as a non-match.

use super::Result;

/// Trait for embedding models (allows swapping in fakes)
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, one vector per input in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Offline embedder using the hashing trick over lowercase words
///
/// Texts that share words point in similar directions, so retrieval behaves
/// sensibly without network access. Output is deterministic and L2
/// normalized.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dim: usize,
}

impl MockEmbeddingModel {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        if text.trim().is_empty() {
            return vec![];
        }

        let mut buckets = vec![0.0f32; self.dim];
        if self.dim == 0 {
            return buckets;
        }

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(&word.to_lowercase());
            let bucket = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            buckets[bucket] += sign;
        }

        let norm = buckets.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            buckets.iter_mut().for_each(|x| *x /= norm);
        }
        buckets
    }
}

impl Embedder for MockEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}
