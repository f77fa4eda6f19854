//! Cosine similarity between embedding vectors

/// Score for vectors that cannot be compared (empty or different lengths).
/// It is the minimum of cosine similarity, so such records always rank last.
pub const INVALID_SIMILARITY: f32 = -1.0;

/// Compute the cosine similarity of two vectors
///
/// Returns [`INVALID_SIMILARITY`] when either vector is empty or the lengths
/// differ. A zero norm is replaced by `1.0`, which degrades to a plain dot
/// product instead of dividing by zero. Sums are taken in double precision.
pub fn cosine_similarity(v1: &[f32], v2: &[f32]) -> f32 {
    if v1.is_empty() || v2.is_empty() || v1.len() != v2.len() {
        return INVALID_SIMILARITY;
    }

    // Accumulate in f64; long f32 sums drift near the threshold
    let dot: f64 = v1.iter().zip(v2).map(|(&a, &b)| a as f64 * b as f64).sum();
    let n1 = non_zero(norm(v1));
    let n2 = non_zero(norm(v2));

    (dot / (n1 * n2)) as f32
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt()
}

fn non_zero(n: f64) -> f64 {
    if n == 0.0 {
        1.0
    } else {
        n
    }
}
