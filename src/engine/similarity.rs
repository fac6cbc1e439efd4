//! Bounded semantic similarity between section embeddings

use crate::engine::embedder::is_zero_vector;
use crate::error::{MatcherError, Result};

/// Cosine similarity rescaled from [-1,1] to [0,1] via `(cos + 1) / 2`.
/// The rescale keeps every contribution non-negative for the downstream
/// weighted aggregation. A zero-sentinel on either side means "no content"
/// and scores 0.0 regardless of the other vector.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(MatcherError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if is_zero_vector(a) || is_zero_vector(b) {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    let cosine = dot_product / (norm_a * norm_b);
    Ok(((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
}
