
use thiserror::Error;

/// Vectors produced by different models (or a misconfigured one) were compared
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Cannot compare vectors of different dimensions: {left} vs {right}")]
pub struct DimensionMismatchError {
    pub left: usize,
    pub right: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`. If either vector has zero magnitude the
/// angle is undefined and the similarity is reported as `0.0`.
///
/// # Errors
///
/// Returns [`DimensionMismatchError`] when the vectors differ in length.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatchError> {
    if a.len() != b.len() {
        return Err(DimensionMismatchError {
            left: a.len(),
            right: b.len(),
        });
    }

    // Accumulate in f64 so long vectors don't lose precision
    let dot: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a = magnitude(a);
    let norm_b = magnitude(b);

    let denom = norm_a * norm_b;
    if denom < 1e-12 {
        return Ok(0.0);
    }

    let similarity = (dot / denom).clamp(-1.0, 1.0) as f32;
    // Orthogonal vectors can produce -0.0, which would order below 0.0
    if similarity == 0.0 {
        return Ok(0.0);
    }

    Ok(similarity)
}

fn magnitude(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}
