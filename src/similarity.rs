//! Vector math shared by label assignment and keyphrase ranking.
//!
//! All similarity is cosine similarity computed as the dot product of L2-normalized vectors.

use thiserror::Error;

/// Reasons a vector cannot take part in cosine similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    /// Every component is zero, so the direction is undefined.
    #[error("vector has zero norm")]
    ZeroNorm,
    /// At least one component is NaN or infinite.
    #[error("vector contains non-finite values")]
    NonFinite,
}

/// Return a unit-length copy of `vector`.
pub fn normalize(vector: &[f32]) -> Result<Vec<f32>, VectorError> {
    if vector.iter().any(|value| !value.is_finite()) {
        return Err(VectorError::NonFinite);
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if !norm.is_finite() {
        return Err(VectorError::NonFinite);
    }
    if norm == 0.0 {
        return Err(VectorError::ZeroNorm);
    }

    Ok(vector.iter().map(|v| v / norm).collect())
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Dot product of unit vectors, clamped to `[-1, 1]` to absorb rounding.
pub fn unit_cosine(a: &[f32], b: &[f32]) -> f32 {
    dot(a, b).clamp(-1.0, 1.0)
}

/// Index and value of the largest score; the first index wins ties.
pub(crate) fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (idx, score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((idx, score)),
        })
}
