//! Keyphrase capability: pick the phrases that best represent a passage of text.
//!
//! Candidates are the 1..n-grams left after stop-word removal. [`EmbeddingKeyphraseExtractor`]
//! ranks them by embedding similarity to the passage with optional diversity-aware selection;
//! [`FrequencyKeyphraseExtractor`] ranks them by occurrence count and needs no model.

mod candidates;
mod embedding;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use embedding::EmbeddingKeyphraseExtractor;

/// Inclusive range of n-gram lengths considered as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramRange {
    /// Shortest phrase length in words.
    pub min: usize,
    /// Longest phrase length in words.
    pub max: usize,
}

impl Default for NgramRange {
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// Strategy used to trade relevance against redundancy among selected phrases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Diversity {
    /// Plain ranking by relevance.
    None,
    /// Pick the `top_n` subset of the `candidates` most relevant phrases that are least similar
    /// to each other.
    MaxSum {
        /// Size of the relevance-ranked pool the subset is drawn from.
        candidates: usize,
    },
    /// Maximal marginal relevance; `diversity` in `[0, 1]` weights redundancy against relevance.
    Mmr {
        /// Weight of the redundancy penalty.
        diversity: f32,
    },
}

impl Default for Diversity {
    fn default() -> Self {
        Self::Mmr { diversity: 0.5 }
    }
}

/// Errors raised while extracting keyphrases.
#[derive(Debug, Error)]
pub enum KeyphraseError {
    /// The requested n-gram range is empty or starts at zero.
    #[error("invalid n-gram range {min}..={max}")]
    InvalidRange {
        /// Requested minimum length.
        min: usize,
        /// Requested maximum length.
        max: usize,
    },
    /// Embedding the passage or its candidates failed.
    #[error("keyphrase embedding failed: {0}")]
    Embedding(#[from] crate::embedding::EmbeddingClientError),
    /// Candidate vectors do not share the passage vector's dimension.
    #[error("keyphrase embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the passage vector.
        expected: usize,
        /// Dimension of the offending candidate vector.
        actual: usize,
    },
    /// The embedding provider returned vectors unusable for similarity.
    #[error("keyphrase embedding unusable: {0}")]
    InvalidVector(#[from] crate::similarity::VectorError),
}

/// Interface implemented by keyphrase backends.
#[async_trait]
pub trait KeyphraseExtractor: Send + Sync {
    /// Return up to `top_n` phrases from `text` with their relevance scores, best first.
    async fn extract_phrases(
        &self,
        text: &str,
        ngram_range: NgramRange,
        top_n: usize,
        diversity: Diversity,
    ) -> Result<Vec<(String, f32)>, KeyphraseError>;
}

/// Shared handle to a keyphrase backend.
pub type SharedKeyphraseExtractor = Arc<dyn KeyphraseExtractor>;

pub(crate) fn validate_range(range: NgramRange) -> Result<(), KeyphraseError> {
    if range.min == 0 || range.min > range.max {
        return Err(KeyphraseError::InvalidRange {
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// Deterministic keyphrase backend ranking candidates by how often they occur.
///
/// Scores are occurrence counts relative to the most frequent candidate; ties keep the order of
/// first appearance. The diversity strategy is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrequencyKeyphraseExtractor;

#[async_trait]
impl KeyphraseExtractor for FrequencyKeyphraseExtractor {
    async fn extract_phrases(
        &self,
        text: &str,
        ngram_range: NgramRange,
        top_n: usize,
        _diversity: Diversity,
    ) -> Result<Vec<(String, f32)>, KeyphraseError> {
        validate_range(ngram_range)?;
        let mut ranked = candidates::candidate_phrases(text, ngram_range);
        let Some(max_count) = ranked.iter().map(|c| c.count).max() else {
            return Ok(Vec::new());
        };

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
        Ok(ranked
            .into_iter()
            .take(top_n)
            .map(|c| (c.phrase, c.count as f32 / max_count as f32))
            .collect())
    }
}
