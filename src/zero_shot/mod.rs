//! Zero-shot classification capability used to refine discovered topic names.
//!
//! A classifier ranks candidate labels against a text without label-specific training. The
//! HTTP client targets a hosted inference endpoint; the lexical classifier is a deterministic
//! fallback that scores labels by token overlap.

mod http;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpZeroShotClassifier;

/// Errors surfaced by zero-shot classifiers.
#[derive(Debug, Error)]
pub enum ZeroShotError {
    /// Endpoint could not be reached.
    #[error("Zero-shot classifier unavailable: {0}")]
    ProviderUnavailable(String),
    /// Endpoint answered with an error status.
    #[error("Zero-shot classification failed: {0}")]
    RequestFailed(String),
    /// Endpoint answered with a body that could not be interpreted.
    #[error("Malformed zero-shot response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by zero-shot classifiers.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Rank `labels` against `text` in multi-label mode, best first.
    ///
    /// Scores are independent per label. An empty label list yields an empty ranking.
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<(String, f32)>, ZeroShotError>;
}

/// Shared handle to a zero-shot classifier.
pub type SharedZeroShotClassifier = Arc<dyn ZeroShotClassifier>;

/// Deterministic classifier scoring each label by how often its words occur in the text.
///
/// A label's score is the mean relative frequency of its words among the text's words. Ties keep
/// the order in which labels were supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalZeroShotClassifier;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

#[async_trait]
impl ZeroShotClassifier for LexicalZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<(String, f32)>, ZeroShotError> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;
        for word in words(text) {
            *counts.entry(word).or_default() += 1;
            total += 1;
        }

        let mut ranked: Vec<(String, f32)> = labels
            .iter()
            .map(|label| {
                let label_words: Vec<String> = words(label).collect();
                let score = if total == 0 || label_words.is_empty() {
                    0.0
                } else {
                    let hits: usize = label_words
                        .iter()
                        .map(|word| counts.get(word).copied().unwrap_or(0))
                        .sum();
                    hits as f32 / (total * label_words.len()) as f32
                };
                (label.clone(), score)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }
}
