//! Chunked keyphrase extraction for long documents.

use super::{ExtractionDegraded, KeywordOutcome};
use crate::keyphrase::{Diversity, NgramRange, SharedKeyphraseExtractor};
use std::collections::HashSet;
use tracing::{Instrument, Span};

/// Splits text into word-wrapped chunks and collects representative phrases from each.
pub struct KeywordExtractor {
    extractor: SharedKeyphraseExtractor,
    ngram_range: NgramRange,
    diversity: Diversity,
    span: Span,
}

impl KeywordExtractor {
    /// Extract 1–3-gram phrases with maximal marginal relevance at diversity 0.5.
    pub fn new(extractor: SharedKeyphraseExtractor, span: Span) -> Self {
        Self {
            extractor,
            ngram_range: NgramRange::default(),
            diversity: Diversity::default(),
            span,
        }
    }

    /// Use a different selection strategy, e.g. [`Diversity::MaxSum`].
    pub fn with_diversity(mut self, diversity: Diversity) -> Self {
        self.diversity = diversity;
        self
    }

    /// Extract up to `top_n` phrases per `chunk_size`-character chunk.
    ///
    /// Phrases are concatenated in chunk order and deduplicated keeping the first occurrence.
    /// A chunk whose extraction fails contributes nothing and is listed in
    /// [`KeywordOutcome::degraded`]; the remaining chunks are still processed.
    pub async fn extract(&self, text: &str, top_n: usize, chunk_size: usize) -> KeywordOutcome {
        async {
            let chunks = wrap_text(text, chunk_size);
            let mut outcome = KeywordOutcome::default();
            let mut seen = HashSet::new();

            for (chunk_index, chunk) in chunks.iter().enumerate() {
                match self
                    .extractor
                    .extract_phrases(chunk, self.ngram_range, top_n, self.diversity)
                    .await
                {
                    Ok(phrases) => {
                        for (phrase, _) in phrases {
                            if seen.insert(phrase.clone()) {
                                outcome.keywords.push(phrase);
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(chunk_index, error = %error, "Keyword extraction degraded");
                        outcome.degraded.push(ExtractionDegraded {
                            chunk_index,
                            reason: error.to_string(),
                        });
                    }
                }
            }

            tracing::debug!(
                chunks = chunks.len(),
                keywords = outcome.keywords.len(),
                degraded = outcome.degraded.len(),
                "Keywords extracted"
            );
            outcome
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Greedy word wrap into lines of at most `width` characters.
///
/// Whitespace runs collapse to single spaces. Words longer than `width` are broken, filling the
/// remainder of the current line first. A `width` of 0 disables wrapping.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
        return if joined.is_empty() {
            Vec::new()
        } else {
            vec![joined]
        };
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut rest = word;
        while !rest.is_empty() {
            let rest_len = rest.chars().count();
            let separator = usize::from(line_len > 0);
            if line_len + separator + rest_len <= width {
                if separator == 1 {
                    line.push(' ');
                }
                line.push_str(rest);
                line_len += separator + rest_len;
                break;
            }

            if rest_len > width {
                let room = width.saturating_sub(line_len + separator);
                if room > 0 {
                    let split = rest
                        .char_indices()
                        .nth(room)
                        .map_or(rest.len(), |(idx, _)| idx);
                    if separator == 1 {
                        line.push(' ');
                    }
                    line.push_str(&rest[..split]);
                    rest = &rest[split..];
                }
            }

            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyphrase::{FrequencyKeyphraseExtractor, KeyphraseError, KeyphraseExtractor};
    use async_trait::async_trait;
    use std::sync::Arc;

    #[test]
    fn wrap_respects_width_and_word_boundaries() {
        let lines = wrap_text("alpha beta  gamma\ndelta", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
        assert!(lines.iter().all(|line| line.chars().count() <= 11));
    }

    #[test]
    fn wrap_breaks_long_words() {
        assert_eq!(wrap_text("aa bbbbbbbbbb", 5), vec!["aa bb", "bbbbb", "bbb"]);
        assert_eq!(wrap_text("aaaa bbbbbbbbbb", 5), vec!["aaaa", "bbbbb", "bbbbb"]);
    }

    #[test]
    fn wrap_handles_empty_and_unbounded_input() {
        assert!(wrap_text("   ", 10).is_empty());
        assert_eq!(wrap_text("one  two", 0), vec!["one two"]);
    }

    #[tokio::test]
    async fn phrase_seen_in_two_chunks_is_emitted_once_at_first_position() {
        let extractor = KeywordExtractor::new(Arc::new(FrequencyKeyphraseExtractor), Span::none());
        let outcome = extractor
            .extract("firewall malware firewall ransomware", 1, 17)
            .await;
        // chunks: "firewall malware" | "firewall" | "ransomware"
        assert_eq!(outcome.keywords, vec!["firewall", "ransomware"]);
        assert!(outcome.degraded.is_empty());
    }

    /// Fails on any chunk containing "boom".
    struct Flaky;

    #[async_trait]
    impl KeyphraseExtractor for Flaky {
        async fn extract_phrases(
            &self,
            text: &str,
            ngram_range: NgramRange,
            top_n: usize,
            diversity: Diversity,
        ) -> Result<Vec<(String, f32)>, KeyphraseError> {
            if text.contains("boom") {
                return Err(KeyphraseError::InvalidRange { min: 0, max: 0 });
            }
            FrequencyKeyphraseExtractor
                .extract_phrases(text, ngram_range, top_n, diversity)
                .await
        }
    }

    #[tokio::test]
    async fn failing_chunk_degrades_without_aborting() {
        let extractor = KeywordExtractor::new(Arc::new(Flaky), Span::none());
        let outcome = extractor.extract("sensor boom network", 5, 7).await;
        assert_eq!(outcome.keywords, vec!["sensor", "network"]);
        assert_eq!(outcome.degraded.len(), 1);
        assert_eq!(outcome.degraded[0].chunk_index, 1);
    }

    /// Embedder that answers every request with no vectors.
    struct Empty;

    #[async_trait]
    impl crate::embedding::EmbeddingClient for Empty {
        async fn generate_embeddings(
            &self,
            _texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, crate::embedding::EmbeddingClientError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn short_embedding_batch_degrades_the_chunk() {
        let extractor = KeywordExtractor::new(
            Arc::new(crate::keyphrase::EmbeddingKeyphraseExtractor::new(Arc::new(Empty))),
            Span::none(),
        );
        let outcome = extractor.extract("firewall malware report", 5, 100).await;
        assert!(outcome.keywords.is_empty());
        assert_eq!(outcome.degraded.len(), 1);
        assert_eq!(outcome.degraded[0].chunk_index, 0);
    }
}
