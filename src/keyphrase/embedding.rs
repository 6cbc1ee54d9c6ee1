//! Embedding-similarity keyphrase extraction with maximal marginal relevance and max-sum
//! selection.

use super::{
    Diversity, KeyphraseError, KeyphraseExtractor, NgramRange, candidates::candidate_phrases,
    validate_range,
};
use crate::embedding::{EmbeddingClientError, SharedEmbeddingClient};
use crate::similarity::{argmax, normalize, unit_cosine};
use async_trait::async_trait;

/// Ranks candidate phrases by cosine similarity between their embedding and the passage's.
pub struct EmbeddingKeyphraseExtractor {
    embedder: SharedEmbeddingClient,
}

impl EmbeddingKeyphraseExtractor {
    /// Extract keyphrases using `embedder` for both the passage and its candidates.
    pub fn new(embedder: SharedEmbeddingClient) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl KeyphraseExtractor for EmbeddingKeyphraseExtractor {
    async fn extract_phrases(
        &self,
        text: &str,
        ngram_range: NgramRange,
        top_n: usize,
        diversity: Diversity,
    ) -> Result<Vec<(String, f32)>, KeyphraseError> {
        validate_range(ngram_range)?;
        let phrases: Vec<String> = candidate_phrases(text, ngram_range)
            .into_iter()
            .map(|candidate| candidate.phrase)
            .collect();
        if phrases.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let mut batch = Vec::with_capacity(phrases.len() + 1);
        batch.push(text.to_string());
        batch.extend(phrases.iter().cloned());
        let expected = batch.len();
        let vectors = self.embedder.generate_embeddings(batch).await?;
        if vectors.len() != expected {
            return Err(EmbeddingClientError::CountMismatch {
                expected,
                actual: vectors.len(),
            }
            .into());
        }

        let mut units = vectors
            .iter()
            .map(|vector| normalize(vector))
            .collect::<Result<Vec<_>, _>>()?;
        let document = units.remove(0);
        if let Some(phrase) = units.iter().find(|phrase| phrase.len() != document.len()) {
            return Err(KeyphraseError::DimensionMismatch {
                expected: document.len(),
                actual: phrase.len(),
            });
        }
        let relevance: Vec<f32> = units
            .iter()
            .map(|phrase| unit_cosine(&document, phrase))
            .collect();

        let selected = match diversity {
            Diversity::None => top_by_relevance(&relevance, top_n),
            Diversity::Mmr { diversity } => mmr(&relevance, &units, top_n, diversity),
            Diversity::MaxSum { candidates } => max_sum(&relevance, &units, top_n, candidates),
        };

        let mut scored: Vec<(String, f32)> = selected
            .into_iter()
            .map(|idx| (phrases[idx].clone(), relevance[idx]))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }
}

/// Indices of the `top_n` most relevant candidates; earlier candidates win ties.
fn top_by_relevance(relevance: &[f32], top_n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..relevance.len()).collect();
    order.sort_by(|&a, &b| relevance[b].total_cmp(&relevance[a]));
    order.truncate(top_n);
    order
}

/// Greedy maximal marginal relevance starting from the most relevant candidate.
fn mmr(relevance: &[f32], units: &[Vec<f32>], top_n: usize, diversity: f32) -> Vec<usize> {
    let Some((first, _)) = argmax(relevance) else {
        return Vec::new();
    };
    let mut selected = vec![first];
    let mut remaining: Vec<usize> = (0..relevance.len()).filter(|&idx| idx != first).collect();

    while selected.len() < top_n && !remaining.is_empty() {
        let scores: Vec<f32> = remaining
            .iter()
            .map(|&candidate| {
                let redundancy = selected
                    .iter()
                    .map(|&chosen| unit_cosine(&units[candidate], &units[chosen]))
                    .fold(f32::NEG_INFINITY, f32::max);
                (1.0 - diversity) * relevance[candidate] - diversity * redundancy
            })
            .collect();
        let Some((slot, _)) = argmax(&scores) else {
            break;
        };
        selected.push(remaining.remove(slot));
    }

    selected
}

/// Among the `pool` most relevant candidates, the `top_n` subset with the lowest total pairwise
/// similarity.
fn max_sum(relevance: &[f32], units: &[Vec<f32>], top_n: usize, pool: usize) -> Vec<usize> {
    let pool = top_by_relevance(relevance, pool.max(top_n));
    if pool.len() <= top_n {
        return pool;
    }

    let mut best: Option<(f32, Vec<usize>)> = None;
    let mut combination: Vec<usize> = (0..top_n).collect();
    loop {
        let mut total = 0.0;
        for (i, &a) in combination.iter().enumerate() {
            for &b in &combination[i + 1..] {
                total += unit_cosine(&units[pool[a]], &units[pool[b]]);
            }
        }
        if best.as_ref().is_none_or(|(lowest, _)| total < *lowest) {
            best = Some((total, combination.iter().map(|&slot| pool[slot]).collect()));
        }
        if !next_combination(&mut combination, pool.len()) {
            break;
        }
    }

    best.map(|(_, indices)| indices).unwrap_or_default()
}

/// Advance `combination` to the next k-subset of `0..n` in lexicographic order.
fn next_combination(combination: &mut [usize], n: usize) -> bool {
    let k = combination.len();
    for i in (0..k).rev() {
        if combination[i] < n - k + i {
            combination[i] += 1;
            for j in i + 1..k {
                combination[j] = combination[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
