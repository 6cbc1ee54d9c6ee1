//! Nearest-label assignment by cosine similarity.

use super::{CategorizeError, LabelMatch, labels::ensure_unique};
use crate::embedding::{EmbeddingClientError, SharedEmbeddingClient};
use crate::similarity::{argmax, normalize, unit_cosine};
use tracing::{Instrument, Span};

/// Assigns each embedding to the label whose embedding is most similar.
///
/// Labels are embedded with the same client used for documents so both share one vector space.
pub struct LabelAssigner {
    embedder: SharedEmbeddingClient,
    span: Span,
}

impl LabelAssigner {
    /// Create an assigner that embeds labels with `embedder` and logs under `span`.
    pub fn new(embedder: SharedEmbeddingClient, span: Span) -> Self {
        Self { embedder, span }
    }

    /// Return the best label and its cosine similarity for every embedding, in input order.
    ///
    /// Labels are embedded in one batch. An empty `embeddings` slice returns an empty result
    /// without embedding anything; an empty `labels` slice is always an error.
    pub async fn assign<V>(
        &self,
        embeddings: &[V],
        labels: &[String],
    ) -> Result<Vec<LabelMatch>, CategorizeError>
    where
        V: AsRef<[f32]> + Sync,
    {
        async {
            if labels.is_empty() {
                return Err(CategorizeError::EmptyLabelSet);
            }
            ensure_unique(labels.iter().map(String::as_str))?;
            if embeddings.is_empty() {
                return Ok(Vec::new());
            }

            tracing::debug!(
                documents = embeddings.len(),
                labels = labels.len(),
                "Embedding labels"
            );
            let label_embeddings = self.embedder.generate_embeddings(labels.to_vec()).await?;
            if label_embeddings.len() != labels.len() {
                return Err(EmbeddingClientError::CountMismatch {
                    expected: labels.len(),
                    actual: label_embeddings.len(),
                }
                .into());
            }

            let matches = assign_with_label_embeddings(embeddings, labels, &label_embeddings)?;
            tracing::debug!(documents = matches.len(), "Labels assigned");
            Ok(matches)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Pure core of [`LabelAssigner::assign`] for callers that already hold label embeddings.
///
/// Vectors are L2-normalized before the dot product, so scaling any input by a positive constant
/// leaves the result unchanged. Ties go to the earliest label.
pub fn assign_with_label_embeddings<V, W>(
    embeddings: &[V],
    labels: &[String],
    label_embeddings: &[W],
) -> Result<Vec<LabelMatch>, CategorizeError>
where
    V: AsRef<[f32]>,
    W: AsRef<[f32]>,
{
    if labels.is_empty() || label_embeddings.is_empty() {
        return Err(CategorizeError::EmptyLabelSet);
    }
    if label_embeddings.len() != labels.len() {
        return Err(EmbeddingClientError::CountMismatch {
            expected: labels.len(),
            actual: label_embeddings.len(),
        }
        .into());
    }

    let dimension = label_embeddings[0].as_ref().len();
    let label_units = label_embeddings
        .iter()
        .enumerate()
        .map(|(index, vector)| unit_vector(vector.as_ref(), dimension, "label", index))
        .collect::<Result<Vec<_>, _>>()?;

    embeddings
        .iter()
        .enumerate()
        .map(|(index, vector)| {
            let unit = unit_vector(vector.as_ref(), dimension, "document", index)?;
            let scores: Vec<f32> = label_units
                .iter()
                .map(|label| unit_cosine(&unit, label))
                .collect();
            let (label_index, score) = argmax(&scores).ok_or(CategorizeError::EmptyLabelSet)?;
            Ok(LabelMatch {
                label: labels[label_index].clone(),
                label_index,
                score,
            })
        })
        .collect()
}

fn unit_vector(
    vector: &[f32],
    dimension: usize,
    kind: &'static str,
    index: usize,
) -> Result<Vec<f32>, CategorizeError> {
    if vector.len() != dimension {
        return Err(CategorizeError::DimensionMismatch {
            expected: dimension,
            actual: vector.len(),
        });
    }
    normalize(vector).map_err(|reason| CategorizeError::InvalidEmbedding {
        kind,
        index,
        reason,
    })
}
