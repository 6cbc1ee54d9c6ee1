//! Two-level categorization: main label first, then the winning category's subcategories.

use super::{CategorizeError, HierarchicalMatch, LabelAssigner, LabelTree};
use crate::embedding::SharedEmbeddingClient;
use tracing::{Instrument, Span};

/// Runs [`LabelAssigner`] over main labels and then, per main group, over that category's
/// subcategories.
pub struct HierarchicalCategorizer {
    assigner: LabelAssigner,
    span: Span,
}

impl HierarchicalCategorizer {
    /// Create a categorizer embedding labels with `embedder` and logging under `span`.
    pub fn new(embedder: SharedEmbeddingClient, span: Span) -> Self {
        Self {
            assigner: LabelAssigner::new(embedder, span.clone()),
            span,
        }
    }

    /// Assign a main label and, where the taxonomy refines it, a subcategory to every embedding.
    ///
    /// The confidence is the main-label score; the subcategory score is reported separately and
    /// is 0 when the main label has no subcategories.
    pub async fn assign_hierarchical<V>(
        &self,
        embeddings: &[V],
        tree: &LabelTree,
    ) -> Result<Vec<HierarchicalMatch>, CategorizeError>
    where
        V: AsRef<[f32]> + Sync,
    {
        async {
            if tree.is_empty() {
                return Err(CategorizeError::EmptyLabelSet);
            }
            if embeddings.is_empty() {
                return Ok(Vec::new());
            }

            let main = self.assigner.assign(embeddings, tree.main_labels()).await?;
            let mut results: Vec<HierarchicalMatch> = main
                .iter()
                .map(|found| HierarchicalMatch {
                    main_label: found.label.clone(),
                    sub_label: String::new(),
                    confidence: found.score,
                    sub_confidence: 0.0,
                })
                .collect();

            for (category_index, category) in tree.categories().iter().enumerate() {
                if category.subcategories.is_empty() {
                    continue;
                }
                let members: Vec<usize> = main
                    .iter()
                    .enumerate()
                    .filter(|(_, found)| found.label_index == category_index)
                    .map(|(doc, _)| doc)
                    .collect();
                if members.is_empty() {
                    continue;
                }

                tracing::debug!(
                    category = %category.label,
                    documents = members.len(),
                    "Refining into subcategories"
                );
                let group: Vec<&[f32]> = members
                    .iter()
                    .map(|&doc| embeddings[doc].as_ref())
                    .collect();
                let subs = self
                    .assigner
                    .assign(&group, &category.subcategories)
                    .await?;
                for (doc, sub) in members.into_iter().zip(subs) {
                    results[doc].sub_label = sub.label;
                    results[doc].sub_confidence = sub.score;
                }
            }

            tracing::info!(documents = results.len(), "Hierarchical assignment complete");
            Ok(results)
        }
        .instrument(self.span.clone())
        .await
    }
}
