//! Clustering capability: group documents into topics without predefined labels.
//!
//! The clustering algorithm itself is opaque. A fit returns, per document, the assigned cluster
//! id ([`UNCLUSTERED`] when the document fits nowhere), the per-cluster membership probabilities,
//! and the document embedding, plus per-cluster keyword lists and a topic summary.

mod http;

use crate::embedding::{EmbeddingClientError, SharedEmbeddingClient};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

pub use http::HttpClusterer;

/// Cluster id reported for documents that belong to no cluster.
pub const UNCLUSTERED: i32 = -1;

/// Errors raised while fitting a clustering model.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// Clustering backend could not be reached.
    #[error("Clustering backend unavailable: {0}")]
    Unavailable(String),
    /// Backend answered with an error status.
    #[error("Clustering request failed: {0}")]
    RequestFailed(String),
    /// Backend answered with a fit that does not describe the submitted documents.
    #[error("Malformed clustering result: {0}")]
    InvalidResponse(String),
    /// Document embeddings could not be produced.
    #[error("Failed to embed documents for clustering: {0}")]
    Embedding(#[from] EmbeddingClientError),
}

/// Descriptive entry for one discovered cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSummary {
    /// Cluster id, possibly [`UNCLUSTERED`].
    pub cluster_id: i32,
    /// Descriptive name in `"{id}_{keyword}_{keyword}..."` form.
    pub name: String,
    /// Number of documents assigned to the cluster.
    pub size: usize,
}

/// Result of fitting a clustering model to one batch of documents.
#[derive(Debug, Clone, Default)]
pub struct ClusterFit {
    /// Assigned cluster id per document, in input order.
    pub topics: Vec<i32>,
    /// Membership probability per document keyed by cluster id.
    pub probabilities: Vec<BTreeMap<i32, f32>>,
    /// Embedding per document, in input order.
    pub embeddings: Vec<Vec<f32>>,
    /// Keyword/weight pairs per cluster, most significant first.
    pub keywords: BTreeMap<i32, Vec<(String, f32)>>,
    /// One entry per cluster, ordered by cluster id.
    pub summary: Vec<TopicSummary>,
}

impl ClusterFit {
    /// Keyword/weight pairs for `cluster_id`, empty when the cluster is unknown.
    pub fn topic_keywords(&self, cluster_id: i32) -> &[(String, f32)] {
        self.keywords
            .get(&cluster_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Summary of every discovered cluster.
    pub fn topic_summary(&self) -> &[TopicSummary] {
        &self.summary
    }

    /// Membership probability of document `doc` in its assigned cluster.
    pub fn assigned_probability(&self, doc: usize) -> Option<f32> {
        let topic = *self.topics.get(doc)?;
        self.probabilities.get(doc)?.get(&topic).copied()
    }

    /// Check that the fit describes exactly `documents` inputs.
    pub fn validate(&self, documents: usize) -> Result<(), ClusteringError> {
        if self.topics.len() != documents {
            return Err(ClusteringError::InvalidResponse(format!(
                "{} topic ids for {documents} documents",
                self.topics.len()
            )));
        }
        if self.embeddings.len() != documents {
            return Err(ClusteringError::InvalidResponse(format!(
                "{} embeddings for {documents} documents",
                self.embeddings.len()
            )));
        }
        if !self.probabilities.is_empty() && self.probabilities.len() != documents {
            return Err(ClusteringError::InvalidResponse(format!(
                "{} probability rows for {documents} documents",
                self.probabilities.len()
            )));
        }
        Ok(())
    }
}

/// Build a `"{id}_{w1}_{w2}_{w3}_{w4}"` descriptive name from the top keywords.
pub fn descriptive_name(cluster_id: i32, keywords: &[(String, f32)]) -> String {
    let mut name = cluster_id.to_string();
    for (word, _) in keywords.iter().take(4) {
        name.push('_');
        name.push_str(word);
    }
    name
}

/// Count documents per cluster and name each cluster from its keywords.
pub fn summarize_topics(
    topics: &[i32],
    keywords: &BTreeMap<i32, Vec<(String, f32)>>,
) -> Vec<TopicSummary> {
    let mut sizes: BTreeMap<i32, usize> = BTreeMap::new();
    for topic in topics {
        *sizes.entry(*topic).or_default() += 1;
    }
    sizes
        .into_iter()
        .map(|(cluster_id, size)| TopicSummary {
            cluster_id,
            name: descriptive_name(
                cluster_id,
                keywords.get(&cluster_id).map(Vec::as_slice).unwrap_or_default(),
            ),
            size,
        })
        .collect()
}

/// Interface implemented by clustering backends.
#[async_trait]
pub trait Clusterer: Send + Sync {
    /// Fit the model to `documents` and report one assignment per document.
    async fn fit(&self, documents: &[String]) -> Result<ClusterFit, ClusteringError>;
}

/// Shared handle to a clustering backend.
pub type SharedClusterer = Arc<dyn Clusterer>;

/// Deterministic clusterer replaying a fixed assignment.
///
/// Documents are embedded with the injected client; document `i` lands in `assignments[i]` with
/// probability 1.0, or in no cluster when the assignment is [`UNCLUSTERED`].
pub struct StaticClusterer {
    embedder: SharedEmbeddingClient,
    assignments: Vec<i32>,
    keywords: BTreeMap<i32, Vec<(String, f32)>>,
}

impl StaticClusterer {
    /// Replay `assignments`, embedding documents with `embedder`.
    pub fn new(embedder: SharedEmbeddingClient, assignments: Vec<i32>) -> Self {
        Self {
            embedder,
            assignments,
            keywords: BTreeMap::new(),
        }
    }

    /// Attach weighted keywords to `cluster_id`; weights are assigned in descending order.
    pub fn with_keywords(mut self, cluster_id: i32, words: &[&str]) -> Self {
        let count = words.len().max(1) as f32;
        let weighted = words
            .iter()
            .enumerate()
            .map(|(rank, word)| (word.to_string(), 1.0 - rank as f32 / count))
            .collect();
        self.keywords.insert(cluster_id, weighted);
        self
    }
}

#[async_trait]
impl Clusterer for StaticClusterer {
    async fn fit(&self, documents: &[String]) -> Result<ClusterFit, ClusteringError> {
        if documents.len() != self.assignments.len() {
            return Err(ClusteringError::InvalidResponse(format!(
                "{} scripted assignments for {} documents",
                self.assignments.len(),
                documents.len()
            )));
        }
        if documents.is_empty() {
            return Ok(ClusterFit::default());
        }

        let embeddings = self.embedder.generate_embeddings(documents.to_vec()).await?;
        let probabilities = self
            .assignments
            .iter()
            .map(|&topic| {
                let mut row = BTreeMap::new();
                if topic != UNCLUSTERED {
                    row.insert(topic, 1.0);
                }
                row
            })
            .collect();

        let fit = ClusterFit {
            topics: self.assignments.clone(),
            probabilities,
            embeddings,
            keywords: self.keywords.clone(),
            summary: summarize_topics(&self.assignments, &self.keywords),
        };
        fit.validate(documents.len())?;
        Ok(fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    #[tokio::test]
    async fn static_clusterer_replays_assignments() {
        let clusterer = StaticClusterer::new(Arc::new(HashEmbedder::new(16)), vec![0, -1, 0])
            .with_keywords(0, &["malware", "phishing", "ransomware"]);
        let documents: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let fit = clusterer.fit(&documents).await.expect("fit");

        assert_eq!(fit.topics, vec![0, -1, 0]);
        assert_eq!(fit.embeddings.len(), 3);
        assert_eq!(fit.assigned_probability(0), Some(1.0));
        assert_eq!(fit.assigned_probability(1), None);
        assert_eq!(fit.topic_keywords(0)[0].0, "malware");
        assert!(fit.topic_keywords(7).is_empty());

        let summary = fit.topic_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].cluster_id, -1);
        assert_eq!(summary[1].name, "0_malware_phishing_ransomware");
        assert_eq!(summary[1].size, 2);
    }

    #[tokio::test]
    async fn static_clusterer_rejects_length_mismatch() {
        let clusterer = StaticClusterer::new(Arc::new(HashEmbedder::new(16)), vec![0]);
        let error = clusterer
            .fit(&["a".to_string(), "b".to_string()])
            .await
            .expect_err("mismatch");
        assert!(matches!(error, ClusteringError::InvalidResponse(_)));
    }

    #[test]
    fn validate_flags_short_embedding_list() {
        let fit = ClusterFit {
            topics: vec![0, 1],
            embeddings: vec![vec![1.0]],
            ..Default::default()
        };
        assert!(fit.validate(2).is_err());
    }
}
