//! Result types and error definitions for topic assignment.

use crate::{
    clustering::ClusteringError, embedding::EmbeddingClientError, zero_shot::ZeroShotError,
};
use thiserror::Error;

/// Errors emitted while assigning documents to topics.
#[derive(Debug, Error)]
pub enum CategorizeError {
    /// An embedding had zero norm or contained non-finite values.
    #[error("invalid {kind} embedding at index {index}: {reason}")]
    InvalidEmbedding {
        /// Either `"document"` or `"label"`.
        kind: &'static str,
        /// Position of the offending vector in its batch.
        index: usize,
        /// Why the vector was rejected.
        reason: crate::similarity::VectorError,
    },
    /// Document and label embeddings have different lengths.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the label embeddings.
        expected: usize,
        /// Dimension of the offending embedding.
        actual: usize,
    },
    /// No labels were supplied.
    #[error("label set is empty")]
    EmptyLabelSet,
    /// A label occurs twice within one label set.
    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),
    /// A taxonomy document could not be interpreted.
    #[error("invalid taxonomy: {0}")]
    InvalidTaxonomy(String),
    /// The embedding capability failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// The clustering capability failed; the whole batch is abandoned.
    #[error("clustering failed: {0}")]
    ClusteringFailed(#[from] ClusteringError),
    /// The zero-shot classifier failed while naming a cluster.
    #[error("zero-shot classification failed: {0}")]
    Classification(#[from] ZeroShotError),
}

/// Best-matching label for one embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMatch {
    /// Winning label.
    pub label: String,
    /// Position of the winning label in the label list.
    pub label_index: usize,
    /// Cosine similarity to the winning label, in `[-1, 1]`.
    pub score: f32,
}

/// Two-level assignment for one embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalMatch {
    /// Winning main label.
    pub main_label: String,
    /// Winning subcategory, empty when the main label has none.
    pub sub_label: String,
    /// Cosine similarity to the main label.
    pub confidence: f32,
    /// Cosine similarity to the subcategory, 0 when there is none.
    pub sub_confidence: f32,
}

/// Final categorization of a single document.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Identifier of the source document.
    pub document_id: String,
    /// Main topic label.
    pub main_label: String,
    /// Subtopic label or empty.
    pub sub_label: String,
    /// Score backing the main label.
    pub confidence: f32,
    /// Score backing the subtopic.
    pub sub_confidence: f32,
    /// Embedding the assignment was computed from.
    pub embedding: Vec<f32>,
}

/// Cluster assignment and resolved name for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicAssignment {
    /// Assigned cluster id or the unclustered sentinel.
    pub cluster_id: i32,
    /// Human-readable topic name.
    pub name: String,
    /// Probability of the assigned cluster, 0 when unassigned or unknown.
    pub confidence: f32,
}

/// A discovered cluster with its resolved name.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCluster {
    /// Cluster id or the unclustered sentinel.
    pub id: i32,
    /// Keyword/weight pairs, most significant first.
    pub keywords: Vec<(String, f32)>,
    /// Resolved name.
    pub name: String,
    /// Number of documents in this batch assigned to the cluster.
    pub size: usize,
}

/// Everything learned from one unsupervised pass.
#[derive(Debug, Clone, Default)]
pub struct TopicDiscovery {
    /// One entry per document, in input order.
    pub assignments: Vec<TopicAssignment>,
    /// One entry per cluster, ordered by id.
    pub clusters: Vec<TopicCluster>,
    /// Embedding per document as produced by the clusterer.
    pub embeddings: Vec<Vec<f32>>,
}

/// A keyword chunk whose extraction failed and contributed no phrases.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("keyword extraction degraded for chunk {chunk_index}: {reason}")]
pub struct ExtractionDegraded {
    /// Position of the chunk within the document.
    pub chunk_index: usize,
    /// Error reported by the keyphrase capability.
    pub reason: String,
}

/// Keyphrases extracted from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordOutcome {
    /// Distinct phrases in order of first appearance.
    pub keywords: Vec<String>,
    /// Chunks that failed and were skipped.
    pub degraded: Vec<ExtractionDegraded>,
}
