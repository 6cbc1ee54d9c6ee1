//! Core data types and error definitions for the categorization pipeline.

use crate::{
    categorize::{Assignment, CategorizeError, LabelTree, TopicCluster},
    embedding::EmbeddingClientError,
    qdrant::QdrantError,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors emitted by the categorization pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Topic assignment failed.
    #[error("Categorization failed: {0}")]
    Categorize(#[from] CategorizeError),
    /// Embedding provider failed to produce vectors for the documents.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Vector store interaction failed.
    #[error("Vector store request failed: {0}")]
    Store(#[from] QdrantError),
    /// The requested mode needs a capability the service was not built with.
    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),
    /// Reading or writing a document on disk failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}

/// A document loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier; the file name.
    pub id: String,
    /// Location the document was read from.
    pub path: PathBuf,
    /// Raw text content.
    pub text: String,
    /// SHA-256 hex digest of the raw bytes.
    pub sha256: String,
    /// Similarity digest supplied by an external tool, if any.
    pub fuzzy_hash: Option<String>,
    /// Lower-cased extension with a leading dot.
    pub file_type: String,
}

/// How documents are assigned to topics.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Match against a caller-supplied taxonomy.
    Predefined(LabelTree),
    /// Discover topics by clustering; optionally name them with a zero-shot classifier.
    Automatic {
        /// Name clusters with the zero-shot classifier instead of their keywords.
        zero_shot: bool,
    },
}

/// A document together with its assignment.
#[derive(Debug, Clone)]
pub struct CategorizedDocument {
    /// Source document.
    pub document: Document,
    /// Assigned topic, subtopic and scores.
    pub assignment: Assignment,
    /// Keyphrases extracted before embedding; empty when extraction was disabled.
    pub keywords: Vec<String>,
}

/// Outcome of one categorization run.
#[derive(Debug, Clone, Default)]
pub struct CategorizationReport {
    /// Categorized documents, highest confidence first.
    pub rows: Vec<CategorizedDocument>,
    /// Discovered clusters; empty for predefined taxonomies.
    pub clusters: Vec<TopicCluster>,
    /// Keyword chunks whose extraction failed and was skipped.
    pub degraded_extractions: usize,
}

impl CategorizationReport {
    /// Rows grouped by main label, preserving confidence order within each group.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&CategorizedDocument>> {
        let mut groups: BTreeMap<&str, Vec<&CategorizedDocument>> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row.assignment.main_label.as_str())
                .or_default()
                .push(row);
        }
        groups
    }
}

/// Search result returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Point identifier.
    pub id: String,
    /// Similarity score.
    pub score: f32,
    /// Source file name.
    pub file_name: Option<String>,
    /// Stored main topic.
    pub topic: Option<String>,
    /// Stored subtopic, when present.
    pub sub_topic: Option<String>,
    /// Stored document text.
    pub text: Option<String>,
}
