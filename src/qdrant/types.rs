//! Shared types used by the Qdrant client and helpers.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors returned while interacting with Qdrant.
#[derive(Debug, Error)]
pub enum QdrantError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Qdrant URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Qdrant responded with an unexpected status code.
    #[error("Unexpected Qdrant response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Qdrant.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Prepared point ready for upserting: identifier, vector and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PointInsert {
    /// Point identifier (UUID string).
    pub id: String,
    /// Document embedding.
    pub vector: Vec<f32>,
    /// Document metadata stored alongside the vector.
    pub payload: Map<String, Value>,
}

/// Filters that can be applied to Qdrant search queries.
#[derive(Debug, Default, Clone)]
pub struct SearchFilterArgs {
    /// Exact match constraint for the `topic` payload field.
    pub topic: Option<String>,
    /// Exact match constraint for the `sub_topic` payload field.
    pub sub_topic: Option<String>,
    /// Exact match constraint for the `file_type` payload field.
    pub file_type: Option<String>,
}

/// Scored payload returned by Qdrant queries.
#[derive(Debug, Clone)]
pub struct ScoredPoint {
    /// Identifier assigned to the vector.
    pub id: String,
    /// Similarity score computed by Qdrant.
    pub score: f32,
    /// Optional payload associated with the vector.
    pub payload: Option<Map<String, Value>>,
}

/// Summary describing how Qdrant applied an upsert request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of points written by the request.
    pub inserted: usize,
}

/// Document counts for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStatistics {
    /// Number of stored documents.
    pub total_documents: usize,
    /// Documents per main topic.
    pub documents_per_topic: BTreeMap<String, usize>,
    /// Documents per subtopic; an empty subtopic is not counted here.
    pub documents_per_subtopic: BTreeMap<String, usize>,
}

/// Metadata of one stored document, as listed from the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredDocument {
    /// Source file name.
    pub file_name: Option<String>,
    /// Main topic.
    pub topic: Option<String>,
    /// Subtopic; `None` when the document was not refined.
    pub sub_topic: Option<String>,
    /// Main-topic confidence.
    pub confidence: Option<f64>,
    /// Lower-cased extension with leading dot.
    pub file_type: Option<String>,
    /// SHA-256 of the file contents.
    pub sha256: Option<String>,
    /// Fuzzy hash of the file contents.
    pub fuzzy_hash: Option<String>,
    /// Storage time, RFC3339.
    pub timestamp: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    pub(crate) result: QueryResponseResult,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum QueryResponseResult {
    Points(Vec<QueryPoint>),
    Object {
        #[serde(default)]
        points: Vec<QueryPoint>,
    },
}

#[derive(Deserialize)]
pub(crate) struct QueryPoint {
    pub(crate) id: Value,
    pub(crate) score: f32,
    #[serde(default)]
    pub(crate) payload: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub(crate) struct ScrollResponse {
    pub(crate) result: ScrollResult,
}

#[derive(Deserialize)]
pub(crate) struct ScrollResult {
    #[serde(default)]
    pub(crate) points: Vec<ScrollPoint>,
    #[serde(default)]
    pub(crate) next_page_offset: Option<Value>,
}

#[derive(Deserialize)]
pub(crate) struct ScrollPoint {
    #[serde(default)]
    pub(crate) payload: Option<Map<String, Value>>,
}
