//! Qdrant vector store integration.

pub mod client;
pub mod filters;
pub mod payload;
/// Streaming helpers for Qdrant scroll pagination.
pub mod scroller;
mod store;
pub mod types;

pub use client::QdrantService;
pub use filters::{accumulate_statistics, build_search_filter, stored_document};
pub use payload::{compute_content_hash, compute_fuzzy_hash};
pub use store::VectorStore;
pub use types::{
    CollectionStatistics, IndexSummary, PointInsert, QdrantError, ScoredPoint, SearchFilterArgs,
    StoredDocument,
};
