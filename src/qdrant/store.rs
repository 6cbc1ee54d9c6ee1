//! Persistence seam between the pipeline and the vector database.

use async_trait::async_trait;

use super::client::QdrantService;
use super::types::{IndexSummary, PointInsert, QdrantError};

/// Destination for categorized document vectors.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Prepare `collection` for vectors of `vector_size` dimensions.
    async fn ensure_collection(&self, collection: &str, vector_size: u64)
    -> Result<(), QdrantError>;

    /// Write `(id, vector, payload)` records to `collection`.
    async fn upsert(
        &self,
        collection: &str,
        points: Vec<PointInsert>,
    ) -> Result<IndexSummary, QdrantError>;
}

#[async_trait]
impl VectorStore for QdrantService {
    async fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        self.create_collection_if_not_exists(collection, vector_size)
            .await?;
        self.ensure_payload_indexes(collection).await
    }

    async fn upsert(
        &self,
        collection: &str,
        points: Vec<PointInsert>,
    ) -> Result<IndexSummary, QdrantError> {
        self.upsert_points(collection, points).await
    }
}
