//! HTTP client wrapper for interacting with Qdrant.

use crate::qdrant::{
    filters::{DOCUMENT_FIELDS, accumulate_statistics, stored_document},
    scroller::stream_payloads,
    types::{
        CollectionStatistics, IndexSummary, PointInsert, QdrantError, QueryResponse,
        QueryResponseResult, ScoredPoint, StoredDocument,
    },
};
use futures_util::{pin_mut, stream::StreamExt};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

const PAYLOAD_INDEXES: [&str; 4] = ["topic", "sub_topic", "file_type", "sha256"];

/// Lightweight HTTP client for Qdrant operations.
pub struct QdrantService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantService {
    /// Construct a client for the Qdrant instance at `url`.
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self, QdrantError> {
        let client = Client::builder().user_agent("topicsort/0.1").build()?;
        let base_url = normalize_base_url(url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = api_key.as_deref().is_some_and(|value| !value.is_empty()),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Create a collection only when it is missing from Qdrant.
    pub async fn create_collection_if_not_exists(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        if self.collection_exists(collection_name).await? {
            return Ok(());
        }

        tracing::info!(
            collection = collection_name,
            vector_size,
            "Creating collection"
        );
        self.create_collection(collection_name, vector_size).await
    }

    /// Create or update a cosine-distance collection with the specified vector size.
    pub async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": "Cosine"
            }
        });

        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}"))
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(collection = collection_name, "Collection ensured/created");
        })
        .await
    }

    /// Ensure keyword payload indexes exist for the fields documents are filtered by.
    ///
    /// Index creation failures are logged and otherwise ignored.
    pub async fn ensure_payload_indexes(&self, collection_name: &str) -> Result<(), QdrantError> {
        for field in PAYLOAD_INDEXES {
            let body = json!({
                "field_name": field,
                "field_schema": "keyword",
            });

            let response = self
                .request(Method::PUT, &format!("collections/{collection_name}/index"))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                tracing::debug!(collection = collection_name, field, "Payload index ensured");
            } else if response.status() == StatusCode::CONFLICT {
                tracing::debug!(
                    collection = collection_name,
                    field,
                    "Payload index already exists"
                );
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::warn!(
                    collection = collection_name,
                    field,
                    error = %error,
                    "Failed to ensure payload index"
                );
            }
        }

        Ok(())
    }

    /// Upsert prepared points into the given collection, waiting for the write to apply.
    pub async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<PointInsert>,
    ) -> Result<IndexSummary, QdrantError> {
        if points.is_empty() {
            return Ok(IndexSummary::default());
        }

        let serialized: Vec<Value> = points
            .into_iter()
            .map(|point| {
                json!({
                    "id": point.id,
                    "vector": point.vector,
                    "payload": point.payload,
                })
            })
            .collect();

        let point_count = serialized.len();
        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}/points"))
            .query(&[("wait", true)])
            .json(&json!({ "points": serialized }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(
                collection = collection_name,
                points = point_count,
                "Points upserted"
            );
        })
        .await?;

        Ok(IndexSummary {
            inserted: point_count,
        })
    }

    /// Perform a similarity search against a collection, returning scored payloads.
    pub async fn search_points(
        &self,
        collection_name: &str,
        vector: Vec<f32>,
        filter: Option<Value>,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>, QdrantError> {
        let mut body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });
        if let (Some(filter_value), Some(obj)) = (filter, body.as_object_mut()) {
            obj.insert("filter".into(), filter_value);
        }

        let response = self
            .request(
                Method::POST,
                &format!("collections/{collection_name}/points/query"),
            )
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(collection = collection_name, error = %error, "Qdrant search failed");
            return Err(error);
        }

        let payload: QueryResponse = response.json().await?;
        let points = match payload.result {
            QueryResponseResult::Points(points) => points,
            QueryResponseResult::Object { points } => points,
        };
        let results = points
            .into_iter()
            .map(|point| ScoredPoint {
                id: stringify_point_id(point.id),
                score: point.score,
                payload: point.payload,
            })
            .collect();

        Ok(results)
    }

    /// Count stored documents overall, per topic and per subtopic.
    pub async fn statistics(
        &self,
        collection_name: &str,
    ) -> Result<CollectionStatistics, QdrantError> {
        let stream = stream_payloads(self, collection_name, json!(["topic", "sub_topic"]), None);
        pin_mut!(stream);

        let mut stats = CollectionStatistics::default();
        while let Some(payload) = stream.next().await {
            accumulate_statistics(&payload?, &mut stats);
        }

        tracing::debug!(
            collection = collection_name,
            total = stats.total_documents,
            topics = stats.documents_per_topic.len(),
            "Computed collection statistics"
        );
        Ok(stats)
    }

    /// Metadata of every stored document, in scroll order.
    pub async fn list_documents(
        &self,
        collection_name: &str,
    ) -> Result<Vec<StoredDocument>, QdrantError> {
        let stream = stream_payloads(self, collection_name, json!(DOCUMENT_FIELDS), None);
        pin_mut!(stream);

        let mut documents = Vec::new();
        while let Some(payload) = stream.next().await {
            documents.push(stored_document(&payload?));
        }

        tracing::debug!(
            collection = collection_name,
            documents = documents.len(),
            "Listed stored documents"
        );
        Ok(documents)
    }

    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError> {
        let response = self
            .request(Method::GET, &format!("collections/{collection_name}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Collection existence check failed");
                Err(error)
            }
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        req
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), QdrantError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn stringify_point_id(id: Value) -> String {
    match id {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qdrant::{SearchFilterArgs, build_search_filter};
    use httpmock::{
        Method::{GET, POST, PUT},
        MockServer,
    };
    use serde_json::Map;

    fn service(server: &MockServer) -> QdrantService {
        QdrantService::new(&server.base_url(), Some("secret".into())).expect("service")
    }

    #[test]
    fn rejects_unparseable_url() {
        let error = QdrantService::new("not a url", None)
            .err()
            .expect("invalid url");
        assert!(matches!(error, QdrantError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn search_points_emits_expected_request() {
        let server = MockServer::start_async().await;

        let filter = build_search_filter(&SearchFilterArgs {
            topic: Some("Security".into()),
            ..Default::default()
        })
        .expect("filter value");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/query")
                    .header("api-key", "secret")
                    .json_body(json!({
                        "query": [0.5, 0.25],
                        "limit": 3,
                        "with_payload": true,
                        "filter": {
                            "must": [
                                { "key": "topic", "match": { "value": "Security" } }
                            ]
                        }
                    }));
                then.status(200).json_body(json!({
                    "status": "ok",
                    "time": 0.0,
                    "result": {
                        "points": [
                            {
                                "id": "doc-1",
                                "score": 0.42,
                                "payload": {
                                    "file_name": "phishing.txt",
                                    "topic": "Security"
                                }
                            }
                        ]
                    }
                }));
            })
            .await;

        let results = service(&server)
            .search_points("documents", vec![0.5, 0.25], Some(filter), 3)
            .await
            .expect("search request");

        mock.assert();
        assert_eq!(results.len(), 1);
        let hit = &results[0];
        assert_eq!(hit.id, "doc-1");
        assert!((hit.score - 0.42).abs() < f32::EPSILON);
        let payload = hit.payload.as_ref().expect("payload");
        assert_eq!(payload["file_name"], "phishing.txt");
    }

    #[tokio::test]
    async fn create_collection_skips_existing() {
        let server = MockServer::start_async().await;
        let exists = server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/documents");
                then.status(200).json_body(json!({ "result": {} }));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/documents");
                then.status(200).json_body(json!({ "result": true }));
            })
            .await;

        service(&server)
            .create_collection_if_not_exists("documents", 8)
            .await
            .expect("ensure collection");

        exists.assert();
        create.assert_hits(0);
    }

    #[tokio::test]
    async fn create_collection_uses_cosine_distance() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/documents");
                then.status(404).body("Not found");
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/documents")
                    .json_body(json!({ "vectors": { "size": 8, "distance": "Cosine" } }));
                then.status(200).json_body(json!({ "result": true }));
            })
            .await;

        service(&server)
            .create_collection_if_not_exists("documents", 8)
            .await
            .expect("create collection");
        create.assert();
    }

    #[tokio::test]
    async fn payload_index_conflicts_are_tolerated() {
        let server = MockServer::start_async().await;
        let index = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/documents/index");
                then.status(409).body("exists");
            })
            .await;

        service(&server)
            .ensure_payload_indexes("documents")
            .await
            .expect("indexes");
        index.assert_hits(PAYLOAD_INDEXES.len());
    }

    #[tokio::test]
    async fn upsert_points_waits_and_reports_count() {
        let server = MockServer::start_async().await;
        let mut payload = Map::new();
        payload.insert("topic".into(), Value::String("Security".into()));

        let upsert = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/documents/points")
                    .query_param("wait", "true")
                    .json_body(json!({
                        "points": [
                            { "id": "p-1", "vector": [1.0, 0.0], "payload": { "topic": "Security" } }
                        ]
                    }));
                then.status(200)
                    .json_body(json!({ "result": { "status": "completed" } }));
            })
            .await;

        let summary = service(&server)
            .upsert_points(
                "documents",
                vec![PointInsert {
                    id: "p-1".into(),
                    vector: vec![1.0, 0.0],
                    payload,
                }],
            )
            .await
            .expect("upsert");

        upsert.assert();
        assert_eq!(summary.inserted, 1);
    }

    #[tokio::test]
    async fn upsert_points_surfaces_failures() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/documents/points");
                then.status(400).body("wrong vector size");
            })
            .await;

        let error = service(&server)
            .upsert_points(
                "documents",
                vec![PointInsert {
                    id: "p-1".into(),
                    vector: vec![1.0],
                    payload: Map::new(),
                }],
            )
            .await
            .expect_err("bad request");
        assert!(matches!(error, QdrantError::UnexpectedStatus { body, .. } if body.contains("vector")));
    }

    #[tokio::test]
    async fn statistics_stream_all_payloads() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/documents/points/scroll");
                then.status(200).json_body(json!({
                    "result": {
                        "points": [
                            { "id": "a", "payload": { "topic": "Security", "sub_topic": "Malware" } },
                            { "id": "b", "payload": { "topic": "Security", "sub_topic": "" } },
                            { "id": "c", "payload": { "topic": "Health", "sub_topic": "Nutrition" } }
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        let stats = service(&server)
            .statistics("documents")
            .await
            .expect("statistics");
        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.documents_per_topic["Security"], 2);
        assert_eq!(stats.documents_per_subtopic["Malware"], 1);
        assert!(!stats.documents_per_subtopic.contains_key(""));
    }

    #[tokio::test]
    async fn list_documents_follows_scroll_pages() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll")
                    .body_contains("\"offset\":null")
                    .body_contains("\"fuzzy_hash\"");
                then.status(200).json_body(json!({
                    "result": {
                        "points": [
                            { "id": "a", "payload": { "file_name": "a.txt", "topic": "Security" } }
                        ],
                        "next_page_offset": "b"
                    }
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/documents/points/scroll")
                    .body_contains("\"offset\":\"b\"");
                then.status(200).json_body(json!({
                    "result": {
                        "points": [
                            {
                                "id": "b",
                                "payload": {
                                    "file_name": "b.md",
                                    "topic": "Health",
                                    "sub_topic": "Nutrition",
                                    "fuzzy_hash": "3:abc:def"
                                }
                            }
                        ],
                        "next_page_offset": null
                    }
                }));
            })
            .await;

        let documents = service(&server)
            .list_documents("documents")
            .await
            .expect("documents");

        first.assert();
        second.assert();
        let names: Vec<_> = documents
            .iter()
            .map(|doc| doc.file_name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("a.txt"), Some("b.md")]);
        assert_eq!(documents[1].sub_topic.as_deref(), Some("Nutrition"));
        assert_eq!(documents[1].fuzzy_hash.as_deref(), Some("3:abc:def"));
    }
}
