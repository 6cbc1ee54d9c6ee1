//! Client for an out-of-process topic-model service exposing `POST /fit`.

use super::{ClusterFit, Clusterer, ClusteringError, TopicSummary, summarize_topics};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Clusterer delegating the fit to a topic-model service.
///
/// Request: `{"documents": [..]}`. Response: `topics` (cluster id per document),
/// `probabilities` (one row per document, column `j` is cluster `j`), `embeddings`,
/// `topic_keywords` (`{"<id>": [["word", weight], ..]}`) and optionally `topic_info`
/// (`[{"topic", "name", "count"}]`).
pub struct HttpClusterer {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct FitResponse {
    topics: Vec<i32>,
    #[serde(default)]
    probabilities: Vec<Vec<f32>>,
    embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    topic_keywords: BTreeMap<i32, Vec<(String, f32)>>,
    #[serde(default)]
    topic_info: Vec<TopicInfoRow>,
}

#[derive(Debug, Deserialize)]
struct TopicInfoRow {
    topic: i32,
    name: String,
    count: usize,
}

impl HttpClusterer {
    /// Build a client for the topic-model service at `base_url`.
    pub fn new(base_url: String) -> Self {
        let http = Client::builder()
            .user_agent("topicsort/cluster")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/fit", self.base_url.trim_end_matches('/'))
    }
}

impl FitResponse {
    fn into_fit(self) -> ClusterFit {
        let probabilities = self
            .probabilities
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(cluster, probability)| (cluster as i32, probability))
                    .collect()
            })
            .collect();

        let summary = if self.topic_info.is_empty() {
            summarize_topics(&self.topics, &self.topic_keywords)
        } else {
            let mut rows: Vec<TopicSummary> = self
                .topic_info
                .into_iter()
                .map(|row| TopicSummary {
                    cluster_id: row.topic,
                    name: row.name,
                    size: row.count,
                })
                .collect();
            rows.sort_by_key(|row| row.cluster_id);
            rows
        };

        ClusterFit {
            topics: self.topics,
            probabilities,
            embeddings: self.embeddings,
            keywords: self.topic_keywords,
            summary,
        }
    }
}

#[async_trait]
impl Clusterer for HttpClusterer {
    async fn fit(&self, documents: &[String]) -> Result<ClusterFit, ClusteringError> {
        if documents.is_empty() {
            return Ok(ClusterFit::default());
        }

        tracing::debug!(
            documents = documents.len(),
            url = %self.endpoint(),
            "Requesting topic fit"
        );
        let response = self
            .http
            .post(self.endpoint())
            .json(&json!({ "documents": documents }))
            .send()
            .await
            .map_err(|error| {
                ClusteringError::Unavailable(format!(
                    "failed to reach topic service at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClusteringError::Unavailable(format!(
                "topic service endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClusteringError::RequestFailed(format!(
                "topic service returned {status}: {body}"
            )));
        }

        let body: FitResponse = response.json().await.map_err(|error| {
            ClusteringError::InvalidResponse(format!("failed to decode fit: {error}"))
        })?;

        let fit = body.into_fit();
        fit.validate(documents.len())?;
        Ok(fit)
    }
}
