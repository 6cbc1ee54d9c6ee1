//! Client for hosted zero-shot classification endpoints speaking the inference-API format.

use super::{ZeroShotClassifier, ZeroShotError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Zero-shot classifier backed by an HTTP inference endpoint.
///
/// Sends `{"inputs", "parameters": {"candidate_labels", "multi_label": true}}` and expects
/// `{"labels": [..], "scores": [..]}` ranked best first.
pub struct HttpZeroShotClassifier {
    http: Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

impl HttpZeroShotClassifier {
    /// Build a classifier posting to `url`, authenticating with `api_key` when provided.
    pub fn new(url: String, api_key: Option<String>) -> Self {
        let http = Client::builder()
            .user_agent("topicsort/zero-shot")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, url, api_key }
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<Vec<(String, f32)>, ZeroShotError> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": labels,
                "multi_label": true,
            }
        });

        let mut request = self.http.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key
            && !key.is_empty()
        {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|error| {
            ZeroShotError::ProviderUnavailable(format!(
                "failed to reach zero-shot endpoint {}: {error}",
                self.url
            ))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ZeroShotError::ProviderUnavailable(format!(
                "zero-shot endpoint {} returned 404",
                self.url
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ZeroShotError::RequestFailed(format!(
                "endpoint returned {status}: {body}"
            )));
        }

        let body: ClassificationResponse = response.json().await.map_err(|error| {
            ZeroShotError::InvalidResponse(format!("failed to decode response: {error}"))
        })?;

        if body.labels.len() != body.scores.len() {
            return Err(ZeroShotError::InvalidResponse(format!(
                "{} labels but {} scores",
                body.labels.len(),
                body.scores.len()
            )));
        }

        let mut ranked: Vec<(String, f32)> = body.labels.into_iter().zip(body.scores).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }
}
