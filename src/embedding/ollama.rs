//! Ollama-backed embedding client issuing HTTP requests directly to the runtime.

use super::{EmbeddingClient, EmbeddingClientError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Embedding client calling Ollama's `/api/embed` endpoint with the whole batch at once.
pub struct OllamaEmbedder {
    http: Client,
    base_url: String,
    model: String,
    expected_dimension: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    /// Build a client for `model` served by the Ollama runtime at `base_url`.
    ///
    /// When `expected_dimension` is set, every returned vector is checked against it.
    pub fn new(base_url: String, model: String, expected_dimension: Option<usize>) -> Self {
        let http = Client::builder()
            .user_agent("topicsort/embed")
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url,
            model,
            expected_dimension,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        tracing::debug!(model = %self.model, texts = expected, "Requesting Ollama embeddings");

        let response = self
            .http
            .post(self.endpoint())
            .json(&json!({ "model": self.model, "input": texts }))
            .send()
            .await
            .map_err(|error| {
                EmbeddingClientError::GenerationFailed(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "model '{}' not available at {}",
                self.model,
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::GenerationFailed(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if body.embeddings.len() != expected {
            return Err(EmbeddingClientError::CountMismatch {
                expected,
                actual: body.embeddings.len(),
            });
        }

        if let Some(dimension) = self.expected_dimension
            && let Some(vector) = body.embeddings.iter().find(|v| v.len() != dimension)
        {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "expected {dimension}-dimensional vectors, got {}",
                vector.len()
            )));
        }

        Ok(body.embeddings)
    }
}
