//! Embedding capability: text in, fixed-length vectors out.
//!
//! Documents and label strings must be embedded by the same client so that both live in one
//! vector space. [`HashEmbedder`] is a deterministic feature-hashing client that needs no model;
//! [`OllamaEmbedder`] talks to a local Ollama runtime.

mod ollama;

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use ollama::OllamaEmbedder;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider returned a different number of vectors than texts submitted.
    #[error("Embedding provider returned {actual} vectors for {expected} inputs")]
    CountMismatch {
        /// Number of texts submitted.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
///
/// Implementations must be order-preserving (one vector per input, same order) and
/// deterministic for a given model version.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Shared handle to an embedding client.
pub type SharedEmbeddingClient = Arc<dyn EmbeddingClient>;

/// Deterministic embedding client based on feature hashing.
///
/// Every lowercase word is hashed into one of `dimension` buckets with a hash-derived sign, so
/// texts sharing vocabulary land close together. Texts without any word characters fall back to
/// a positional byte encoding.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Construct a hashing embedder producing vectors of the given dimension.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];

        let mut saw_word = false;
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            saw_word = true;
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let position = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            embedding[position] += sign;
        }

        if !saw_word {
            for (idx, byte) in text.bytes().enumerate() {
                embedding[idx % self.dimension] += f32::from(byte) / 255.0;
            }
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(
            dimension = self.dimension,
            texts = texts.len(),
            "Generating hashed embeddings"
        );

        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes.iter().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client(config: &Config) -> SharedEmbeddingClient {
    match config.embedding_provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
            Some(config.embedding_dimension),
        )),
        EmbeddingProvider::Hash => Arc::new(HashEmbedder::new(config.embedding_dimension)),
    }
}
