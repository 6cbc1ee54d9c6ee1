#![deny(missing_docs)]

//! Core library for Topic Sort: document categorization against predefined or discovered topics.

/// Topic assignment components.
pub mod categorize;
/// Clustering capability and topic-model adapters.
pub mod clustering;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Keyphrase extraction capability.
pub mod keyphrase;
/// Structured logging and tracing setup.
pub mod logging;
/// Run metrics helpers.
pub mod metrics;
/// Document pipeline: loading, categorization, storage and organization.
pub mod processing;
/// Qdrant vector store integration.
pub mod qdrant;
/// Vector normalization and cosine similarity.
pub mod similarity;
/// Zero-shot classification capability.
pub mod zero_shot;
