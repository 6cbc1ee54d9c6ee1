//! Helpers for hashing content and stamping Qdrant payloads.

use fuzzyhash::FuzzyHash;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Compute a deterministic SHA-256 hex digest of raw document bytes.
pub fn compute_content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the ssdeep-style context-triggered piecewise hash of raw document bytes.
///
/// Near-duplicate files produce comparable hashes, unlike [`compute_content_hash`].
pub fn compute_fuzzy_hash(bytes: &[u8]) -> String {
    FuzzyHash::new(bytes).to_string()
}

/// Current timestamp formatted for payload storage.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Construct an identifier suitable for Qdrant points.
pub(crate) fn generate_point_id() -> String {
    Uuid::new_v4().to_string()
}
