use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing categorization activity.
#[derive(Default)]
pub struct RunMetrics {
    documents_categorized: AtomicU64,
    degraded_extractions: AtomicU64,
    documents_stored: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a categorized batch and the number of keyword chunks that degraded within it.
    pub fn record_batch(&self, documents: u64, degraded: u64) {
        self.documents_categorized
            .fetch_add(documents, Ordering::Relaxed);
        self.degraded_extractions
            .fetch_add(degraded, Ordering::Relaxed);
    }

    /// Record documents written to the vector store.
    pub fn record_stored(&self, documents: u64) {
        self.documents_stored.fetch_add(documents, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_categorized: self.documents_categorized.load(Ordering::Relaxed),
            degraded_extractions: self.degraded_extractions.load(Ordering::Relaxed),
            documents_stored: self.documents_stored.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that received a topic.
    pub documents_categorized: u64,
    /// Keyword chunks whose extraction failed and was skipped.
    pub degraded_extractions: u64,
    /// Documents upserted into the vector store.
    pub documents_stored: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_batches_and_storage() {
        let metrics = RunMetrics::new();
        metrics.record_batch(2, 1);
        metrics.record_batch(3, 0);
        metrics.record_stored(5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_categorized, 5);
        assert_eq!(snapshot.degraded_extractions, 1);
        assert_eq!(snapshot.documents_stored, 5);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = RunMetrics::new();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                documents_categorized: 0,
                degraded_extractions: 0,
                documents_stored: 0,
            }
        );
    }
}
