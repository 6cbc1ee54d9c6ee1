//! Categorization service coordinating keyword extraction, embedding, topic assignment and
//! vector storage.

use crate::{
    categorize::{
        Assignment, HierarchicalCategorizer, KeywordExtractor, TopicNaming,
        UnsupervisedTopicRouter,
    },
    clustering::SharedClusterer,
    embedding::{EmbeddingClientError, SharedEmbeddingClient},
    keyphrase::SharedKeyphraseExtractor,
    logging::component_span,
    metrics::{MetricsSnapshot, RunMetrics},
    processing::{
        mappers::{map_scored_point, to_point_insert},
        types::{
            CategorizationReport, CategorizedDocument, Document, Mode, PipelineError, SearchHit,
        },
    },
    qdrant::{
        IndexSummary, PointInsert, QdrantService, SearchFilterArgs, VectorStore,
        build_search_filter,
        payload::{current_timestamp_rfc3339, generate_point_id},
    },
    zero_shot::SharedZeroShotClassifier,
};
use std::sync::Arc;
use uuid::Uuid;

struct KeywordSettings {
    extractor: SharedKeyphraseExtractor,
    top_n: usize,
    chunk_size: usize,
}

/// Runs documents through the categorization pipeline.
///
/// The service holds shared capability handles and a metrics registry. Each call to
/// [`CategorizationService::categorize`] builds fresh components under a new run id, so one
/// service can serve any number of batches.
pub struct CategorizationService {
    embedder: SharedEmbeddingClient,
    clusterer: Option<SharedClusterer>,
    zero_shot: Option<SharedZeroShotClassifier>,
    keywords: Option<KeywordSettings>,
    metrics: Arc<RunMetrics>,
}

impl CategorizationService {
    /// Build a service that embeds with `embedder`.
    pub fn new(embedder: SharedEmbeddingClient) -> Self {
        Self {
            embedder,
            clusterer: None,
            zero_shot: None,
            keywords: None,
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    /// Enable automatic topic discovery through `clusterer`.
    pub fn with_clusterer(mut self, clusterer: SharedClusterer) -> Self {
        self.clusterer = Some(clusterer);
        self
    }

    /// Enable zero-shot naming of discovered topics.
    pub fn with_zero_shot(mut self, classifier: SharedZeroShotClassifier) -> Self {
        self.zero_shot = Some(classifier);
        self
    }

    /// Represent each document by its extracted keyphrases instead of its raw text.
    pub fn with_keywords(
        mut self,
        extractor: SharedKeyphraseExtractor,
        top_n: usize,
        chunk_size: usize,
    ) -> Self {
        self.keywords = Some(KeywordSettings {
            extractor,
            top_n,
            chunk_size,
        });
        self
    }

    /// Assign every document a topic according to `mode`.
    ///
    /// Rows come back sorted by confidence, highest first; ties keep input order.
    pub async fn categorize(
        &self,
        documents: Vec<Document>,
        mode: &Mode,
    ) -> Result<CategorizationReport, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(run = %run_id, documents = documents.len(), "Categorizing documents");

        let (keywords, degraded_extractions) = self.extract_keywords(&run_id, &documents).await;
        let basis: Vec<String> = documents
            .iter()
            .zip(&keywords)
            .map(|(document, phrases)| {
                if phrases.is_empty() {
                    document.text.clone()
                } else {
                    phrases.join(" ")
                }
            })
            .collect();

        let (assignments, clusters) = match mode {
            Mode::Predefined(tree) => {
                let embeddings = self.embed_batch(basis).await?;
                let categorizer = HierarchicalCategorizer::new(
                    self.embedder.clone(),
                    component_span(&run_id, "hierarchical_categorizer"),
                );
                let matches = categorizer.assign_hierarchical(&embeddings, tree).await?;
                let assignments = documents
                    .iter()
                    .zip(matches)
                    .zip(embeddings)
                    .map(|((document, found), embedding)| Assignment {
                        document_id: document.id.clone(),
                        main_label: found.main_label,
                        sub_label: found.sub_label,
                        confidence: found.confidence,
                        sub_confidence: found.sub_confidence,
                        embedding,
                    })
                    .collect::<Vec<_>>();
                (assignments, Vec::new())
            }
            Mode::Automatic { zero_shot } => {
                let clusterer = self
                    .clusterer
                    .clone()
                    .ok_or(PipelineError::MissingCapability("clusterer"))?;
                let naming = if *zero_shot {
                    let classifier = self
                        .zero_shot
                        .clone()
                        .ok_or(PipelineError::MissingCapability("zero-shot classifier"))?;
                    TopicNaming::ZeroShot(classifier)
                } else {
                    TopicNaming::Keywords
                };
                let router = UnsupervisedTopicRouter::new(
                    clusterer,
                    naming,
                    component_span(&run_id, "topic_router"),
                );
                let discovery = router.discover(&basis).await?;
                let assignments = documents
                    .iter()
                    .zip(discovery.assignments)
                    .zip(discovery.embeddings)
                    .map(|((document, topic), embedding)| Assignment {
                        document_id: document.id.clone(),
                        main_label: topic.name,
                        sub_label: String::new(),
                        confidence: topic.confidence,
                        sub_confidence: 0.0,
                        embedding,
                    })
                    .collect::<Vec<_>>();
                (assignments, discovery.clusters)
            }
        };

        let mut rows: Vec<CategorizedDocument> = documents
            .into_iter()
            .zip(assignments)
            .zip(keywords)
            .map(|((document, assignment), keywords)| CategorizedDocument {
                document,
                assignment,
                keywords,
            })
            .collect();
        rows.sort_by(|a, b| b.assignment.confidence.total_cmp(&a.assignment.confidence));

        self.metrics
            .record_batch(rows.len() as u64, degraded_extractions as u64);
        tracing::info!(
            run = %run_id,
            documents = rows.len(),
            clusters = clusters.len(),
            degraded_extractions,
            "Categorization complete"
        );

        Ok(CategorizationReport {
            rows,
            clusters,
            degraded_extractions,
        })
    }

    /// Upsert one point per categorized document into `collection`.
    pub async fn persist(
        &self,
        report: &CategorizationReport,
        store: &dyn VectorStore,
        collection: &str,
    ) -> Result<IndexSummary, PipelineError> {
        let Some(first) = report.rows.first() else {
            return Ok(IndexSummary::default());
        };

        let vector_size = first.assignment.embedding.len() as u64;
        store.ensure_collection(collection, vector_size).await?;

        let timestamp = current_timestamp_rfc3339();
        let points: Vec<PointInsert> = report
            .rows
            .iter()
            .map(|row| to_point_insert(row, generate_point_id(), &timestamp))
            .collect();

        let summary = store.upsert(collection, points).await?;
        self.metrics.record_stored(summary.inserted as u64);
        tracing::info!(collection, inserted = summary.inserted, "Documents stored");
        Ok(summary)
    }

    /// Embed `query` and return the closest stored documents, optionally within one topic.
    pub async fn search(
        &self,
        qdrant: &QdrantService,
        collection: &str,
        query: &str,
        topic: Option<String>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, PipelineError> {
        let vector = self
            .embed_batch(vec![query.to_string()])
            .await?
            .pop()
            .ok_or(EmbeddingClientError::CountMismatch {
                expected: 1,
                actual: 0,
            })?;

        let filter = build_search_filter(&SearchFilterArgs {
            topic,
            ..Default::default()
        });
        let hits = qdrant
            .search_points(collection, vector, filter, limit.max(1))
            .await?;
        Ok(hits.into_iter().map(map_scored_point).collect())
    }

    /// Return the current run metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn extract_keywords(
        &self,
        run_id: &str,
        documents: &[Document],
    ) -> (Vec<Vec<String>>, usize) {
        let Some(settings) = &self.keywords else {
            return (vec![Vec::new(); documents.len()], 0);
        };

        let extractor = KeywordExtractor::new(
            settings.extractor.clone(),
            component_span(run_id, "keyword_extractor"),
        );
        let mut keywords = Vec::with_capacity(documents.len());
        let mut degraded = 0;
        for document in documents {
            let outcome = extractor
                .extract(&document.text, settings.top_n, settings.chunk_size)
                .await;
            degraded += outcome.degraded.len();
            keywords.push(outcome.keywords);
        }
        (keywords, degraded)
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, PipelineError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        let embeddings = self.embedder.generate_embeddings(texts).await?;
        if embeddings.len() != expected {
            return Err(EmbeddingClientError::CountMismatch {
                expected,
                actual: embeddings.len(),
            }
            .into());
        }
        Ok(embeddings)
    }
}
