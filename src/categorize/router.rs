//! Unsupervised topic discovery with human-readable cluster names.

use super::{CategorizeError, TopicAssignment, TopicCluster, TopicDiscovery};
use crate::clustering::{ClusterFit, SharedClusterer, UNCLUSTERED};
use crate::zero_shot::SharedZeroShotClassifier;
use std::collections::BTreeMap;
use tracing::{Instrument, Span};

/// Name given to the unclustered sentinel under keyword naming.
pub const NO_TOPIC: &str = "No Topic";
/// Name given to the unclustered sentinel under zero-shot naming.
pub const OUT_OF_CATEGORY: &str = "out of category";
const ZERO_SHOT_CANDIDATES: usize = 10;

/// How discovered clusters are named.
#[derive(Clone)]
pub enum TopicNaming {
    /// Join the two leading keyword tokens of the cluster's descriptive name.
    Keywords,
    /// Ask a zero-shot classifier to pick the best of the cluster's top keywords.
    ZeroShot(SharedZeroShotClassifier),
}

/// Routes documents to clusters found by a clustering capability and names those clusters.
pub struct UnsupervisedTopicRouter {
    clusterer: SharedClusterer,
    naming: TopicNaming,
    span: Span,
}

impl UnsupervisedTopicRouter {
    /// Create a router over `clusterer` using `naming`, logging under `span`.
    pub fn new(clusterer: SharedClusterer, naming: TopicNaming, span: Span) -> Self {
        Self {
            clusterer,
            naming,
            span,
        }
    }

    /// Cluster `documents` and return per-document topics, the named clusters and embeddings.
    ///
    /// Names are resolved afresh on every call. An empty batch returns an empty discovery
    /// without invoking the clusterer.
    pub async fn discover(&self, documents: &[String]) -> Result<TopicDiscovery, CategorizeError> {
        async {
            if documents.is_empty() {
                return Ok(TopicDiscovery::default());
            }

            tracing::info!(documents = documents.len(), "Discovering topics");
            let fit = self.clusterer.fit(documents).await?;
            fit.validate(documents.len())?;

            let mut sizes: BTreeMap<i32, usize> = fit
                .topic_summary()
                .iter()
                .map(|summary| (summary.cluster_id, 0))
                .collect();
            for topic in &fit.topics {
                *sizes.entry(*topic).or_default() += 1;
            }

            let mut clusters = Vec::with_capacity(sizes.len());
            let mut names = BTreeMap::new();
            for (id, size) in sizes {
                let name = self.cluster_name(&fit, id).await?;
                tracing::debug!(cluster = id, name = %name, size, "Named topic");
                names.insert(id, name.clone());
                clusters.push(TopicCluster {
                    id,
                    keywords: fit.topic_keywords(id).to_vec(),
                    name,
                    size,
                });
            }

            let assignments = fit
                .topics
                .iter()
                .enumerate()
                .map(|(doc, &cluster_id)| TopicAssignment {
                    cluster_id,
                    name: names.get(&cluster_id).cloned().unwrap_or_default(),
                    confidence: if cluster_id == UNCLUSTERED {
                        0.0
                    } else {
                        fit.assigned_probability(doc).unwrap_or(0.0)
                    },
                })
                .collect();

            tracing::info!(clusters = clusters.len(), "Topic discovery complete");
            Ok(TopicDiscovery {
                assignments,
                clusters,
                embeddings: fit.embeddings,
            })
        }
        .instrument(self.span.clone())
        .await
    }

    async fn cluster_name(&self, fit: &ClusterFit, id: i32) -> Result<String, CategorizeError> {
        match &self.naming {
            TopicNaming::Keywords if id == UNCLUSTERED => Ok(NO_TOPIC.to_string()),
            TopicNaming::Keywords => Ok(keyword_name(fit, id)),
            TopicNaming::ZeroShot(_) if id == UNCLUSTERED => Ok(OUT_OF_CATEGORY.to_string()),
            TopicNaming::ZeroShot(classifier) => {
                let candidates: Vec<String> = fit
                    .topic_keywords(id)
                    .iter()
                    .take(ZERO_SHOT_CANDIDATES)
                    .map(|(word, _)| word.clone())
                    .collect();
                if candidates.is_empty() {
                    return Ok(format!("Topic {id}"));
                }
                let ranked = classifier
                    .classify(&candidates.join(" "), &candidates)
                    .await?;
                Ok(ranked
                    .into_iter()
                    .next()
                    .map(|(label, _)| label)
                    .unwrap_or_else(|| format!("Topic {id}")))
            }
        }
    }
}

/// Name from the descriptive `"{id}_{w1}_{w2}_.."` entry, falling back to the keyword list.
fn keyword_name(fit: &ClusterFit, id: i32) -> String {
    let from_summary = fit
        .topic_summary()
        .iter()
        .find(|summary| summary.cluster_id == id)
        .map(|summary| {
            summary
                .name
                .split('_')
                .skip(1)
                .take(2)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|name| !name.trim().is_empty());

    from_summary
        .or_else(|| {
            let words: Vec<&str> = fit
                .topic_keywords(id)
                .iter()
                .take(2)
                .map(|(word, _)| word.as_str())
                .collect();
            (!words.is_empty()).then(|| words.join(" "))
        })
        .unwrap_or_else(|| format!("Topic {id}"))
}
