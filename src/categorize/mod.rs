//! Topic assignment: nearest-label matching over predefined taxonomies and unsupervised topic
//! discovery.
//!
//! Every component takes its capabilities and a [`tracing::Span`] at construction and holds no
//! other state, so one instance can serve any number of batches.

mod assigner;
mod hierarchy;
mod keywords;
mod labels;
mod router;
pub mod types;

pub use assigner::{LabelAssigner, assign_with_label_embeddings};
pub use hierarchy::HierarchicalCategorizer;
pub use keywords::{KeywordExtractor, wrap_text};
pub use labels::{Category, LabelTree};
pub use router::{NO_TOPIC, OUT_OF_CATEGORY, TopicNaming, UnsupervisedTopicRouter};
pub use types::{
    Assignment, CategorizeError, ExtractionDegraded, HierarchicalMatch, KeywordOutcome,
    LabelMatch, TopicAssignment, TopicCluster, TopicDiscovery,
};
