//! Filter helpers for Qdrant search queries and payload accumulation.

use serde_json::{Map, Value, json};

use super::types::{CollectionStatistics, SearchFilterArgs, StoredDocument};

const UNKNOWN: &str = "Unknown";

/// Compose the standard Qdrant filter payload from optional search arguments.
pub fn build_search_filter(args: &SearchFilterArgs) -> Option<Value> {
    let must: Vec<Value> = [
        ("topic", &args.topic),
        ("sub_topic", &args.sub_topic),
        ("file_type", &args.file_type),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value.as_deref().and_then(non_empty).map(|value| {
            json!({
                "key": key,
                "match": { "value": value }
            })
        })
    })
    .collect();

    if must.is_empty() {
        None
    } else {
        Some(json!({ "must": must }))
    }
}

fn non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Count one stored payload towards the collection statistics.
///
/// Missing or non-string `topic` values count as `Unknown`; an empty `sub_topic` is skipped.
pub fn accumulate_statistics(payload: &Map<String, Value>, stats: &mut CollectionStatistics) {
    stats.total_documents += 1;

    let topic = match payload.get("topic") {
        Some(Value::String(topic)) if !topic.trim().is_empty() => topic.trim(),
        _ => UNKNOWN,
    };
    *stats
        .documents_per_topic
        .entry(topic.to_string())
        .or_default() += 1;

    let sub_topic = match payload.get("sub_topic") {
        Some(Value::String(sub)) => non_empty(sub),
        _ => Some(UNKNOWN),
    };
    if let Some(sub_topic) = sub_topic {
        *stats
            .documents_per_subtopic
            .entry(sub_topic.to_string())
            .or_default() += 1;
    }
}

/// Payload fields read back by [`stored_document`].
pub(crate) const DOCUMENT_FIELDS: [&str; 8] = [
    "file_name",
    "topic",
    "sub_topic",
    "confidence",
    "file_type",
    "sha256",
    "fuzzy_hash",
    "timestamp",
];

/// Read document metadata from a stored payload; blank or mistyped fields become `None`.
pub fn stored_document(payload: &Map<String, Value>) -> StoredDocument {
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .and_then(non_empty)
            .map(str::to_string)
    };

    StoredDocument {
        file_name: text("file_name"),
        topic: text("topic"),
        sub_topic: text("sub_topic"),
        confidence: payload.get("confidence").and_then(Value::as_f64),
        file_type: text("file_type"),
        sha256: text("sha256"),
        fuzzy_hash: text("fuzzy_hash"),
        timestamp: text("timestamp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_search_filter_handles_topic() {
        let filter = build_search_filter(&SearchFilterArgs {
            topic: Some("Security".into()),
            ..Default::default()
        })
        .expect("filter");

        assert_eq!(
            filter,
            json!({
                "must": [
                    {
                        "key": "topic",
                        "match": { "value": "Security" }
                    }
                ]
            })
        );
    }

    #[test]
    fn build_search_filter_combines_fields() {
        let filter = build_search_filter(&SearchFilterArgs {
            topic: Some("Security".into()),
            sub_topic: Some("  ".into()),
            file_type: Some(".md".into()),
        })
        .expect("filter");

        let must = filter["must"].as_array().expect("must");
        assert_eq!(must.len(), 2);
        assert_eq!(must[1]["key"], "file_type");
    }

    #[test]
    fn build_search_filter_returns_none_when_empty() {
        assert!(build_search_filter(&SearchFilterArgs::default()).is_none());
    }

    #[test]
    fn statistics_count_unknown_and_skip_empty_subtopics() {
        let mut stats = CollectionStatistics::default();

        let mut first = Map::new();
        first.insert("topic".into(), Value::String("Security".into()));
        first.insert("sub_topic".into(), Value::String("Cybersecurity".into()));
        accumulate_statistics(&first, &mut stats);

        let mut second = Map::new();
        second.insert("topic".into(), Value::String("Health".into()));
        second.insert("sub_topic".into(), Value::String(String::new()));
        accumulate_statistics(&second, &mut stats);

        accumulate_statistics(&Map::new(), &mut stats);

        assert_eq!(stats.total_documents, 3);
        assert_eq!(stats.documents_per_topic["Security"], 1);
        assert_eq!(stats.documents_per_topic["Health"], 1);
        assert_eq!(stats.documents_per_topic["Unknown"], 1);
        assert_eq!(stats.documents_per_subtopic["Cybersecurity"], 1);
        assert_eq!(stats.documents_per_subtopic["Unknown"], 1);
        assert_eq!(stats.documents_per_subtopic.len(), 2);
    }

    #[test]
    fn stored_document_reads_known_fields() {
        let payload = json!({
            "file_name": "phishing.txt",
            "topic": "Security",
            "sub_topic": "",
            "confidence": 0.5,
            "sha256": 42,
            "fuzzy_hash": "3:abc:def"
        });
        let Value::Object(payload) = payload else {
            unreachable!("object literal");
        };

        let document = stored_document(&payload);
        assert_eq!(document.file_name.as_deref(), Some("phishing.txt"));
        assert_eq!(document.topic.as_deref(), Some("Security"));
        assert_eq!(document.sub_topic, None);
        assert_eq!(document.confidence, Some(0.5));
        assert_eq!(document.sha256, None);
        assert_eq!(document.fuzzy_hash.as_deref(), Some("3:abc:def"));
        assert_eq!(document.timestamp, None);
    }
}
