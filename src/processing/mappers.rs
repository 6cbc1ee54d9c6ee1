//! Mapping helpers between categorized documents and Qdrant payloads.

use crate::{
    processing::types::{CategorizedDocument, SearchHit},
    qdrant::{PointInsert, ScoredPoint},
};
use serde_json::{Map, Value};

/// Build the point stored for a categorized document.
pub(crate) fn to_point_insert(
    row: &CategorizedDocument,
    point_id: String,
    timestamp_rfc3339: &str,
) -> PointInsert {
    let CategorizedDocument {
        document,
        assignment,
        keywords,
    } = row;

    let mut payload = Map::new();
    payload.insert("file_name".into(), Value::String(document.id.clone()));
    payload.insert("topic".into(), Value::String(assignment.main_label.clone()));
    payload.insert(
        "sub_topic".into(),
        Value::String(assignment.sub_label.clone()),
    );
    payload.insert("confidence".into(), Value::from(assignment.confidence));
    payload.insert(
        "sub_confidence".into(),
        Value::from(assignment.sub_confidence),
    );
    payload.insert("sha256".into(), Value::String(document.sha256.clone()));
    if let Some(fuzzy) = document
        .fuzzy_hash
        .as_ref()
        .filter(|value| !value.trim().is_empty())
    {
        payload.insert("fuzzy_hash".into(), Value::String(fuzzy.clone()));
    }
    payload.insert(
        "file_type".into(),
        Value::String(document.file_type.clone()),
    );
    payload.insert("text".into(), Value::String(document.text.clone()));
    payload.insert(
        "keywords".into(),
        Value::Array(keywords.iter().cloned().map(Value::String).collect()),
    );
    payload.insert(
        "timestamp".into(),
        Value::String(timestamp_rfc3339.to_string()),
    );

    PointInsert {
        id: point_id,
        vector: assignment.embedding.clone(),
        payload,
    }
}

/// Map a Qdrant scored point into a search hit.
pub(crate) fn map_scored_point(point: ScoredPoint) -> SearchHit {
    let ScoredPoint { id, score, payload } = point;
    let mut map = payload.unwrap_or_default();

    SearchHit {
        id,
        score,
        file_name: take_text(&mut map, "file_name"),
        topic: take_text(&mut map, "topic"),
        sub_topic: take_text(&mut map, "sub_topic"),
        text: take_text(&mut map, "text"),
    }
}

fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::Assignment;
    use crate::processing::types::Document;
    use std::path::PathBuf;

    fn row(fuzzy_hash: Option<String>) -> CategorizedDocument {
        CategorizedDocument {
            document: Document {
                id: "phishing.txt".into(),
                path: PathBuf::from("in/phishing.txt"),
                text: "Phishing emails target staff".into(),
                sha256: "abc".into(),
                fuzzy_hash,
                file_type: ".txt".into(),
            },
            assignment: Assignment {
                document_id: "phishing.txt".into(),
                main_label: "Security".into(),
                sub_label: "Cybersecurity".into(),
                confidence: 0.75,
                sub_confidence: 0.5,
                embedding: vec![1.0, 0.0],
            },
            keywords: vec!["phishing".into(), "staff".into()],
        }
    }

    #[test]
    fn point_payload_carries_document_and_assignment() {
        let point = to_point_insert(&row(None), "p-1".into(), "2025-01-01T00:00:00Z");

        assert_eq!(point.id, "p-1");
        assert_eq!(point.vector, vec![1.0_f32, 0.0]);
        assert_eq!(point.payload["file_name"], "phishing.txt");
        assert_eq!(point.payload["topic"], "Security");
        assert_eq!(point.payload["sub_topic"], "Cybersecurity");
        assert_eq!(point.payload["confidence"], 0.75);
        assert_eq!(point.payload["sha256"], "abc");
        assert_eq!(point.payload["file_type"], ".txt");
        assert_eq!(point.payload["keywords"][1], "staff");
        assert!(!point.payload.contains_key("fuzzy_hash"));
    }

    #[test]
    fn point_payload_includes_fuzzy_hash_when_supplied() {
        let point = to_point_insert(
            &row(Some("3:abc:def".into())),
            "p-2".into(),
            "2025-01-01T00:00:00Z",
        );
        assert_eq!(point.payload["fuzzy_hash"], "3:abc:def");
    }

    #[test]
    fn map_scored_point_extracts_payload_fields() {
        let mut payload = Map::new();
        payload.insert("text".into(), Value::String(" Example ".into()));
        payload.insert("file_name".into(), Value::String("note.md".into()));
        payload.insert("topic".into(), Value::String("Health".into()));
        payload.insert("sub_topic".into(), Value::String(String::new()));

        let hit = map_scored_point(ScoredPoint {
            id: "doc-1".into(),
            score: 0.42,
            payload: Some(payload),
        });

        assert_eq!(hit.id, "doc-1");
        assert_eq!(hit.text.as_deref(), Some("Example"));
        assert_eq!(hit.file_name.as_deref(), Some("note.md"));
        assert_eq!(hit.topic.as_deref(), Some("Health"));
        assert_eq!(hit.sub_topic, None);
    }
}
