use async_trait::async_trait;
use httpmock::{
    Method::{GET, PUT},
    MockServer,
};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use topicsort::{
    categorize::{LabelTree, NO_TOPIC},
    clustering::StaticClusterer,
    embedding::{EmbeddingClient, EmbeddingClientError, HashEmbedder},
    keyphrase::FrequencyKeyphraseExtractor,
    processing::{self, CategorizationService, Mode},
    qdrant::QdrantService,
};

/// Embeds known strings to fixed vectors so assignments are predictable.
struct Table(HashMap<&'static str, [f32; 3]>);

#[async_trait]
impl EmbeddingClient for Table {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        texts
            .iter()
            .map(|text| {
                self.0
                    .get(text.as_str())
                    .map(|vector| vector.to_vec())
                    .ok_or_else(|| EmbeddingClientError::GenerationFailed(format!("unknown: {text}")))
            })
            .collect()
    }
}

fn security_health_table() -> Arc<Table> {
    Arc::new(Table(HashMap::from([
        ("Security", [1.0, 0.0, 0.0]),
        ("Health", [0.0, 1.0, 0.0]),
        ("Cybersecurity", [1.0, 0.0, 1.0]),
        ("Physical Security", [1.0, 0.0, -1.0]),
        ("Nutrition", [0.0, 1.0, 0.0]),
        ("phishing and malware attacks", [1.0, 0.0, 0.5]),
        ("door locks and guards", [1.0, 0.0, -0.6]),
        ("healthy meals", [0.1, 1.0, 0.0]),
    ])))
}

const TAXONOMY: &str = r#"[
    { "label": "Security", "subtopics": ["Cybersecurity", "Physical Security"] },
    { "label": "Health", "subcategories": ["Nutrition"] }
]"#;

#[tokio::test]
async fn taxonomy_run_sorts_and_organizes_documents() {
    let input = tempfile::tempdir().expect("input");
    let output = tempfile::tempdir().expect("output");
    fs::write(input.path().join("phishing.txt"), "phishing and malware attacks").expect("write");
    fs::write(input.path().join("locks.md"), "door locks and guards").expect("write");
    fs::write(input.path().join("meals.txt"), "healthy meals").expect("write");
    fs::write(input.path().join("photo.jpg"), [0xFF_u8, 0xD8]).expect("write");

    let documents = processing::load_documents(input.path()).expect("load");
    assert_eq!(documents.len(), 3);

    let tree = LabelTree::from_json_str(TAXONOMY).expect("taxonomy");
    let service = CategorizationService::new(security_health_table());
    let report = service
        .categorize(documents, &Mode::Predefined(tree))
        .await
        .expect("categorize");

    let rows: Vec<(&str, &str, &str)> = report
        .rows
        .iter()
        .map(|row| {
            (
                row.document.id.as_str(),
                row.assignment.main_label.as_str(),
                row.assignment.sub_label.as_str(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("meals.txt", "Health", "Nutrition"),
            ("phishing.txt", "Security", "Cybersecurity"),
            ("locks.md", "Security", "Physical Security"),
        ]
    );
    for row in &report.rows {
        assert!((-1.0..=1.0).contains(&row.assignment.confidence));
        assert_eq!(row.assignment.embedding.len(), 3);
    }

    let copied = processing::organize(&report, output.path()).expect("organize");
    assert_eq!(copied, 3);
    assert!(
        output
            .path()
            .join("Security")
            .join("Physical Security")
            .join("locks.md")
            .is_file()
    );
    assert!(
        output
            .path()
            .join("Health")
            .join("Nutrition")
            .join("meals.txt")
            .is_file()
    );
}

#[tokio::test]
async fn discovered_topics_are_stored_in_qdrant() {
    let server = MockServer::start_async().await;
    let exists = server
        .mock_async(|when, then| {
            when.method(GET).path("/collections/documents");
            then.status(200).json_body(json!({ "result": {} }));
        })
        .await;
    let indexes = server
        .mock_async(|when, then| {
            when.method(PUT).path("/collections/documents/index");
            then.status(200).json_body(json!({ "result": { "status": "acknowledged" } }));
        })
        .await;
    let upsert = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/collections/documents/points")
                .query_param("wait", "true")
                .body_contains("\"topic\":\"malware phishing\"")
                .body_contains(&format!("\"topic\":\"{NO_TOPIC}\""));
            then.status(200)
                .json_body(json!({ "result": { "status": "completed" } }));
        })
        .await;

    let input = tempfile::tempdir().expect("input");
    fs::write(
        input.path().join("a.txt"),
        "Malware and phishing campaigns hit the finance team.",
    )
    .expect("write");
    fs::write(input.path().join("b.txt"), "A sourdough recipe.").expect("write");
    let documents = processing::load_documents(input.path()).expect("load");

    let embedder = Arc::new(HashEmbedder::new(32));
    let clusterer = Arc::new(
        StaticClusterer::new(embedder.clone(), vec![0, -1])
            .with_keywords(0, &["malware", "phishing", "finance"]),
    );
    let service = CategorizationService::new(embedder)
        .with_clusterer(clusterer)
        .with_keywords(Arc::new(FrequencyKeyphraseExtractor), 5, 1000);

    let report = service
        .categorize(documents, &Mode::Automatic { zero_shot: false })
        .await
        .expect("categorize");
    assert_eq!(report.rows[0].assignment.main_label, "malware phishing");
    assert_eq!(report.rows[1].assignment.main_label, NO_TOPIC);
    assert!(!report.rows[0].keywords.is_empty());

    let qdrant = QdrantService::new(&server.base_url(), None).expect("qdrant");
    let summary = service
        .persist(&report, &qdrant, "documents")
        .await
        .expect("persist");

    exists.assert();
    indexes.assert_hits(4);
    upsert.assert();
    assert_eq!(summary.inserted, 2);
    assert_eq!(service.metrics_snapshot().documents_stored, 2);
}
