use std::{env, sync::Once};

use topicsort::{config, embedding, qdrant::QdrantService};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() -> &'static config::Config {
    INIT.call_once(|| {
        set_default_env("QDRANT_URL", "http://127.0.0.1:6333");
        set_default_env("QDRANT_COLLECTION_NAME", "topicsort-live");
        set_default_env("EMBEDDING_PROVIDER", "ollama");
        set_default_env("EMBEDDING_MODEL", "nomic-embed-text");
        set_default_env("EMBEDDING_DIMENSION", "768");
        set_default_env("OLLAMA_URL", "http://127.0.0.1:11434");
        config::init_config().expect("live configuration");
    });
    config::CONFIG.get().expect("configuration initialized")
}

#[tokio::test]
#[ignore = "Requires live Qdrant"]
async fn live_qdrant_statistics() {
    let config = init_config_once();
    let qdrant = QdrantService::new(&config.qdrant_url, config.qdrant_api_key.clone())
        .expect("qdrant client");
    qdrant
        .create_collection_if_not_exists(
            &config.qdrant_collection_name,
            config.embedding_dimension as u64,
        )
        .await
        .expect("collection");
    let stats = qdrant
        .statistics(&config.qdrant_collection_name)
        .await
        .expect("statistics");
    let per_topic: usize = stats.documents_per_topic.values().sum();
    assert_eq!(per_topic, stats.total_documents);
}

#[tokio::test]
#[ignore = "Requires live Ollama embeddings"]
async fn live_ollama_embedding_roundtrip() {
    let config = init_config_once();
    let client = embedding::get_embedding_client(config);
    let vectors = client
        .generate_embeddings(vec!["topicsort live embedding".to_string()])
        .await
        .expect("failed to request embeddings from provider");
    assert_eq!(vectors.len(), 1, "expected one embedding per input");
    assert_eq!(
        vectors[0].len(),
        config.embedding_dimension,
        "embedding dimension mismatch"
    );
}
