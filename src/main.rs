//! `topicsort` command-line entrypoint.
//!
//! Categorizes a folder of documents against a taxonomy or discovered topics, stores the results
//! in Qdrant and answers statistics and similarity queries over the stored collection.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use topicsort::{
    categorize::LabelTree,
    clustering::HttpClusterer,
    config::{self, Config},
    embedding,
    keyphrase::EmbeddingKeyphraseExtractor,
    logging,
    processing::{self, CategorizationReport, CategorizationService, Mode},
    qdrant::QdrantService,
    zero_shot::{HttpZeroShotClassifier, LexicalZeroShotClassifier, SharedZeroShotClassifier},
};

#[derive(Parser)]
#[command(
    name = "topicsort",
    about = "Sort documents into topics and store them in Qdrant"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Categorize every supported file in a folder.
    Categorize {
        #[arg(long)]
        input: PathBuf,
        /// Copy files into per-topic folders under this directory.
        #[arg(long)]
        output: Option<PathBuf>,
        /// JSON taxonomy; topics are discovered automatically when omitted.
        #[arg(long)]
        taxonomy: Option<PathBuf>,
        /// Name discovered topics with the zero-shot classifier.
        #[arg(long)]
        zero_shot: bool,
        /// Embed extracted keyphrases instead of raw text.
        #[arg(long)]
        keywords: bool,
        /// Skip writing results to Qdrant.
        #[arg(long)]
        no_store: bool,
    },
    /// Show document counts per topic and subtopic.
    Stats,
    /// List every stored document with its topic.
    List,
    /// Find stored documents similar to a query.
    Search {
        query: String,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::init_tracing();
    let cli = Cli::parse();
    let config = config::init_config().context("failed to load configuration")?;

    match cli.command {
        Command::Categorize {
            input,
            output,
            taxonomy,
            zero_shot,
            keywords,
            no_store,
        } => {
            let mode = match taxonomy {
                Some(path) => Mode::Predefined(load_taxonomy(&path)?),
                None => Mode::Automatic { zero_shot },
            };
            let service = build_service(config, keywords);
            let documents = processing::load_documents(&input)
                .with_context(|| format!("failed to load documents from {}", input.display()))?;
            let report = service
                .categorize(documents, &mode)
                .await
                .context("categorization failed")?;
            print_report(&report);

            if !no_store {
                let qdrant = qdrant_service(config)?;
                let summary = service
                    .persist(&report, &qdrant, &config.qdrant_collection_name)
                    .await
                    .context("failed to store documents in Qdrant")?;
                println!(
                    "Stored {} documents in '{}'",
                    summary.inserted, config.qdrant_collection_name
                );
            }

            if let Some(output) = output {
                let copied = processing::organize(&report, &output).with_context(|| {
                    format!("failed to organize documents into {}", output.display())
                })?;
                println!("Copied {copied} files into {}", output.display());
            }

            tracing::info!(metrics = ?service.metrics_snapshot(), "Run finished");
        }
        Command::Stats => {
            let qdrant = qdrant_service(config)?;
            let stats = qdrant
                .statistics(&config.qdrant_collection_name)
                .await
                .context("failed to read collection statistics")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("failed to render statistics")?
            );
        }
        Command::List => {
            let qdrant = qdrant_service(config)?;
            let documents = qdrant
                .list_documents(&config.qdrant_collection_name)
                .await
                .context("failed to list stored documents")?;
            for document in &documents {
                println!(
                    "{}  [{}{}]",
                    document.file_name.as_deref().unwrap_or("?"),
                    document.topic.as_deref().unwrap_or("Unknown"),
                    document
                        .sub_topic
                        .as_deref()
                        .map(|sub| format!(" / {sub}"))
                        .unwrap_or_default(),
                );
            }
            println!("{} documents", documents.len());
        }
        Command::Search {
            query,
            topic,
            limit,
        } => {
            let qdrant = qdrant_service(config)?;
            let service = build_service(config, false);
            let hits = service
                .search(&qdrant, &config.qdrant_collection_name, &query, topic, limit)
                .await
                .context("search failed")?;
            for hit in hits {
                println!(
                    "{:.3}  {}  [{}{}]",
                    hit.score,
                    hit.file_name.as_deref().unwrap_or(&hit.id),
                    hit.topic.as_deref().unwrap_or("Unknown"),
                    hit.sub_topic
                        .map(|sub| format!(" / {sub}"))
                        .unwrap_or_default(),
                );
            }
        }
    }

    Ok(())
}

fn build_service(config: &Config, keywords: bool) -> CategorizationService {
    let embedder = embedding::get_embedding_client(config);
    let zero_shot: SharedZeroShotClassifier = match &config.zero_shot_url {
        Some(url) => Arc::new(HttpZeroShotClassifier::new(
            url.clone(),
            config.zero_shot_api_key.clone(),
        )),
        None => Arc::new(LexicalZeroShotClassifier),
    };

    let mut service = CategorizationService::new(embedder.clone()).with_zero_shot(zero_shot);
    if let Some(url) = &config.topic_service_url {
        service = service.with_clusterer(Arc::new(HttpClusterer::new(url.clone())));
    }
    if keywords {
        service = service.with_keywords(
            Arc::new(EmbeddingKeyphraseExtractor::new(embedder)),
            config.keyword_top_n,
            config.keyword_chunk_size,
        );
    }
    service
}

fn qdrant_service(config: &Config) -> Result<QdrantService> {
    QdrantService::new(&config.qdrant_url, config.qdrant_api_key.clone())
        .context("failed to initialize Qdrant client")
}

fn load_taxonomy(path: &Path) -> Result<LabelTree> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read taxonomy at {}", path.display()))?;
    LabelTree::from_json_str(&raw)
        .with_context(|| format!("invalid taxonomy in {}", path.display()))
}

fn print_report(report: &CategorizationReport) {
    for (label, rows) in report.grouped() {
        println!("{label} ({})", rows.len());
        for row in rows {
            let sub = if row.assignment.sub_label.is_empty() {
                String::new()
            } else {
                format!(" / {}", row.assignment.sub_label)
            };
            println!(
                "  {:.3}  {}{sub}",
                row.assignment.confidence, row.document.id
            );
        }
    }
    if report.degraded_extractions > 0 {
        println!(
            "{} keyword chunks could not be processed",
            report.degraded_extractions
        );
    }
}
