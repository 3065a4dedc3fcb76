//! # Crypto Podcast Texts
//!
//! Summarizes a batch of crypto news articles through an OpenAI-compatible
//! chat-completions API and uploads the generated text assets to a Google
//! Cloud Storage bucket, for consumption by the downstream podcast generator.
//!
//! ## Usage
//!
//! ```sh
//! crypto_podcast_texts -a ./articles.json -c ./config.yaml
//! ```
//!
//! ## Pipeline
//!
//! 1. **Load**: Read the collector's article batch and the YAML configuration
//! 2. **Summarize**: One deterministic generation request per article, in order
//! 3. **Assets**: Generate the episode description, introduction, and outro,
//!    falling back to configured default text on failure
//! 4. **Upload**: Write every asset as a text blob to the bucket
//!
//! Articles whose summary request fails are dropped from the output; the run
//! itself always completes and always produces all four blobs.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod models;
mod storage;
mod summarizer;
mod utils;

use api::OpenAiClient;
use cli::Cli;
use models::Article;
use storage::GcsStore;
use summarizer::NewsSummarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("crypto_podcast_texts starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.articles, ?args.config, "Parsed CLI arguments");

    // ---- Load configuration ----
    let mut config = config::load_config(&args.config).await?;
    if let Some(bucket) = args.bucket {
        info!(%bucket, "Overriding bucket from CLI/env");
        config.override_bucket(bucket)?;
    }
    if let Some(credentials) = args.credentials {
        config.credentials_path = Some(credentials);
    }
    let api_key = config.resolved_api_key()?;

    // ---- Load articles ----
    let raw = tokio::fs::read_to_string(&args.articles).await?;
    let articles: Vec<Article> = serde_json::from_str(&raw)?;
    info!(count = articles.len(), path = %args.articles, "Loaded articles");
    if articles.len() < 4 {
        warn!(
            count = articles.len(),
            "Fewer than four articles; some episode assets will use fallback text"
        );
    }

    // ---- Build clients ----
    let chat = OpenAiClient::new(&config.api_base, &api_key, &config.model);
    let store = GcsStore::connect(&config.bucket, config.credentials_path.as_deref()).await?;

    // ---- Run the pipeline ----
    let mut summarizer = NewsSummarizer::new(config, chat, store, articles);
    let report = summarizer.summarize_articles().await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        summaries_kept = report.summaries_kept,
        summaries_dropped = report.summaries_dropped,
        description_generated = report.description.is_generated(),
        introduction_generated = report.introduction.is_generated(),
        outro_generated = report.outro.is_generated(),
        fallback_assets = report.fallback_assets(),
        "Execution complete"
    );

    Ok(())
}
