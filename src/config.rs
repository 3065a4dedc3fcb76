//! Configuration loading for the summarizer.
//!
//! All runtime configuration lives in a single [`SummarizerConfig`] value
//! loaded from a YAML file and passed explicitly at construction — nothing
//! here mutates process-global state. The OpenAI API key may be supplied via
//! the `OPENAI_API_KEY` environment variable instead of the file.
//!
//! # Example config.yaml
//!
//! ```yaml
//! bucket: my-podcast-bucket
//! credentials_path: TTSCredentials.json
//! model: gpt-3.5-turbo
//! summary_prompt: "Summarize the following article for the show: "
//! description_prompt: "Write an episode description covering: "
//! introduction_prompt: "Write a fun introduction for a crypto news podcast."
//! introduction_default: "Welcome to the show! Today we start with:"
//! outro_prompt: "Write a short outro for a crypto news podcast."
//! outro_default: "That's all for today. See you tomorrow!"
//! ```

use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Runtime configuration for a [`NewsSummarizer`](crate::summarizer::NewsSummarizer) run.
///
/// The prompt fields are treated as opaque strings: each is prepended (or used
/// verbatim) when building the corresponding generation request. The two
/// `*_default` fields are the fallback texts uploaded when a generation call
/// fails.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// API key; falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier sent with every generation request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Path to a GCS service-account JSON file. When absent, application
    /// default credentials are used.
    #[serde(default)]
    pub credentials_path: Option<String>,
    /// Name of the GCS bucket the text assets are uploaded to.
    pub bucket: String,
    /// Prepended to each article body for the per-article summary request.
    pub summary_prompt: String,
    /// Prepended to the first three headlines for the description request.
    pub description_prompt: String,
    /// Full user prompt for the introduction request.
    pub introduction_prompt: String,
    /// Fallback introduction text; the 4th headline is appended when present.
    pub introduction_default: String,
    /// Full user prompt for the outro request.
    pub outro_prompt: String,
    /// Fallback outro text, uploaded verbatim.
    pub outro_default: String,
}

impl SummarizerConfig {
    /// Replace the bucket with a CLI/environment override.
    ///
    /// # Errors
    ///
    /// Returns an error when the override is empty, matching the check
    /// applied to the config file value at load time.
    pub fn override_bucket(&mut self, bucket: String) -> Result<(), Box<dyn Error>> {
        if bucket.is_empty() {
            return Err("bucket override must not be empty".into());
        }
        self.bucket = bucket;
        Ok(())
    }

    /// Resolve the API key from the config file or the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides a key.
    pub fn resolved_api_key(&self) -> Result<String, Box<dyn Error>> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err("no API key: set `api_key` in config.yaml or OPENAI_API_KEY".into()),
        }
    }
}

/// Load a [`SummarizerConfig`] from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a required field is
/// missing or malformed.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load_config(path: &str) -> Result<SummarizerConfig, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let config: SummarizerConfig = serde_yaml::from_str(&raw)?;
    if config.bucket.is_empty() {
        return Err("config `bucket` must not be empty".into());
    }
    info!(bucket = %config.bucket, model = %config.model, "Loaded configuration");
    Ok(config)
}
