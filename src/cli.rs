//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The bucket and credentials options can also be provided via environment
//! variables.

use clap::Parser;

/// Command-line arguments for the podcast text generator.
///
/// # Examples
///
/// ```sh
/// # Basic usage with the default config.yaml
/// crypto_podcast_texts -a ./articles.json
///
/// # Explicit config and bucket override
/// crypto_podcast_texts -a ./articles.json -c ./prod.yaml --bucket my-bucket
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON file of collected articles (array of {headline, body})
    #[arg(short, long)]
    pub articles: String,

    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Cloud Storage bucket name (overrides the config file)
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Path to the service-account credentials JSON (overrides the config file)
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials: Option<String>,
}
