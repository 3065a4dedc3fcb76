//! Core summarization pipeline: articles in, podcast text assets out.
//!
//! [`NewsSummarizer`] drives the whole run. For each article it issues one
//! deterministic generation request, normalizes the returned text, and keeps
//! the non-empty results. It then generates the three remaining episode
//! assets (description, introduction, outro) and uploads everything to the
//! object store.
//!
//! # Failure semantics
//!
//! A failed generation call never aborts the run. A failed article summary
//! contributes nothing to the output (the article is dropped); a failed asset
//! generation uploads its fixed fallback text instead, and the caller can
//! tell the two apart via [`GenOutcome`]. Upload failures do propagate —
//! there is nothing sensible to substitute for the store itself.
//!
//! Processing is strictly sequential: one blocking request at a time, with a
//! progress bar over the article loop.

use crate::api::ChatApi;
use crate::config::SummarizerConfig;
use crate::models::{Article, GenOutcome, RunReport};
use crate::storage::BlobStore;
use crate::utils::normalize_money;
use kdam::{tqdm, BarExt};
use std::error::Error;
use tracing::{debug, info, instrument, warn};

const SUMMARY_SYSTEM: &str =
    "You summarize news articles about crypto into a script for a podcast.";
const DESCRIPTION_SYSTEM: &str = "You create a description for a podcast.";
const INTRODUCTION_SYSTEM: &str = "You create an introduction for a podcast.";
const OUTRO_SYSTEM: &str = "You create an outro for a podcast.";

const SUMMARIES_LOG_PATH: &str = "logs/logs_summaries.txt";
const DESCRIPTION_PATH: &str = "podcast_contents/description.txt";
const INTRODUCTION_PATH: &str = "podcast_contents/introduction.txt";
const OUTRO_PATH: &str = "podcast_contents/outro.txt";

const DESCRIPTION_FALLBACK: &str = "Welcome to today's episode! Have a nice day ahead!";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Summarizes a batch of articles and uploads the podcast text assets.
///
/// Generic over the generation client and blob store so both can be faked in
/// tests. One instance handles one ordered batch of articles.
pub struct NewsSummarizer<C, S> {
    config: SummarizerConfig,
    chat: C,
    store: S,
    articles: Vec<Article>,
    summaries: Vec<String>,
}

impl<C, S> NewsSummarizer<C, S>
where
    C: ChatApi,
    S: BlobStore,
{
    /// Create a summarizer for one batch of articles.
    pub fn new(config: SummarizerConfig, chat: C, store: S, articles: Vec<Article>) -> Self {
        Self {
            config,
            chat,
            store,
            articles,
            summaries: Vec::new(),
        }
    }

    /// Summarize every article, then generate and upload all episode assets.
    ///
    /// Articles are processed one at a time, in order. Each summary request
    /// runs at temperature 0.0 and failed requests drop their article from
    /// the output. The joined summaries are written to the log blob
    /// unconditionally (an all-failure run produces an empty log), after
    /// which the description, introduction, and outro are generated.
    ///
    /// # Errors
    ///
    /// Returns an error only when an upload to the object store fails.
    #[instrument(level = "info", skip_all, fields(articles = self.articles.len()))]
    pub async fn summarize_articles(&mut self) -> Result<RunReport, Box<dyn Error>> {
        let total = self.articles.len();
        let mut pb = tqdm!(total = total, desc = "summarizing");

        for (i, article) in self.articles.iter().enumerate() {
            debug!(index = i, headline = %article.headline, "Summarizing article");
            let prompt = format!("{}{}", self.config.summary_prompt, article.body);
            match self.chat.chat(SUMMARY_SYSTEM, &prompt, 0.0).await {
                Ok(text) => self.summaries.push(normalize_money(&text)),
                Err(e) => {
                    warn!(index = i, error = %e, "Summary generation failed; dropping article");
                    self.summaries.push(String::new());
                }
            }
            let _ = pb.update(1);
        }

        self.summaries.retain(|s| !s.is_empty());
        let kept = self.summaries.len();
        let dropped = total - kept;
        if dropped > 0 {
            warn!(kept, dropped, "Some articles produced no summary");
        } else {
            info!(kept, "All articles summarized");
        }

        self.log_summaries().await?;

        let description = self.generate_description().await?;
        let introduction = self.generate_introduction().await?;
        let outro = self.generate_outro().await?;

        Ok(RunReport {
            summaries_kept: kept,
            summaries_dropped: dropped,
            description,
            introduction,
            outro,
        })
    }

    /// Write the newline-joined summaries to the log blob.
    ///
    /// Always runs, even when every summary failed.
    #[instrument(level = "info", skip_all)]
    async fn log_summaries(&self) -> Result<(), Box<dyn Error>> {
        let joined = self.summaries.join("\n\n");
        self.store
            .upload_text(SUMMARIES_LOG_PATH, &joined, TEXT_PLAIN, false)
            .await
    }

    /// Generate the episode description from the first three headlines.
    ///
    /// The description blob is marked publicly readable whether it came from
    /// the model or from the fallback greeting. Fewer than three articles is
    /// treated like any other generation failure.
    #[instrument(level = "info", skip_all)]
    pub async fn generate_description(&self) -> Result<GenOutcome, Box<dyn Error>> {
        let generated = match self.description_prompt() {
            Some(prompt) => match self.chat.chat(DESCRIPTION_SYSTEM, &prompt, 0.0).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(error = %e, "Description generation failed; using fallback");
                    None
                }
            },
            None => {
                warn!("Fewer than three articles; using fallback description");
                None
            }
        };

        match generated {
            Some(text) => {
                self.store
                    .upload_text(DESCRIPTION_PATH, &text, TEXT_PLAIN, true)
                    .await?;
                Ok(GenOutcome::Generated)
            }
            None => {
                self.store
                    .upload_text(DESCRIPTION_PATH, DESCRIPTION_FALLBACK, TEXT_PLAIN, true)
                    .await?;
                Ok(GenOutcome::Fallback)
            }
        }
    }

    fn description_prompt(&self) -> Option<String> {
        if self.articles.len() < 3 {
            return None;
        }
        let mut prompt = self.config.description_prompt.clone();
        for article in &self.articles[..3] {
            prompt.push_str(&article.headline);
            prompt.push('\n');
        }
        Some(prompt)
    }

    /// Generate the episode introduction at a creative temperature.
    ///
    /// On failure the configured default is uploaded with the fourth
    /// article's headline appended (the default alone when the batch has
    /// fewer than four articles).
    #[instrument(level = "info", skip_all)]
    pub async fn generate_introduction(&self) -> Result<GenOutcome, Box<dyn Error>> {
        match self
            .chat
            .chat(INTRODUCTION_SYSTEM, &self.config.introduction_prompt, 0.85)
            .await
        {
            Ok(text) => {
                self.store
                    .upload_text(INTRODUCTION_PATH, &text, TEXT_PLAIN, false)
                    .await?;
                Ok(GenOutcome::Generated)
            }
            Err(e) => {
                warn!(error = %e, "Introduction generation failed; using fallback");
                let fallback = match self.articles.get(3) {
                    Some(article) => {
                        format!("{} {}", self.config.introduction_default, article.headline)
                    }
                    None => self.config.introduction_default.clone(),
                };
                self.store
                    .upload_text(INTRODUCTION_PATH, &fallback, TEXT_PLAIN, false)
                    .await?;
                Ok(GenOutcome::Fallback)
            }
        }
    }

    /// Generate the episode outro at a creative temperature.
    ///
    /// On failure the configured default is uploaded verbatim.
    #[instrument(level = "info", skip_all)]
    pub async fn generate_outro(&self) -> Result<GenOutcome, Box<dyn Error>> {
        match self
            .chat
            .chat(OUTRO_SYSTEM, &self.config.outro_prompt, 0.85)
            .await
        {
            Ok(text) => {
                self.store
                    .upload_text(OUTRO_PATH, &text, TEXT_PLAIN, false)
                    .await?;
                Ok(GenOutcome::Generated)
            }
            Err(e) => {
                warn!(error = %e, "Outro generation failed; using fallback");
                self.store
                    .upload_text(OUTRO_PATH, &self.config.outro_default, TEXT_PLAIN, false)
                    .await?;
                Ok(GenOutcome::Fallback)
            }
        }
    }

    /// The retained non-empty summaries, in article order.
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted [`ChatApi`] that pops one canned outcome per call and records
    /// every request it receives.
    struct FakeChat {
        script: Mutex<Vec<Result<String, String>>>,
        calls: Mutex<Vec<(String, String, f32)>>,
    }

    impl FakeChat {
        fn new(script: Vec<Result<String, String>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String, f32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChatApi for FakeChat {
        async fn chat(
            &self,
            system: &str,
            user: &str,
            temperature: f32,
        ) -> Result<String, Box<dyn Error>> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string(), temperature));
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err("fake chat script exhausted".into());
            }
            script.remove(0).map_err(|e| e.into())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Write {
        path: String,
        content: String,
        content_type: String,
        public: bool,
    }

    /// In-memory [`BlobStore`] recording every upload in order.
    #[derive(Default)]
    struct FakeStore {
        writes: Mutex<Vec<Write>>,
    }

    impl FakeStore {
        fn writes(&self) -> Vec<Write> {
            self.writes.lock().unwrap().clone()
        }

        fn find(&self, path: &str) -> Option<Write> {
            self.writes().into_iter().find(|w| w.path == path)
        }
    }

    impl BlobStore for &FakeStore {
        async fn upload_text(
            &self,
            path: &str,
            content: &str,
            content_type: &str,
            public: bool,
        ) -> Result<(), Box<dyn Error>> {
            self.writes.lock().unwrap().push(Write {
                path: path.to_string(),
                content: content.to_string(),
                content_type: content_type.to_string(),
                public,
            });
            Ok(())
        }
    }

    fn test_config() -> SummarizerConfig {
        serde_yaml::from_str(
            r#"
bucket: test-bucket
api_key: sk-test
summary_prompt: "Summarize this article: "
description_prompt: "Describe an episode covering: "
introduction_prompt: "Write an introduction."
introduction_default: "Welcome to the show! First up:"
outro_prompt: "Write an outro."
outro_default: "Thanks for listening. See you tomorrow!"
"#,
        )
        .unwrap()
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                headline: format!("H{i}"),
                body: format!("B{i}"),
            })
            .collect()
    }

    fn ok(s: &str) -> Result<String, String> {
        Ok(s.to_string())
    }

    fn fail() -> Result<String, String> {
        Err("simulated API failure".to_string())
    }

    #[tokio::test]
    async fn test_failed_summary_is_dropped() {
        let chat = FakeChat::new(vec![
            ok("first summary"),
            fail(),
            ok("third summary"),
            ok("desc"),
            ok("intro"),
            ok("outro"),
        ]);
        let store = FakeStore::default();
        let mut summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(3));

        let report = summarizer.summarize_articles().await.unwrap();

        assert_eq!(summarizer.summaries(), ["first summary", "third summary"]);
        assert_eq!(report.summaries_kept, 2);
        assert_eq!(report.summaries_dropped, 1);
        assert!(summarizer.summaries().iter().all(|s| !s.is_empty()));
        assert!(summarizer.summaries().len() <= 3);
    }

    #[tokio::test]
    async fn test_money_notation_normalized_in_summaries() {
        // One article: the description has fewer than three headlines and
        // falls back without a call, so the script covers summary/intro/outro.
        let chat = FakeChat::new(vec![
            ok("Bitcoin hit $50K and a $3K prize was paid"),
            ok("intro"),
            ok("outro"),
        ]);
        let store = FakeStore::default();
        let mut summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(1));

        summarizer.summarize_articles().await.unwrap();

        assert_eq!(
            summarizer.summaries(),
            ["Bitcoin hit $50k and a $3k prize was paid"]
        );
    }

    #[tokio::test]
    async fn test_summary_log_written_even_when_all_fail() {
        let chat = FakeChat::new(vec![fail(), fail(), fail(), fail(), fail(), fail()]);
        let store = FakeStore::default();
        let mut summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(3));

        let report = summarizer.summarize_articles().await.unwrap();

        let log = store.find("logs/logs_summaries.txt").unwrap();
        assert_eq!(log.content, "");
        assert!(!log.public);
        assert_eq!(report.summaries_kept, 0);
        assert_eq!(report.summaries_dropped, 3);
        assert_eq!(report.fallback_assets(), 3);
    }

    #[tokio::test]
    async fn test_description_prompt_and_temperatures() {
        let chat = FakeChat::new(vec![
            ok("s0"),
            ok("s1"),
            ok("s2"),
            ok("desc"),
            ok("intro"),
            ok("outro"),
        ]);
        let store = FakeStore::default();
        let mut summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(3));

        summarizer.summarize_articles().await.unwrap();

        let calls = summarizer.chat.calls();
        assert_eq!(calls.len(), 6);
        // article summaries are deterministic
        assert_eq!(calls[0].1, "Summarize this article: B0");
        assert_eq!(calls[0].2, 0.0);
        // description uses the first three headlines, each newline-terminated
        assert_eq!(calls[3].1, "Describe an episode covering: H0\nH1\nH2\n");
        assert_eq!(calls[3].2, 0.0);
        // introduction and outro are creative
        assert_eq!(calls[4].2, 0.85);
        assert_eq!(calls[5].2, 0.85);
    }

    #[tokio::test]
    async fn test_description_fallback_is_literal_and_public() {
        let chat = FakeChat::new(vec![fail()]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(4));

        let outcome = summarizer.generate_description().await.unwrap();

        assert_eq!(outcome, GenOutcome::Fallback);
        let blob = store.find("podcast_contents/description.txt").unwrap();
        assert_eq!(
            blob.content,
            "Welcome to today's episode! Have a nice day ahead!"
        );
        assert!(blob.public);
        assert_eq!(blob.content_type, "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_description_success_is_public() {
        let chat = FakeChat::new(vec![ok("A great episode.")]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(4));

        let outcome = summarizer.generate_description().await.unwrap();

        assert_eq!(outcome, GenOutcome::Generated);
        let blob = store.find("podcast_contents/description.txt").unwrap();
        assert_eq!(blob.content, "A great episode.");
        assert!(blob.public);
    }

    #[tokio::test]
    async fn test_description_with_too_few_articles_falls_back() {
        let chat = FakeChat::new(vec![ok("never asked")]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(2));

        let outcome = summarizer.generate_description().await.unwrap();

        assert_eq!(outcome, GenOutcome::Fallback);
        // the generation call is never made
        assert!(summarizer.chat.calls().is_empty());
        let blob = store.find("podcast_contents/description.txt").unwrap();
        assert_eq!(
            blob.content,
            "Welcome to today's episode! Have a nice day ahead!"
        );
    }

    #[tokio::test]
    async fn test_introduction_fallback_appends_fourth_headline() {
        let chat = FakeChat::new(vec![fail()]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(5));

        let outcome = summarizer.generate_introduction().await.unwrap();

        assert_eq!(outcome, GenOutcome::Fallback);
        let blob = store.find("podcast_contents/introduction.txt").unwrap();
        assert_eq!(blob.content, "Welcome to the show! First up: H3");
        assert!(!blob.public);
    }

    #[tokio::test]
    async fn test_introduction_fallback_without_fourth_headline() {
        let chat = FakeChat::new(vec![fail()]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(2));

        let outcome = summarizer.generate_introduction().await.unwrap();

        assert_eq!(outcome, GenOutcome::Fallback);
        let blob = store.find("podcast_contents/introduction.txt").unwrap();
        assert_eq!(blob.content, "Welcome to the show! First up:");
    }

    #[tokio::test]
    async fn test_outro_fallback_is_verbatim() {
        let chat = FakeChat::new(vec![fail()]);
        let store = FakeStore::default();
        let summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(5));

        let outcome = summarizer.generate_outro().await.unwrap();

        assert_eq!(outcome, GenOutcome::Fallback);
        let blob = store.find("podcast_contents/outro.txt").unwrap();
        assert_eq!(blob.content, "Thanks for listening. See you tomorrow!");
    }

    #[tokio::test]
    async fn test_full_run_with_one_failure() {
        // 5 articles with a forced failure on the 2nd summary call.
        let chat = FakeChat::new(vec![
            ok("S0"),
            fail(),
            ok("S2"),
            ok("S3"),
            ok("S4"),
            ok("the description"),
            fail(), // introduction falls back
            ok("the outro"),
        ]);
        let store = FakeStore::default();
        let mut summarizer = NewsSummarizer::new(test_config(), chat, &store, articles(5));

        let report = summarizer.summarize_articles().await.unwrap();

        assert_eq!(summarizer.summaries(), ["S0", "S2", "S3", "S4"]);
        assert_eq!(report.summaries_kept, 4);
        assert_eq!(report.summaries_dropped, 1);
        assert_eq!(report.description, GenOutcome::Generated);
        assert_eq!(report.introduction, GenOutcome::Fallback);
        assert_eq!(report.outro, GenOutcome::Generated);

        let log = store.find("logs/logs_summaries.txt").unwrap();
        assert_eq!(log.content, "S0\n\nS2\n\nS3\n\nS4");

        let calls = summarizer.chat.calls();
        assert_eq!(calls[5].1, "Describe an episode covering: H0\nH1\nH2\n");

        let intro = store.find("podcast_contents/introduction.txt").unwrap();
        assert_eq!(intro.content, "Welcome to the show! First up: H3");

        let writes = store.writes();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[0].path, "logs/logs_summaries.txt");
    }
}
