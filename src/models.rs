//! Data models for input articles and generation outcomes.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A raw headline/body pair handed off by the upstream collector
//! - [`GenOutcome`]: Typed result of a single asset generation
//! - [`RunReport`]: Per-run counters for logging and downstream inspection
//!
//! Every entity here is transient: created during a single run, never mutated
//! after creation, and never read back from the object store.

use serde::{Deserialize, Serialize};

/// A raw news article handed off by the upstream collector.
///
/// The collector supplies an ordered sequence of these; order is significant.
/// The first three headlines feed the episode description prompt and the
/// fourth feeds the introduction fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    pub headline: String,
    /// The full article body text.
    pub body: String,
}

/// The outcome of generating a single text asset.
///
/// Asset generation never fails outright: a failed API call substitutes a
/// fixed default string instead. This type lets callers distinguish "the
/// model produced this" from "we fell back to canned text", which the blob
/// contents alone cannot reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenOutcome {
    /// The text-generation call succeeded and its output was uploaded.
    Generated,
    /// The call failed and the configured default text was uploaded instead.
    Fallback,
}

impl GenOutcome {
    /// `true` if the asset came from the model rather than a default string.
    pub fn is_generated(&self) -> bool {
        matches!(self, GenOutcome::Generated)
    }
}

/// Counters describing what a full run produced.
///
/// Failed article summaries are dropped from the output (not retried, not
/// reported per-article), so `summaries_dropped` is the only signal that any
/// were lost.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Number of non-empty summaries retained and written to the log blob.
    pub summaries_kept: usize,
    /// Number of articles whose summary call failed and was dropped.
    pub summaries_dropped: usize,
    /// Outcome of the episode description generation.
    pub description: GenOutcome,
    /// Outcome of the episode introduction generation.
    pub introduction: GenOutcome,
    /// Outcome of the episode outro generation.
    pub outro: GenOutcome,
}

impl RunReport {
    /// Number of the three episode assets that used their fallback text.
    pub fn fallback_assets(&self) -> usize {
        [self.description, self.introduction, self.outro]
            .iter()
            .filter(|o| !o.is_generated())
            .count()
    }
}
