//! Sentence deduplicator.

use super::config::DeduplicationConfig;
use super::envelope::unwrap_envelope;
use super::sentences::{SENTENCE_SEPARATOR, normalized_key, split_sentences};
use crate::models::DedupeOutcome;
use std::collections::HashSet;
use tracing::instrument;

/// Removes case-insensitive duplicate sentences from text.
///
/// # How it works
///
/// 1. Unwraps a `{"Data": "..."}` JSON envelope if present
/// 2. Splits on `.`, `?` and `!`, trimming each sentence and skipping empty ones
/// 3. Keeps the first occurrence of each lower-cased sentence, in order
/// 4. Joins the kept sentences with `". "` and appends a final `"."`
///
/// Never fails: malformed JSON is treated as plain text.
///
/// # Example
///
/// ```rust
/// use duplitext::services::SentenceDeduplicator;
///
/// let deduplicator = SentenceDeduplicator::default();
/// let outcome = deduplicator.process("A. a. A! B?");
/// assert_eq!(outcome.processed_text, "A. B.");
/// assert_eq!(outcome.sentences_dropped(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceDeduplicator {
    config: DeduplicationConfig,
}

impl SentenceDeduplicator {
    /// Creates a deduplicator with the given configuration.
    #[must_use]
    pub const fn new(config: DeduplicationConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DeduplicationConfig {
        &self.config
    }

    /// Removes duplicate sentences and returns only the processed text.
    #[must_use]
    pub fn dedupe(&self, input: &str) -> String {
        self.process(input).processed_text
    }

    /// Removes duplicate sentences and reports what was kept.
    #[instrument(
        skip(self, input),
        fields(operation = "dedupe", input_length = input.len())
    )]
    pub fn process(&self, input: &str) -> DedupeOutcome {
        metrics::counter!("dedupe_requests_total").increment(1);

        if input.is_empty() {
            return DedupeOutcome::default();
        }

        let envelope = unwrap_envelope(input);
        let text = envelope.text();
        if text.is_empty() {
            return DedupeOutcome {
                unwrapped_envelope: envelope.is_unwrapped(),
                ..DedupeOutcome::default()
            };
        }

        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut sentences_seen = 0;

        for sentence in split_sentences(text) {
            sentences_seen += 1;
            if seen.insert(normalized_key(sentence)) {
                kept.push(sentence);
            }
        }

        let processed_text = self.join(&kept);
        let outcome = DedupeOutcome {
            processed_text,
            sentences_seen,
            sentences_kept: kept.len(),
            unwrapped_envelope: envelope.is_unwrapped(),
        };

        let dropped = outcome.sentences_dropped();
        metrics::counter!("dedupe_sentences_dropped_total")
            .increment(u64::try_from(dropped).unwrap_or(u64::MAX));
        tracing::debug!(
            sentences_seen,
            sentences_kept = outcome.sentences_kept,
            unwrapped_envelope = outcome.unwrapped_envelope,
            "Deduplicated text"
        );

        outcome
    }

    fn join(&self, kept: &[&str]) -> String {
        if kept.is_empty() {
            return if self.config.legacy_lone_period {
                ".".to_string()
            } else {
                String::new()
            };
        }

        let mut joined = kept.join(SENTENCE_SEPARATOR);
        joined.push('.');
        joined
    }
}

/// Removes duplicate sentences using the default configuration.
///
/// ```rust
/// use duplitext::dedupe;
///
/// assert_eq!(dedupe(""), "");
/// assert_eq!(dedupe("A. a. A!"), "A.");
/// assert_eq!(dedupe("not json { still text. still text."), "not json { still text. still text.");
/// assert_eq!(dedupe("not json { text. NOT JSON { TEXT."), "not json { text.");
/// ```
#[must_use]
pub fn dedupe(input: &str) -> String {
    SentenceDeduplicator::default().dedupe(input)
}
