//! Dedupe-then-extract pipeline.

use super::deduplication::SentenceDeduplicator;
use super::extraction::Extractor;
use crate::models::ProcessOutcome;
use crate::{EMPTY_INPUT_NOTICE, Error, Result};
use tracing::instrument;

/// Runs the deduplicator, then the extractor on the deduplicated text.
///
/// Extraction failures are logged with their cause and surfaced as
/// [`Error::ProcessingFailed`], whose message is the single user-facing
/// notice.
#[derive(Debug, Clone)]
pub struct ProcessingService<E: Extractor> {
    deduplicator: SentenceDeduplicator,
    extractor: E,
}

impl<E: Extractor> ProcessingService<E> {
    /// Creates a pipeline with the default deduplicator.
    #[must_use]
    pub fn new(extractor: E) -> Self {
        Self {
            deduplicator: SentenceDeduplicator::default(),
            extractor,
        }
    }

    /// Replaces the deduplicator.
    #[must_use]
    pub const fn with_deduplicator(mut self, deduplicator: SentenceDeduplicator) -> Self {
        self.deduplicator = deduplicator;
        self
    }

    /// Returns the deduplicator.
    #[must_use]
    pub const fn deduplicator(&self) -> &SentenceDeduplicator {
        &self.deduplicator
    }

    /// Returns the extractor.
    #[must_use]
    pub const fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Deduplicates and extracts.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] with the empty-input notice when `input` is blank
    /// - [`Error::ProcessingFailed`] when extraction fails for any reason
    #[instrument(skip(self, input), fields(operation = "process", input_length = input.len()))]
    pub fn process(&self, input: &str) -> Result<ProcessOutcome> {
        if input.trim().is_empty() {
            metrics::counter!("pipeline_requests_total", "status" => "rejected").increment(1);
            return Err(Error::InvalidInput(EMPTY_INPUT_NOTICE.to_string()));
        }

        let deduplicated_text = self.deduplicator.dedupe(input);

        match self.extractor.extract(&deduplicated_text) {
            Ok(record) => {
                metrics::counter!("pipeline_requests_total", "status" => "success").increment(1);
                Ok(ProcessOutcome {
                    deduplicated_text,
                    record,
                })
            },
            Err(e) => {
                metrics::counter!("pipeline_requests_total", "status" => "error").increment(1);
                tracing::error!(error = %e, "Text processing failed");
                Err(Error::ProcessingFailed {
                    cause: e.to_string(),
                })
            },
        }
    }
}
