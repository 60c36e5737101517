//! Results of the dedupe and pipeline operations.

use super::ExtractedRecord;
use serde::Serialize;

/// Result of a deduplication pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupeOutcome {
    /// The text with duplicate sentences removed.
    pub processed_text: String,
    /// Number of non-empty sentences found in the input.
    #[serde(skip)]
    pub sentences_seen: usize,
    /// Number of sentences kept.
    #[serde(skip)]
    pub sentences_kept: usize,
    /// Whether the text came out of a `{"Data": ...}` envelope.
    #[serde(skip)]
    pub unwrapped_envelope: bool,
}

impl DedupeOutcome {
    /// Number of sentences dropped as duplicates.
    #[must_use]
    pub const fn sentences_dropped(&self) -> usize {
        self.sentences_seen.saturating_sub(self.sentences_kept)
    }
}

/// Result of the full dedupe-then-extract pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// The deduplicated text handed to the extractor.
    pub deduplicated_text: String,
    /// The record returned by the extractor, unchanged.
    pub record: ExtractedRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_outcome_serializes_processed_text_only() {
        let outcome = DedupeOutcome {
            processed_text: "A.".to_string(),
            sentences_seen: 3,
            sentences_kept: 1,
            unwrapped_envelope: false,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"processedText": "A."}));
        assert_eq!(outcome.sentences_dropped(), 2);
    }
}
