//! Duplicate sentence removal.
//!
//! Input is either plain prose or a JSON object carrying the text under a
//! `Data` key. Sentences are compared case-insensitively and only the first
//! occurrence of each is kept, in its original position and case.
//!
//! # Example
//!
//! ```rust
//! use duplitext::services::deduplication::{DeduplicationConfig, SentenceDeduplicator};
//!
//! let deduplicator = SentenceDeduplicator::new(DeduplicationConfig::default());
//! assert_eq!(deduplicator.dedupe("Ship it. ship it! Done?"), "Ship it. Done.");
//! ```

mod config;
mod envelope;
mod sentences;
mod service;

pub use config::DeduplicationConfig;
pub use envelope::{ENVELOPE_KEY, Envelope, unwrap_envelope};
pub use sentences::{SENTENCE_SEPARATOR, SENTENCE_TERMINATORS, normalized_key, split_sentences};
pub use service::{SentenceDeduplicator, dedupe};
