//! Business logic services.
//!
//! The deduplicator and extractor are independent; [`ProcessingService`]
//! chains them.

pub mod deduplication;
mod extraction;
mod pipeline;

pub use deduplication::{DeduplicationConfig, SentenceDeduplicator, dedupe};
pub use extraction::{Extractor, LlmExtractor, validate_record};
pub use pipeline::ProcessingService;
