//! Data models for duplitext.
//!
//! Request and response shapes shared by the library, the CLI and the HTTP API.

mod outcome;
mod record;

pub use outcome::{DedupeOutcome, ProcessOutcome};
pub use record::{ExtractRequest, ExtractedRecord, RecordField};
