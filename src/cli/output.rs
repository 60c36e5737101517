//! Output rendering for text commands.

use crate::models::{DedupeOutcome, ExtractedRecord};
use crate::{Error, Result};
use serde::Serialize;

/// Output format for the `dedupe` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// The processed text only.
    #[default]
    Text,
    /// `{"processedText": "..."}`.
    Json,
}

/// Renders a dedupe outcome.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_dedupe(outcome: &DedupeOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(outcome.processed_text.clone()),
        OutputFormat::Json => to_pretty_json(outcome),
    }
}

/// Renders a record as two-space indented JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_record(record: &ExtractedRecord) -> Result<String> {
    to_pretty_json(record)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::OperationFailed {
        operation: "render_json".to_string(),
        cause: e.to_string(),
    })
}
