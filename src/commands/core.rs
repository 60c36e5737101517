//! Core command handlers: dedupe, extract, process.

use std::path::Path;

use duplitext::cli::{OutputFormat, build_llm_provider, read_input, render_dedupe, render_record};
use duplitext::services::{DeduplicationConfig, Extractor, LlmExtractor, ProcessingService};
use duplitext::{DuplitextConfig, EMPTY_INPUT_NOTICE, Error, Result, SentenceDeduplicator};

fn deduplicator(config: &DuplitextConfig) -> SentenceDeduplicator {
    SentenceDeduplicator::new(DeduplicationConfig::from_settings(&config.dedupe))
}

fn extractor(config: &DuplitextConfig) -> LlmExtractor {
    LlmExtractor::new(build_llm_provider(&config.llm))
}

/// Dedupe command.
pub fn cmd_dedupe(
    config: &DuplitextConfig,
    text: Option<String>,
    file: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let input = read_input(text, file, std::io::stdin().lock())?;
    let outcome = deduplicator(config).process(&input);
    println!("{}", render_dedupe(&outcome, format)?);
    Ok(())
}

/// Extract command.
pub fn cmd_extract(config: &DuplitextConfig, text: Option<String>, file: Option<&Path>) -> Result<()> {
    let input = read_input(text, file, std::io::stdin().lock())?;
    if input.trim().is_empty() {
        return Err(Error::InvalidInput(EMPTY_INPUT_NOTICE.to_string()));
    }

    let record = extractor(config).extract(&input).map_err(|e| {
        tracing::error!(error = %e, "Extraction failed");
        Error::ProcessingFailed {
            cause: e.to_string(),
        }
    })?;
    println!("{}", render_record(&record)?);
    Ok(())
}

/// Process command.
pub fn cmd_process(
    config: &DuplitextConfig,
    text: Option<String>,
    file: Option<&Path>,
    show_deduped: bool,
) -> Result<()> {
    let input = read_input(text, file, std::io::stdin().lock())?;
    let service = ProcessingService::new(extractor(config)).with_deduplicator(deduplicator(config));

    let outcome = service.process(&input)?;
    if show_deduped {
        eprintln!("{}", outcome.deduplicated_text);
    }
    println!("{}", render_record(&outcome.record)?);
    Ok(())
}
