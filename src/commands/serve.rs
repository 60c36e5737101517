//! Serve command handler.

use duplitext::{DuplitextConfig, Result};

/// Serve command.
#[cfg(feature = "http")]
pub fn cmd_serve(mut config: DuplitextConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    use duplitext::cli::build_llm_provider;
    use duplitext::http::{AppState, run_server};
    use duplitext::services::{DeduplicationConfig, LlmExtractor};
    use duplitext::SentenceDeduplicator;
    use std::sync::Arc;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let extractor = LlmExtractor::new(build_llm_provider(&config.llm));
    let deduplicator = SentenceDeduplicator::new(DeduplicationConfig::from_settings(&config.dedupe));
    let state = AppState::new(Arc::new(extractor), deduplicator);

    run_server(&config.server, state)
}

/// Serve command (feature not enabled).
#[cfg(not(feature = "http"))]
pub fn cmd_serve(_config: DuplitextConfig, _host: Option<String>, _port: Option<u16>) -> Result<()> {
    Err(duplitext::Error::FeatureNotEnabled("http".to_string()))
}
