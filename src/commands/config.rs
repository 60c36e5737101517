//! Config command handler.

use duplitext::cli::{build_http_config, build_resilience_config};
use duplitext::{DuplitextConfig, Result};

/// Config command.
pub fn cmd_config(config: &DuplitextConfig, show: bool) -> Result<()> {
    if !show {
        println!("Use --show to display configuration");
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();

    println!("Config Files Loaded:");
    if config.config_sources.is_empty() {
        println!("  (none - using defaults)");
    } else {
        for source in &config.config_sources {
            println!("  - {}", source.display());
        }
    }
    println!();

    let llm = &config.llm;
    let http = build_http_config(llm);
    let resilience = build_resilience_config(llm);
    println!("LLM Configuration:");
    println!("  Provider: {}", llm.provider);
    println!("  Model: {}", llm.model.as_deref().unwrap_or("(default)"));
    println!(
        "  API Key: {}",
        llm.masked_api_key()
            .unwrap_or_else(|| "(from provider environment variable)".to_string())
    );
    println!(
        "  Base URL: {}",
        llm.base_url.as_deref().unwrap_or("(default)")
    );
    println!("  Timeout: {}ms", http.timeout_ms);
    println!("  Connect Timeout: {}ms", http.connect_timeout_ms);
    println!("  Max Retries: {}", resilience.max_retries);
    println!("  Retry Backoff: {}ms", resilience.retry_backoff_ms);
    println!(
        "  Breaker: opens after {} failures, resets after {}ms",
        resilience.breaker_failure_threshold, resilience.breaker_reset_timeout_ms
    );
    println!();

    println!("Deduplication:");
    println!("  Legacy Lone Period: {}", config.dedupe.legacy_lone_period);
    println!();

    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  Level: {}",
        config.logging.level.as_deref().unwrap_or("(default)")
    );
    match &config.logging.file {
        Some(file) => println!("  File: {}", file.display()),
        None => println!("  File: (stderr)"),
    }
    println!();

    println!("Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  Max Body: {} bytes", config.server.max_body_bytes);

    Ok(())
}
