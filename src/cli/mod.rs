//! CLI support shared by the `duplitext` binary.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dedupe` | Remove duplicate sentences |
//! | `extract` | Extract users, outputs, times and dates |
//! | `process` | Dedupe, then extract |
//! | `config` | Show the effective configuration |
//! | `serve` | Run the HTTP API (feature `http`) |
//!
//! # Example Usage
//!
//! ```bash
//! duplitext dedupe "Hello world. Hello world!"
//! echo '{"Data": "Cat sat. Cat sat."}' | duplitext dedupe --format json
//! duplitext process --file notes.txt
//! ```
//!
//! # LLM Client Factory
//!
//! The `llm_factory` submodule builds the configured provider, wrapped with
//! retries and a circuit breaker.

mod input;
mod llm_factory;
mod output;

pub use input::read_input;
pub use llm_factory::{
    build_anthropic_client, build_gemini_client, build_http_config, build_llm_provider,
    build_ollama_client, build_openai_client, build_resilience_config,
};
pub use output::{OutputFormat, render_dedupe, render_record};
