//! Binary entry point for duplitext.
//!
//! This binary provides the CLI interface for sentence deduplication and
//! structured data extraction.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use duplitext::DuplitextConfig;
use duplitext::cli::OutputFormat;
use duplitext::observability::{self, InitOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// duplitext - Remove duplicate sentences and extract structured data from text.
#[derive(Parser)]
#[command(name = "duplitext")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "DUPLITEXT_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate sentences.
    Dedupe {
        /// Text to process. Read from stdin when neither TEXT nor --file is given.
        text: Option<String>,

        /// Read the text from a file.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Extract users, outputs, times and dates.
    Extract {
        /// Text to process. Read from stdin when neither TEXT nor --file is given.
        text: Option<String>,

        /// Read the text from a file.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Remove duplicate sentences, then extract from the result.
    Process {
        /// Text to process. Read from stdin when neither TEXT nor --file is given.
        text: Option<String>,

        /// Read the text from a file.
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Also print the deduplicated text to stderr.
        #[arg(long)]
        show_deduped: bool,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },

    /// Run the HTTP API.
    Serve {
        /// Bind address.
        #[arg(long)]
        host: Option<String>,

        /// Bind port.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: DuplitextConfig) -> duplitext::Result<()> {
    match command {
        Commands::Dedupe { text, file, format } => {
            commands::cmd_dedupe(&config, text, file.as_deref(), format)
        },
        Commands::Extract { text, file } => commands::cmd_extract(&config, text, file.as_deref()),
        Commands::Process {
            text,
            file,
            show_deduped,
        } => commands::cmd_process(&config, text, file.as_deref(), show_deduped),
        Commands::Config { show } => commands::cmd_config(&config, show),
        Commands::Serve { host, port } => commands::cmd_serve(config, host, port),
    }
}

/// Loads configuration from `--config` (or `DUPLITEXT_CONFIG_PATH`), else the
/// default location, then applies environment overrides.
fn load_config(path: Option<&Path>) -> duplitext::Result<DuplitextConfig> {
    let config = match path {
        Some(path) => DuplitextConfig::load_from_file(path)?,
        None => DuplitextConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}
