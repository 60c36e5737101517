//! Command handlers module.
//!
//! - `core.rs`: text commands (dedupe, extract, process)
//! - `config.rs`: configuration display command
//! - `serve.rs`: HTTP API command

mod config;
mod core;
mod serve;

pub use config::cmd_config;
pub use core::{cmd_dedupe, cmd_extract, cmd_process};
pub use serve::cmd_serve;
