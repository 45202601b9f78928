// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Hivemind CLI
//!
//! The `hivemind` binary serves the shared knowledge exchange to coding
//! agents over MCP.
//!
//! ## Commands
//!
//! - `hivemind serve` - Run the MCP server (`/mcp`, `/sse`, `/messages`, `/health`)
//! - `hivemind config show` - Print the effective configuration, secrets redacted
//! - `hivemind tools` - Print the tool declarations as JSON
//!
//! Credentials come from the environment (a `.env` file is loaded first) or
//! from a YAML file; environment values win.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ConfigCommand, ServeArgs};

/// Hivemind - Shared problem/solution memory for coding agents
#[derive(Parser)]
#[command(name = "hivemind")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "HIVEMIND_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "HIVEMIND_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print the tool declarations
    #[command(name = "tools")]
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Tools => commands::tools::print_tools(cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
///
/// Logs go to stderr so stdout stays clean for command output.
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
