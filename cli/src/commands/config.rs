// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use hivemind_cortex::domain::{
    KnowledgeConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, DEFAULT_OPENAI_BASE_URL,
};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show effective configuration (credentials redacted)
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print as YAML instead of a summary
        #[arg(long)]
        yaml: bool,
    },

    /// Check that every required setting is present
    Validate,
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate => validate(config_override).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. {}", DEFAULT_CONFIG_FILE);
        println!();
    }

    let config = KnowledgeConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;
    let redacted = config.redacted();

    if as_yaml {
        let yaml = serde_yaml::to_string(&redacted).context("Failed to render configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    let unset = || "(not set)".dimmed().to_string();

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Embedding service:".bold());
    println!("  API key: {}", redacted.openai_api_key.clone().unwrap_or_else(unset));
    println!(
        "  Base URL: {}",
        redacted
            .openai_base_url
            .clone()
            .unwrap_or_else(|| format!("{} (default)", DEFAULT_OPENAI_BASE_URL))
    );
    println!();

    println!("{}", "Vector index:".bold());
    println!("  API key: {}", redacted.pinecone_api_key.clone().unwrap_or_else(unset));
    println!("  Host: {}", redacted.pinecone_host.clone().unwrap_or_else(unset));
    println!(
        "  Namespace: {}",
        redacted
            .pinecone_namespace
            .clone()
            .unwrap_or_else(|| "(default)".dimmed().to_string())
    );
    println!();

    let missing = config.missing_settings();
    if missing.is_empty() {
        println!("{}", "✓ All required settings present".green());
    } else {
        println!("{}", "Missing required settings:".yellow().bold());
        for setting in missing {
            println!("  - {}", setting);
        }
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = KnowledgeConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}
