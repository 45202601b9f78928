// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `hivemind tools`: print the declared tools and their input schemas.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use hivemind_cortex::application::ClientLifecycle;
use hivemind_cortex::domain::KnowledgeConfig;
use hivemind_cortex::presentation::ToolSurface;

pub async fn print_tools(config_path: Option<PathBuf>) -> Result<()> {
    let config = KnowledgeConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    let tools = ToolSurface::new(Arc::new(ClientLifecycle::new(config)))
        .context("Failed to build tool surface")?;

    let json = serde_json::to_string_pretty(&tools.list_tools())
        .context("Failed to render tool declarations")?;
    println!("{}", json);

    Ok(())
}
