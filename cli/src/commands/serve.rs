// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `hivemind serve`: run the MCP server until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{lookup_host, TcpListener};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use hivemind_cortex::application::ClientLifecycle;
use hivemind_cortex::domain::KnowledgeConfig;
use hivemind_cortex::presentation::{app, KnowledgeMcpService, ToolSurface};

#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "HIVEMIND_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, env = "HIVEMIND_PORT", default_value = "8080")]
    port: u16,

    /// Expose Prometheus metrics on this port
    #[arg(long, env = "HIVEMIND_METRICS_PORT")]
    metrics_port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config =
        KnowledgeConfig::load_or_default(config_path).context("Failed to load configuration")?;

    // Missing credentials are reported per tool call; the server still starts.
    for setting in config.missing_settings() {
        warn!("{} is not set; tool calls will fail until it is", setting);
    }

    if let Some(port) = args.metrics_port {
        let addr = resolve_addr(&args.host, port).await?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics available at http://{}/metrics", addr);
    }

    let lifecycle = Arc::new(ClientLifecycle::new(config));
    let tools = Arc::new(ToolSurface::new(lifecycle).context("Failed to build tool surface")?);
    let service = KnowledgeMcpService::new(tools);

    let addr = resolve_addr(&args.host, args.port).await?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let bound = listener.local_addr().context("Failed to read bound address")?;

    info!("Hivemind MCP server listening on http://{}", bound);
    info!("  streamable endpoint: POST /mcp");
    info!("  event-stream endpoint: GET /sse");

    let ct = CancellationToken::new();
    let sessions = ct.clone();

    axum::serve(listener, app(service, bound, ct.clone()))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            sessions.cancel();
        })
        .await
        .context("HTTP server failed")?;

    ct.cancel();

    info!("Hivemind server shutting down");

    Ok(())
}

/// Resolve `host:port`, accepting hostnames such as `localhost` as well as
/// literal IP addresses.
async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve {}:{}", host, port))?
        .next()
        .with_context(|| format!("{}:{} resolved to no addresses", host, port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
