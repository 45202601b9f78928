// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! HTTP transport for the MCP endpoint.
//!
//! Two ways in, both served by `rmcp`: streamable HTTP at `POST /mcp`
//! (stateless, one request per POST), and the legacy SSE pair where
//! `GET /sse` opens a session stream and `POST /messages?sessionId=`
//! delivers requests whose responses are pushed back onto that stream.

use axum::{extract::State, routing::get, Json, Router};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, tower::StreamableHttpService,
};
use rmcp::transport::StreamableHttpServerConfig;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::presentation::mcp::KnowledgeMcpService;
use crate::presentation::tools::ToolSurface;

pub const MCP_PATH: &str = "/mcp";
pub const SSE_PATH: &str = "/sse";
pub const MESSAGES_PATH: &str = "/messages";

pub struct AppState {
    tools: Arc<ToolSurface>,
    start_time: Instant,
}

/// Build the router. SSE sessions are bound to `ct` and end when it is
/// cancelled; `bind` is the address the router will be served on.
///
/// Must be called from within a Tokio runtime.
pub fn app(service: KnowledgeMcpService, bind: SocketAddr, ct: CancellationToken) -> Router {
    let state = Arc::new(AppState {
        tools: service.tools().clone(),
        start_time: Instant::now(),
    });

    let (sse_server, sse_router) = SseServer::new(SseServerConfig {
        bind,
        sse_path: SSE_PATH.to_string(),
        post_path: MESSAGES_PATH.to_string(),
        ct,
        sse_keep_alive: None,
    });
    let session_service = service.clone();
    let _ = sse_server.with_service(move || session_service.clone());

    let streamable = StreamableHttpService::new(
        move || Ok(service.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .with_state(state)
        .merge(sse_router)
        .nest_service(MCP_PATH, streamable)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "clients_initialized": state.tools.lifecycle().is_initialized(),
    }))
}
