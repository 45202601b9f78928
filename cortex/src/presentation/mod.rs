// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Presentation layer: tool surface, MCP server handler and HTTP transport

pub mod api;
pub mod mcp;
pub mod tools;

pub use api::{app, MCP_PATH, MESSAGES_PATH, SSE_PATH};
pub use mcp::{KnowledgeMcpService, SERVER_NAME};
pub use tools::{ToolContent, ToolMetadata, ToolResponse, ToolSurface, SEARCH_TOOL, UPLOAD_TOOL};
