// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mcp
//!
//! Model Context Protocol server handler. Protocol framing, the initialize
//! handshake and JSON-RPC error codes are handled by `rmcp`; this module maps
//! `tools/list` and `tools/call` onto the [`ToolSurface`].
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** MCP server handler over the tool surface

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

use crate::presentation::tools::{ToolMetadata, ToolResponse, ToolSurface};

pub const SERVER_NAME: &str = "hivemind";

/// MCP service exposing `upload` and `search`.
///
/// Cheap to clone; every transport session gets its own clone sharing one
/// tool surface and therefore one set of upstream clients.
#[derive(Clone)]
pub struct KnowledgeMcpService {
    tools: Arc<ToolSurface>,
}

impl KnowledgeMcpService {
    pub fn new(tools: Arc<ToolSurface>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &Arc<ToolSurface> {
        &self.tools
    }

    pub fn tool_descriptors(&self) -> Vec<Tool> {
        self.tools.list_tools().into_iter().map(to_mcp_tool).collect()
    }

    /// Run a tool. Tool failures come back as results with `is_error` set,
    /// never as protocol errors.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let arguments = arguments.map_or(Value::Null, Value::Object);
        to_call_result(self.tools.call_tool(name, arguments).await)
    }
}

fn to_mcp_tool(metadata: ToolMetadata) -> Tool {
    let schema = match metadata.input_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };

    Tool {
        name: Cow::Owned(metadata.name),
        title: None,
        description: Some(Cow::Owned(metadata.description)),
        input_schema: Arc::new(schema),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: None,
    }
}

fn to_call_result(response: ToolResponse) -> CallToolResult {
    let content: Vec<Content> = response
        .content
        .into_iter()
        .map(|block| Content::text(block.text))
        .collect();

    if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

impl ServerHandler for KnowledgeMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Hivemind".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Search before debugging from scratch; upload the fix once a problem is solved."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tool_descriptors(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("MCP tools/call: {}", request.name);
        Ok(self.dispatch(&request.name, request.arguments).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ClientLifecycle;
    use crate::domain::KnowledgeConfig;
    use serde_json::json;

    fn service() -> KnowledgeMcpService {
        let lifecycle = Arc::new(ClientLifecycle::new(KnowledgeConfig::default()));
        KnowledgeMcpService::new(Arc::new(ToolSurface::new(lifecycle).unwrap()))
    }

    fn payload(result: &CallToolResult) -> Value {
        let json = serde_json::to_value(result).unwrap();
        serde_json::from_str(json["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();

        assert_eq!(info.protocol_version, ProtocolVersion::V_2024_11_05);
        assert_eq!(info.server_info.name, "hivemind");
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_tool_descriptors_carry_schemas() {
        let tools = service().tool_descriptors();

        let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec!["upload", "search"]);
        assert_eq!(tools[1].input_schema["required"], json!(["query"]));
        assert!(tools[0].description.is_some());
    }

    #[tokio::test]
    async fn test_tool_failure_is_error_result() {
        let mut arguments = JsonObject::new();
        arguments.insert("query".to_string(), json!("X undefined error"));

        let result = service().dispatch("search", Some(arguments)).await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_type"], "configuration");
    }

    #[tokio::test]
    async fn test_missing_arguments_are_validation_error() {
        let result = service().dispatch("upload", None).await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(payload(&result)["error_type"], "validation");
    }
}
