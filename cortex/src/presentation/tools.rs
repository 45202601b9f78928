// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tool Surface
//!
//! Declares the `upload` and `search` tools, validates their arguments
//! against the declared input schemas, and wraps every outcome in the uniform
//! response envelope.
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** Transport-independent tool contract
//!
//! Argument validation runs before the client lifecycle or the service is
//! touched, so malformed input never causes an upstream call. Every error is
//! turned into a failure envelope here; nothing escapes unformatted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::application::knowledge_service::require_text;
use crate::application::{ClientLifecycle, KnowledgeBase, StandardKnowledgeBase};
use crate::domain::{
    KnowledgeError, KnowledgeQuery, KnowledgeResult, NewKnowledge, DEFAULT_TOP_K, MAX_TOP_K,
    MIN_TOP_K,
};

pub const UPLOAD_TOOL: &str = "upload";
pub const SEARCH_TOOL: &str = "search";

/// Tool metadata for discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// Uniform envelope returned for every tool call.
///
/// The text content holds the JSON payload with its `status` field;
/// `is_error` lets transport-level callers tell a reported failure from a
/// success without parsing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResponse {
    fn from_payload(payload: &Value, is_error: bool) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text,
            }],
            is_error,
        }
    }

    pub fn success(payload: &Value) -> Self {
        Self::from_payload(payload, false)
    }

    pub fn failure(error: &KnowledgeError) -> Self {
        let payload = json!({
            "status": "error",
            "error_type": error.kind(),
            "message": error.to_string(),
        });
        Self::from_payload(&payload, true)
    }

    /// Parsed JSON payload of the first text block.
    pub fn payload(&self) -> Option<Value> {
        self.content
            .first()
            .and_then(|c| serde_json::from_str(&c.text).ok())
    }
}

#[derive(Debug, Deserialize)]
struct UploadArgs {
    problem: String,
    solution: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    framework: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    /// The schema already enforces an integral value in range; `5.0` is
    /// an integer to JSON Schema, so accept it here too.
    #[serde(default, rename = "topK")]
    top_k: Option<f64>,
}

fn upload_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "problem": {
                "type": "string",
                "minLength": 1,
                "description": "Description of the problem or error that was encountered"
            },
            "solution": {
                "type": "string",
                "minLength": 1,
                "description": "The solution that resolved the problem"
            },
            "language": {
                "type": "string",
                "description": "Programming language involved (optional)"
            },
            "framework": {
                "type": "string",
                "description": "Framework or library involved (optional)"
            }
        },
        "required": ["problem", "solution"]
    })
}

fn search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "minLength": 1,
                "description": "Description of the problem to find solutions for"
            },
            "topK": {
                "type": "integer",
                "minimum": MIN_TOP_K,
                "maximum": MAX_TOP_K,
                "default": DEFAULT_TOP_K,
                "description": "Maximum number of results to return"
            }
        },
        "required": ["query"]
    })
}

pub struct ToolSurface {
    lifecycle: Arc<ClientLifecycle>,
    upload_validator: jsonschema::Validator,
    search_validator: jsonschema::Validator,
}

impl ToolSurface {
    pub fn new(lifecycle: Arc<ClientLifecycle>) -> Result<Self> {
        let upload_validator = jsonschema::validator_for(&upload_schema())
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Invalid upload tool schema")?;
        let search_validator = jsonschema::validator_for(&search_schema())
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Invalid search tool schema")?;

        Ok(Self {
            lifecycle,
            upload_validator,
            search_validator,
        })
    }

    pub fn lifecycle(&self) -> &Arc<ClientLifecycle> {
        &self.lifecycle
    }

    pub fn list_tools(&self) -> Vec<ToolMetadata> {
        vec![
            ToolMetadata {
                name: UPLOAD_TOOL.to_string(),
                description: "Record a problem and the solution that fixed it in the shared \
                    knowledge base so other agents can find it later."
                    .to_string(),
                input_schema: upload_schema(),
            },
            ToolMetadata {
                name: SEARCH_TOOL.to_string(),
                description: "Search the shared knowledge base for solutions to problems \
                    similar to the one described."
                    .to_string(),
                input_schema: search_schema(),
            },
        ]
    }

    /// Invoke a tool by name. Never fails: errors become failure envelopes.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResponse {
        let started = Instant::now();
        debug!("Tool call: {}", name);

        let result = match name {
            UPLOAD_TOOL => self.upload(arguments).await,
            SEARCH_TOOL => self.search(arguments).await,
            other => Err(KnowledgeError::Validation(format!("Unknown tool: {}", other))),
        };

        let tool_label = match name {
            UPLOAD_TOOL | SEARCH_TOOL => name.to_string(),
            _ => "unknown".to_string(),
        };
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::counter!("hivemind_tool_calls_total", "tool" => tool_label.clone(), "status" => status)
            .increment(1);
        metrics::histogram!("hivemind_tool_duration_seconds", "tool" => tool_label)
            .record(started.elapsed().as_secs_f64());

        match result {
            Ok(payload) => ToolResponse::success(&payload),
            Err(e) => {
                warn!("Tool '{}' failed ({}): {}", name, e.kind(), e);
                ToolResponse::failure(&e)
            }
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(
        validator: &jsonschema::Validator,
        arguments: Value,
    ) -> KnowledgeResult<T> {
        let arguments = if arguments.is_null() { json!({}) } else { arguments };

        let violations: Vec<String> = validator
            .iter_errors(&arguments)
            .map(|e| e.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(KnowledgeError::Validation(violations.join("; ")));
        }

        serde_json::from_value(arguments).map_err(|e| KnowledgeError::Validation(e.to_string()))
    }

    async fn upload(&self, arguments: Value) -> KnowledgeResult<Value> {
        let args: UploadArgs = Self::decode(&self.upload_validator, arguments)?;
        require_text("problem", &args.problem)?;
        require_text("solution", &args.solution)?;

        let clients = self.lifecycle.ensure_clients().await?;
        let service = StandardKnowledgeBase::from_clients(clients);

        let receipt = service
            .upload(NewKnowledge {
                problem: args.problem,
                solution: args.solution,
                language: args.language,
                framework: args.framework,
            })
            .await?;

        Ok(json!({
            "status": "success",
            "id": receipt.id,
            "message": receipt.message,
        }))
    }

    async fn search(&self, arguments: Value) -> KnowledgeResult<Value> {
        let args: SearchArgs = Self::decode(&self.search_validator, arguments)?;
        require_text("query", &args.query)?;
        let top_k = args.top_k.map_or(DEFAULT_TOP_K, |k| k as usize);

        let clients = self.lifecycle.ensure_clients().await?;
        let service = StandardKnowledgeBase::from_clients(clients);

        let outcome = service
            .search(KnowledgeQuery::new(args.query).with_top_k(top_k))
            .await?;

        Ok(json!({
            "status": "success",
            "query": outcome.query,
            "results_found": outcome.results_found(),
            "results": outcome.results,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ClientFactory, KnowledgeClients};
    use crate::domain::{KnowledgeConfig, ResolvedConfig};
    use crate::infrastructure::{HashEmbeddingClient, InMemoryKnowledgeStore};
    use async_trait::async_trait;

    struct OfflineFactory;

    #[async_trait]
    impl ClientFactory for OfflineFactory {
        async fn build(&self, _config: &ResolvedConfig) -> KnowledgeResult<KnowledgeClients> {
            Ok(KnowledgeClients {
                embedder: Arc::new(HashEmbeddingClient::new()),
                store: Arc::new(InMemoryKnowledgeStore::new()),
            })
        }
    }

    fn unconfigured_surface() -> ToolSurface {
        let lifecycle = Arc::new(ClientLifecycle::new(KnowledgeConfig::default()));
        ToolSurface::new(lifecycle).unwrap()
    }

    fn offline_surface() -> ToolSurface {
        let config = KnowledgeConfig {
            openai_api_key: Some("sk-test".to_string()),
            pinecone_api_key: Some("pc-test".to_string()),
            pinecone_host: Some("idx.svc.pinecone.io".to_string()),
            ..Default::default()
        };
        let lifecycle = Arc::new(ClientLifecycle::with_factory(config, Arc::new(OfflineFactory)));
        ToolSurface::new(lifecycle).unwrap()
    }

    #[test]
    fn test_declares_two_tools() {
        let surface = unconfigured_surface();
        let tools = surface.list_tools();

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["upload", "search"]);

        let search = &tools[1].input_schema;
        assert_eq!(search["properties"]["topK"]["minimum"], 1);
        assert_eq!(search["properties"]["topK"]["maximum"], 20);
        assert_eq!(search["required"], json!(["query"]));
    }

    #[test]
    fn test_envelope_serialization() {
        let response = ToolResponse::failure(&KnowledgeError::StoreQuery("HTTP 503".to_string()));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["isError"], true);
        assert_eq!(json["content"][0]["type"], "text");

        let payload = response.payload().unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_type"], "store_query");
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_validation_error() {
        let surface = unconfigured_surface();
        let response = surface.call_tool("upload", json!({"problem": "only half"})).await;

        assert!(response.is_error);
        let payload = response.payload().unwrap();
        assert_eq!(payload["error_type"], "validation");
        assert!(payload["message"].as_str().unwrap().contains("solution"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let surface = unconfigured_surface();
        let response = surface.call_tool("delete", json!({})).await;

        assert!(response.is_error);
        let payload = response.payload().unwrap();
        assert_eq!(payload["message"], "Invalid arguments: Unknown tool: delete");
    }

    #[tokio::test]
    async fn test_valid_input_without_configuration() {
        let surface = unconfigured_surface();
        let response = surface.call_tool("search", json!({"query": "X undefined error"})).await;

        assert!(response.is_error);
        let payload = response.payload().unwrap();
        assert_eq!(payload["error_type"], "configuration");
        assert!(payload["message"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn test_blank_text_rejected_before_client_setup() {
        let surface = unconfigured_surface();

        let response = surface
            .call_tool("upload", json!({"problem": "   ", "solution": "s"}))
            .await;
        let payload = response.payload().unwrap();
        assert_eq!(payload["error_type"], "validation");
        assert!(payload["message"].as_str().unwrap().contains("problem"));

        let response = surface.call_tool("search", json!({"query": "\t\n"})).await;
        assert_eq!(response.payload().unwrap()["error_type"], "validation");

        assert!(!surface.lifecycle().is_initialized());
    }

    #[tokio::test]
    async fn test_blank_text_does_not_build_clients_when_configured() {
        let surface = offline_surface();

        let response = surface
            .call_tool("upload", json!({"problem": "p", "solution": "  "}))
            .await;

        assert_eq!(response.payload().unwrap()["error_type"], "validation");
        assert!(!surface.lifecycle().is_initialized());
    }

    #[tokio::test]
    async fn test_integral_float_top_k_accepted() {
        let surface = offline_surface();
        surface
            .call_tool("upload", json!({"problem": "a b", "solution": "c"}))
            .await;

        let response = surface
            .call_tool("search", json!({"query": "a b", "topK": 5.0}))
            .await;

        assert!(!response.is_error);
        let payload = response.payload().unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["results_found"], 1);
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration() {
        let surface = unconfigured_surface();
        let response = surface.call_tool("search", json!({"query": "x", "topK": 0})).await;

        let payload = response.payload().unwrap();
        assert_eq!(payload["error_type"], "validation");
        assert!(!surface.lifecycle().is_initialized());
    }
}
