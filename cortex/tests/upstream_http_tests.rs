// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tool calls against mocked embedding and vector-index endpoints, using the
//! production HTTP clients built by the lifecycle.

use hivemind_cortex::application::ClientLifecycle;
use hivemind_cortex::presentation::ToolSurface;
use hivemind_cortex::{KnowledgeConfig, EMBEDDING_DIMENSIONS, EMBEDDING_MODEL};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

fn tools_for(server: &Server) -> ToolSurface {
    let config = KnowledgeConfig {
        openai_api_key: Some("sk-test".to_string()),
        pinecone_api_key: Some("pc-test".to_string()),
        pinecone_host: Some(server.url()),
        openai_base_url: Some(server.url()),
        pinecone_namespace: None,
    };
    ToolSurface::new(Arc::new(ClientLifecycle::new(config))).unwrap()
}

fn embedding_body() -> String {
    json!({
        "object": "list",
        "data": [{"object": "embedding", "index": 0, "embedding": vec![0.01f32; EMBEDDING_DIMENSIONS]}],
        "model": EMBEDDING_MODEL
    })
    .to_string()
}

#[tokio::test]
async fn test_upload_embeds_problem_then_upserts() {
    let mut server = Server::new_async().await;

    let embed = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Json(json!({
            "model": "text-embedding-3-small",
            "input": "X undefined error",
            "dimensions": 512
        })))
        .with_status(200)
        .with_body(embedding_body())
        .create_async()
        .await;

    let upsert = server
        .mock("POST", "/vectors/upsert")
        .match_header("api-key", "pc-test")
        .match_body(Matcher::PartialJson(json!({
            "vectors": [{
                "metadata": {
                    "problem_text": "X undefined error",
                    "solution_text": "add null check",
                    "language": "typescript"
                }
            }]
        })))
        .with_status(200)
        .with_body(r#"{"upsertedCount":1}"#)
        .create_async()
        .await;

    let response = tools_for(&server)
        .call_tool(
            "upload",
            json!({"problem": "X undefined error", "solution": "add null check", "language": "typescript"}),
        )
        .await;

    assert!(!response.is_error);
    assert_eq!(response.payload().unwrap()["status"], "success");
    embed.assert_async().await;
    upsert.assert_async().await;
}

#[tokio::test]
async fn test_search_returns_store_ranking() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(embedding_body())
        .create_async()
        .await;

    let query = server
        .mock("POST", "/query")
        .match_body(Matcher::PartialJson(json!({"topK": 2, "includeMetadata": true})))
        .with_status(200)
        .with_body(
            json!({
                "matches": [
                    {"id": "1", "score": 0.93, "metadata": {
                        "problem_text": "X undefined error", "solution_text": "add null check",
                        "language": "typescript", "timestamp": "2026-10-01T12:00:00.000Z"}},
                    {"id": "2", "score": 0.61, "metadata": {
                        "problem_text": "Y is undefined", "solution_text": "initialise Y",
                        "timestamp": "2026-10-02T12:00:00.000Z"}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = tools_for(&server)
        .call_tool("search", json!({"query": "X undefined error", "topK": 2}))
        .await;

    let payload = response.payload().unwrap();
    assert_eq!(payload["results_found"], 2);
    assert_eq!(payload["results"][0]["solution"], "add null check");
    assert_eq!(payload["results"][1]["problem"], "Y is undefined");
    assert!(payload["results"][1]["metadata"].get("language").is_none());
    query.assert_async().await;
}

#[tokio::test]
async fn test_embedding_rejection_skips_index() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/embeddings")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .create_async()
        .await;

    let query = server
        .mock("POST", "/query")
        .expect(0)
        .create_async()
        .await;

    let response = tools_for(&server)
        .call_tool("search", json!({"query": "anything"}))
        .await;

    assert!(response.is_error);
    let payload = response.payload().unwrap();
    assert_eq!(payload["error_type"], "embedding_service");
    assert!(payload["message"].as_str().unwrap().contains("Incorrect API key"));
    query.assert_async().await;
}

#[tokio::test]
async fn test_index_failure_is_reported() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(embedding_body())
        .create_async()
        .await;

    server
        .mock("POST", "/vectors/upsert")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let response = tools_for(&server)
        .call_tool("upload", json!({"problem": "p", "solution": "s"}))
        .await;

    let payload = response.payload().unwrap();
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_type"], "store_write");
    assert!(payload["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to store knowledge"));
}
