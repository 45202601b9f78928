// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pinecone implementation of the knowledge store
//!
//! Talks to an index's data-plane host over REST: `/vectors/upsert` for
//! writes and `/query` for top-K retrieval with metadata.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements internal responsibilities for the vector index adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{KnowledgeError, KnowledgeId, KnowledgeResult, RecordMetadata};
use crate::infrastructure::repository::{KnowledgeStore, ScoredMatch};

const API_VERSION: &str = "2025-01";

pub struct PineconeKnowledgeStore {
    client: reqwest::Client,
    host: String,
    api_key: String,
    namespace: Option<String>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Serialize)]
struct UpsertVector<'a> {
    id: String,
    values: Vec<f32>,
    metadata: &'a RecordMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: Option<f32>,
    metadata: Option<serde_json::Value>,
}

impl PineconeKnowledgeStore {
    pub fn new(host: &str, api_key: impl Into<String>, namespace: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), host, api_key, namespace)
    }

    pub fn with_client(
        client: reqwest::Client,
        host: &str,
        api_key: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            client,
            host: normalize_host(host),
            api_key: api_key.into(),
            namespace,
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, String> {
        let url = format!("{}{}", self.host, path);

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status.as_u16(), error_text));
        }

        Ok(response)
    }

    fn to_match(raw: QueryMatch) -> KnowledgeResult<ScoredMatch> {
        let score = raw.score.ok_or_else(|| {
            KnowledgeError::StoreQuery(format!("match {} returned without score", raw.id))
        })?;

        let metadata = raw.metadata.ok_or_else(|| {
            KnowledgeError::StoreQuery(format!("match {} returned without metadata", raw.id))
        })?;

        let metadata: RecordMetadata = serde_json::from_value(metadata).map_err(|e| {
            KnowledgeError::StoreQuery(format!("malformed metadata for match {}: {}", raw.id, e))
        })?;

        Ok(ScoredMatch {
            id: raw.id,
            metadata,
            score,
        })
    }
}

/// Data-plane hosts are shown without a scheme in the console; accept both.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait]
impl KnowledgeStore for PineconeKnowledgeStore {
    async fn upsert(
        &self,
        id: KnowledgeId,
        vector: Vec<f32>,
        metadata: &RecordMetadata,
    ) -> KnowledgeResult<()> {
        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: id.to_string(),
                values: vector,
                metadata,
            }],
            namespace: self.namespace.as_deref(),
        };

        self.post("/vectors/upsert", &request)
            .await
            .map_err(KnowledgeError::StoreWrite)?;

        tracing::debug!("Upserted knowledge record {}", id);
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> KnowledgeResult<Vec<ScoredMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .post("/query", &request)
            .await
            .map_err(KnowledgeError::StoreQuery)?;

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::StoreQuery(format!("malformed response: {}", e)))?;

        body.matches.into_iter().map(Self::to_match).collect()
    }
}
