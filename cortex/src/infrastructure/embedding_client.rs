// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Embedding Client
//!
//! Provides embedding generation for knowledge records and queries.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Anti-corruption layer over the OpenAI embeddings API, plus a
//!   deterministic offline embedder

// Every call uses the same model and the same output dimensionality so that
// stored vectors and query vectors are comparable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::{KnowledgeError, KnowledgeResult, EMBEDDING_DIMENSIONS};
use crate::infrastructure::repository::EmbeddingProvider;

pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Client for the OpenAI (or OpenAI-compatible) embeddings endpoint
pub struct OpenAIEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'static str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAIEmbeddingClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingClient {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: text,
            dimensions: EMBEDDING_DIMENSIONS,
        };

        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| KnowledgeError::EmbeddingService(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(KnowledgeError::EmbeddingService(if status == 401 || status == 403 {
                format!("authentication failed (HTTP {}): {}", status.as_u16(), error_text)
            } else if status == 429 {
                format!("rate limit or quota exceeded: {}", error_text)
            } else {
                format!("HTTP {}: {}", status.as_u16(), error_text)
            }));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            KnowledgeError::EmbeddingService(format!("malformed response: {}", e))
        })?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                KnowledgeError::EmbeddingService("malformed response: no embedding returned".to_string())
            })?;

        if embedding.len() != EMBEDDING_DIMENSIONS {
            return Err(KnowledgeError::EmbeddingService(format!(
                "malformed response: expected {} dimensions, got {}",
                EMBEDDING_DIMENSIONS,
                embedding.len()
            )));
        }

        tracing::debug!("Generated {}-dim embedding for {} chars", embedding.len(), text.len());

        Ok(embedding)
    }
}

/// Offline embedder: hashed bag-of-words, L2-normalised.
///
/// Identical text always yields identical vectors, and texts sharing words
/// score higher than unrelated ones. Used for tests and local development.
pub struct HashEmbeddingClient {
    dimensions: usize,
}

impl HashEmbeddingClient {
    pub fn new() -> Self {
        Self {
            dimensions: EMBEDDING_DIMENSIONS,
        }
    }

    fn bucket(token: &str, dimensions: usize) -> (usize, f32) {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let hash = hasher.finish();
        let sign = if (hash >> 63) & 1 == 1 { -1.0 } else { 1.0 };
        ((hash % dimensions as u64) as usize, sign)
    }
}

impl Default for HashEmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingClient {
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (index, sign) = Self::bucket(&token.to_lowercase(), self.dimensions);
            embedding[index] += sign;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }

        Ok(embedding)
    }
}
