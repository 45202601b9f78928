// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Capability interfaces for the two external collaborators: the embedding
//! model and the vector index.

use async_trait::async_trait;

use crate::domain::{KnowledgeId, KnowledgeResult, RecordMetadata};

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text`. Upstream failures map to `KnowledgeError::EmbeddingService`.
    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>>;
}

/// A nearest-neighbour hit returned by a [`KnowledgeStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub id: String,
    pub metadata: RecordMetadata,
    pub score: f32,
}

/// Vector index holding knowledge records.
///
/// Metadata is always requested with query results.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Write or overwrite the record at `id`. Failures map to
    /// `KnowledgeError::StoreWrite`.
    async fn upsert(
        &self,
        id: KnowledgeId,
        vector: Vec<f32>,
        metadata: &RecordMetadata,
    ) -> KnowledgeResult<()>;

    /// At most `top_k` matches, highest score first. Failures map to
    /// `KnowledgeError::StoreQuery`.
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> KnowledgeResult<Vec<ScoredMatch>>;
}
