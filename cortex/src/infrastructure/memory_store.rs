// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process vector store with exact cosine-similarity search.
//! Backs tests and offline runs; the HTTP index is the production store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{KnowledgeId, KnowledgeResult, RecordMetadata};
use crate::infrastructure::repository::{KnowledgeStore, ScoredMatch};

pub struct InMemoryKnowledgeStore {
    records: Arc<RwLock<HashMap<KnowledgeId, (RecordMetadata, Vec<f32>)>>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Metadata stored for `id`, exactly as persisted.
    pub async fn get(&self, id: KnowledgeId) -> Option<RecordMetadata> {
        self.records.read().await.get(&id).map(|(metadata, _)| metadata.clone())
    }

    /// Calculate cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if magnitude_a == 0.0 || magnitude_b == 0.0 {
            return 0.0;
        }

        dot_product / (magnitude_a * magnitude_b)
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn upsert(
        &self,
        id: KnowledgeId,
        vector: Vec<f32>,
        metadata: &RecordMetadata,
    ) -> KnowledgeResult<()> {
        let mut records = self.records.write().await;
        records.insert(id, (metadata.clone(), vector));
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> KnowledgeResult<Vec<ScoredMatch>> {
        let records = self.records.read().await;

        let mut results: Vec<ScoredMatch> = records
            .iter()
            .map(|(id, (metadata, embedding))| ScoredMatch {
                id: id.to_string(),
                metadata: metadata.clone(),
                score: Self::cosine_similarity(&vector, embedding),
            })
            .collect();

        // Sort by similarity descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }
}
