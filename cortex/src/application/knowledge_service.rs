// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # KnowledgeService: Shared Problem/Solution Memory
//!
//! Application service behind the `upload` and `search` tools. Each
//! operation is a single pass of at most two sequential upstream calls:
//!
//! - **upload**: embed the problem text, then upsert the vector under a fresh
//!   id with the record's metadata.
//! - **search**: embed the query, then ask the store for the top-K nearest
//!   records. Results keep the store's ranking; nothing is re-scored here.
//!
//! The first failing call aborts the pipeline and is returned to the caller.
//! Nothing is retried.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::client_lifecycle::KnowledgeClients;
use crate::domain::{
    KnowledgeError, KnowledgeId, KnowledgeQuery, KnowledgeResult, NewKnowledge, RecordMetadata,
    SearchOutcome, SearchResult, UploadReceipt, MAX_TOP_K, MIN_TOP_K,
};
use crate::infrastructure::{EmbeddingProvider, KnowledgeStore};

/// KnowledgeBase interface
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Record a new (problem, solution) pair
    async fn upload(&self, knowledge: NewKnowledge) -> KnowledgeResult<UploadReceipt>;

    /// Retrieve prior solutions whose problems resemble the query
    async fn search(&self, query: KnowledgeQuery) -> KnowledgeResult<SearchOutcome>;
}

/// Standard implementation of KnowledgeBase
pub struct StandardKnowledgeBase {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
}

impl StandardKnowledgeBase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn KnowledgeStore>) -> Self {
        Self { embedder, store }
    }

    pub fn from_clients(clients: &KnowledgeClients) -> Self {
        Self::new(clients.embedder.clone(), clients.store.clone())
    }
}

/// Reject text that is empty once surrounding whitespace is removed.
pub(crate) fn require_text(field: &str, value: &str) -> KnowledgeResult<()> {
    if value.trim().is_empty() {
        return Err(KnowledgeError::Validation(format!("{} must be a non-empty string", field)));
    }
    Ok(())
}

#[async_trait]
impl KnowledgeBase for StandardKnowledgeBase {
    async fn upload(&self, knowledge: NewKnowledge) -> KnowledgeResult<UploadReceipt> {
        require_text("problem", &knowledge.problem)?;
        require_text("solution", &knowledge.solution)?;

        let embedding = self.embedder.embed(&knowledge.problem).await.map_err(|e| {
            warn!("Upload aborted, embedding failed: {}", e);
            e
        })?;

        let id = KnowledgeId::new();
        let metadata = RecordMetadata::new(
            knowledge.problem,
            knowledge.solution,
            knowledge.language,
            knowledge.framework,
            Utc::now(),
        );

        self.store.upsert(id, embedding, &metadata).await.map_err(|e| {
            warn!("Upload aborted, store write failed for {}: {}", id, e);
            e
        })?;

        info!("Stored knowledge record {}", id);

        Ok(UploadReceipt {
            id,
            message: "Successfully uploaded problem-solution pair to the knowledge base".to_string(),
        })
    }

    async fn search(&self, query: KnowledgeQuery) -> KnowledgeResult<SearchOutcome> {
        require_text("query", &query.query)?;
        if !(MIN_TOP_K..=MAX_TOP_K).contains(&query.top_k) {
            return Err(KnowledgeError::Validation(format!(
                "topK must be between {} and {}, got {}",
                MIN_TOP_K, MAX_TOP_K, query.top_k
            )));
        }

        let embedding = self.embedder.embed(&query.query).await.map_err(|e| {
            warn!("Search aborted, embedding failed: {}", e);
            e
        })?;

        let matches = self.store.query(embedding, query.top_k).await.map_err(|e| {
            warn!("Search aborted, store query failed: {}", e);
            e
        })?;

        debug!("Store returned {} matches for top_k={}", matches.len(), query.top_k);

        let results: Vec<SearchResult> = matches
            .into_iter()
            .map(|m| SearchResult::from_metadata(m.metadata, m.score))
            .collect();

        info!("Search returned {} results", results.len());

        Ok(SearchOutcome {
            query: query.query,
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{HashEmbeddingClient, InMemoryKnowledgeStore, ScoredMatch};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> KnowledgeResult<Vec<f32>> {
            Err(KnowledgeError::EmbeddingService("HTTP 500: upstream exploded".to_string()))
        }
    }

    /// Store that counts calls and can be told to fail.
    struct RecordingStore {
        inner: InMemoryKnowledgeStore,
        upserts: AtomicUsize,
        queries: AtomicUsize,
        fail: bool,
    }

    impl RecordingStore {
        fn new(fail: bool) -> Self {
            Self {
                inner: InMemoryKnowledgeStore::new(),
                upserts: AtomicUsize::new(0),
                queries: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl KnowledgeStore for RecordingStore {
        async fn upsert(
            &self,
            id: KnowledgeId,
            vector: Vec<f32>,
            metadata: &RecordMetadata,
        ) -> KnowledgeResult<()> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(KnowledgeError::StoreWrite("HTTP 503: index unavailable".to_string()));
            }
            self.inner.upsert(id, vector, metadata).await
        }

        async fn query(&self, vector: Vec<f32>, top_k: usize) -> KnowledgeResult<Vec<ScoredMatch>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(KnowledgeError::StoreQuery("HTTP 503: index unavailable".to_string()));
            }
            self.inner.query(vector, top_k).await
        }
    }

    fn upload_request(problem: &str, solution: &str) -> NewKnowledge {
        NewKnowledge {
            problem: problem.to_string(),
            solution: solution.to_string(),
            language: None,
            framework: None,
        }
    }

    #[tokio::test]
    async fn test_upload_then_search_finds_solution() {
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let service = StandardKnowledgeBase::new(Arc::new(HashEmbeddingClient::new()), store.clone());

        let receipt = service
            .upload(upload_request("X undefined error", "add null check"))
            .await
            .unwrap();
        assert!(!receipt.message.is_empty());

        let outcome = service.search(KnowledgeQuery::new("X undefined error")).await.unwrap();

        assert_eq!(outcome.query, "X undefined error");
        assert_eq!(outcome.results_found(), 1);
        assert_eq!(outcome.results[0].solution, "add null check");
        assert!((outcome.results[0].score - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_upload_stores_classifiers_only_when_present() {
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let service = StandardKnowledgeBase::new(Arc::new(HashEmbeddingClient::new()), store.clone());

        let mut request = upload_request("hydration mismatch", "render on client only");
        request.framework = Some("nextjs".to_string());
        let receipt = service.upload(request).await.unwrap();

        let stored = serde_json::to_value(store.get(receipt.id).await.unwrap()).unwrap();
        assert_eq!(stored["framework"], "nextjs");
        assert!(stored.get("language").is_none());
    }

    #[tokio::test]
    async fn test_upload_ids_are_unique() {
        let service = StandardKnowledgeBase::new(
            Arc::new(HashEmbeddingClient::new()),
            Arc::new(InMemoryKnowledgeStore::new()),
        );

        let mut ids = std::collections::HashSet::new();
        for _ in 0..25 {
            let receipt = service.upload(upload_request("same problem", "same fix")).await.unwrap();
            assert!(ids.insert(receipt.id));
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_store() {
        let store = Arc::new(RecordingStore::new(false));
        let service = StandardKnowledgeBase::new(Arc::new(FailingEmbedder), store.clone());

        let err = service.search(KnowledgeQuery::new("anything")).await.unwrap_err();
        assert_eq!(err.kind(), "embedding_service");
        assert!(err.to_string().contains("upstream exploded"));
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);

        let err = service.upload(upload_request("p", "s")).await.unwrap_err();
        assert_eq!(err.kind(), "embedding_service");
        assert_eq!(store.upserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failures_surface() {
        let store = Arc::new(RecordingStore::new(true));
        let service = StandardKnowledgeBase::new(Arc::new(HashEmbeddingClient::new()), store);

        let err = service.upload(upload_request("p", "s")).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::StoreWrite(_)));

        let err = service.search(KnowledgeQuery::new("p")).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::StoreQuery(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_out_of_range_top_k() {
        let store = Arc::new(RecordingStore::new(false));
        let service = StandardKnowledgeBase::new(Arc::new(HashEmbeddingClient::new()), store.clone());

        for top_k in [0, 21] {
            let err = service
                .search(KnowledgeQuery::new("query").with_top_k(top_k))
                .await
                .unwrap_err();
            assert!(err.is_client_error());
        }
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_problem_rejected() {
        let service = StandardKnowledgeBase::new(
            Arc::new(HashEmbeddingClient::new()),
            Arc::new(InMemoryKnowledgeStore::new()),
        );

        let err = service.upload(upload_request("   ", "fix")).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::Validation(msg) if msg.contains("problem")));
    }
}
