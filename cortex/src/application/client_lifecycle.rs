// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Client Lifecycle
//!
//! Builds the embedding and vector-store clients lazily, exactly once per
//! process, from externally supplied configuration.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** One-time client construction with a completion barrier
//!
//! The first caller validates configuration and runs construction; callers
//! arriving while that is in flight await the same result instead of starting
//! their own. A failed attempt is not cached.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::domain::{KnowledgeConfig, KnowledgeResult, ResolvedConfig};
use crate::infrastructure::{
    EmbeddingProvider, KnowledgeStore, OpenAIEmbeddingClient, PineconeKnowledgeStore,
};

/// The two external clients every tool call needs.
#[derive(Clone)]
pub struct KnowledgeClients {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn KnowledgeStore>,
}

/// Constructs clients from validated configuration.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn build(&self, config: &ResolvedConfig) -> KnowledgeResult<KnowledgeClients>;
}

/// Builds the OpenAI embedding client and the Pinecone store over one shared
/// HTTP connection pool.
pub struct HttpClientFactory;

#[async_trait]
impl ClientFactory for HttpClientFactory {
    async fn build(&self, config: &ResolvedConfig) -> KnowledgeResult<KnowledgeClients> {
        let http = reqwest::Client::new();

        let embedder = OpenAIEmbeddingClient::with_client(
            http.clone(),
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
        );
        let store = PineconeKnowledgeStore::with_client(
            http,
            &config.pinecone_host,
            config.pinecone_api_key.clone(),
            config.pinecone_namespace.clone(),
        );

        Ok(KnowledgeClients {
            embedder: Arc::new(embedder),
            store: Arc::new(store),
        })
    }
}

pub struct ClientLifecycle {
    config: KnowledgeConfig,
    factory: Arc<dyn ClientFactory>,
    clients: OnceCell<KnowledgeClients>,
}

impl ClientLifecycle {
    pub fn new(config: KnowledgeConfig) -> Self {
        Self::with_factory(config, Arc::new(HttpClientFactory))
    }

    pub fn with_factory(config: KnowledgeConfig, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            config,
            factory,
            clients: OnceCell::new(),
        }
    }

    /// Return the cached clients, building them on first use.
    ///
    /// Fails with `KnowledgeError::Configuration` naming the first missing
    /// setting before any client (and so any network call) exists.
    pub async fn ensure_clients(&self) -> KnowledgeResult<&KnowledgeClients> {
        self.clients
            .get_or_try_init(|| async {
                let resolved = match self.config.validate() {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        warn!("Cannot initialize knowledge clients: {}", e);
                        return Err(e);
                    }
                };

                let clients = self.factory.build(&resolved).await?;
                info!("Knowledge clients initialized");
                Ok(clients)
            })
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.clients.initialized()
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }
}
