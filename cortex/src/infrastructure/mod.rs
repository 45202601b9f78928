// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: embedding and vector-store adapters

pub mod repository;
pub mod embedding_client;
pub mod memory_store;
pub mod pinecone_store;

pub use repository::{EmbeddingProvider, KnowledgeStore, ScoredMatch};
pub use embedding_client::{HashEmbeddingClient, OpenAIEmbeddingClient, EMBEDDING_MODEL};
pub use memory_store::InMemoryKnowledgeStore;
pub use pinecone_store::PineconeKnowledgeStore;
