// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error taxonomy surfaced to tool callers.

/// Errors produced while uploading or searching knowledge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Missing required configuration: {setting} is not set")]
    Configuration { setting: &'static str },

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Failed to store knowledge: {0}")]
    StoreWrite(String),

    #[error("Failed to query knowledge base: {0}")]
    StoreQuery(String),
}

impl KnowledgeError {
    /// Stable identifier reported in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Validation(_) => "validation",
            Self::EmbeddingService(_) => "embedding_service",
            Self::StoreWrite(_) => "store_write",
            Self::StoreQuery(_) => "store_query",
        }
    }

    /// True when the caller supplied malformed input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
