// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Knowledge
//!
//! Value objects for shared (problem, solution) knowledge records and the
//! ephemeral search results derived from them.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Record identity, persisted metadata shape, search result shape

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimensionality of every stored and query vector.
pub const EMBEDDING_DIMENSIONS: usize = 512;

pub const DEFAULT_TOP_K: usize = 5;
pub const MIN_TOP_K: usize = 1;
pub const MAX_TOP_K: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnowledgeId(pub Uuid);

impl KnowledgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KnowledgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for KnowledgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata persisted next to a record's vector.
///
/// `language` and `framework` are omitted from the serialized form when
/// absent; they never appear as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub problem_text: String,
    pub solution_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub timestamp: String,
}

impl RecordMetadata {
    pub fn new(
        problem_text: String,
        solution_text: String,
        language: Option<String>,
        framework: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            problem_text,
            solution_text,
            language: language.filter(|value| !value.is_empty()),
            framework: framework.filter(|value| !value.is_empty()),
            timestamp: format_timestamp(created_at),
        }
    }
}

/// RFC 3339, UTC, millisecond precision, `Z` suffix. Sorts lexically.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Input to an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewKnowledge {
    pub problem: String,
    pub solution: String,
    pub language: Option<String>,
    pub framework: Option<String>,
}

/// Input to a search.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeQuery {
    pub query: String,
    pub top_k: usize,
}

impl KnowledgeQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub id: KnowledgeId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub timestamp: String,
}

/// One ranked hit. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub problem: String,
    pub solution: String,
    pub score: f32,
    pub metadata: ResultMetadata,
}

impl SearchResult {
    pub fn from_metadata(metadata: RecordMetadata, score: f32) -> Self {
        Self {
            problem: metadata.problem_text,
            solution: metadata.solution_text,
            score,
            metadata: ResultMetadata {
                language: metadata.language,
                framework: metadata.framework,
                timestamp: metadata.timestamp,
            },
        }
    }
}

/// Results of one search, in the store's ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<SearchResult>,
}

impl SearchOutcome {
    pub fn results_found(&self) -> usize {
        self.results.len()
    }
}
