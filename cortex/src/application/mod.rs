// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application layer: the knowledge service and client lifecycle

pub mod client_lifecycle;
pub mod knowledge_service;

pub use client_lifecycle::{ClientFactory, ClientLifecycle, HttpClientFactory, KnowledgeClients};
pub use knowledge_service::{KnowledgeBase, StandardKnowledgeBase};
