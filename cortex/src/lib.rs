// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Hivemind Cortex
//!
//! Shared problem/solution memory for coding agents. Agents upload a problem
//! together with the fix that worked, and later search for fixes to problems
//! that read alike.
//!
//! # Architecture
//!
//! - **Layer:** Learning & Memory Layer
//! - **Purpose:** Embedding-backed knowledge exchange exposed as MCP tools

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use infrastructure::*;
