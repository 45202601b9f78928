// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Knowledge records, search results, configuration and the error taxonomy.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pure types shared by the application and presentation layers

pub mod config;
pub mod error;
pub mod knowledge;

pub use config::*;
pub use error::*;
pub use knowledge::*;
