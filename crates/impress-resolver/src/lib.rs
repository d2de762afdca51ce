// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact resolution for the Impress suite.
//!
//! Turns an `impress://` reference into rich, displayable data by calling
//! the owning application's local HTTP API (or the public code-host API for
//! repositories). Outcomes — successes and failures alike — are cached in
//! memory for five minutes, so a briefly unavailable sibling app cannot be
//! hammered by redundant calls.

pub mod cache;
pub mod config;
pub mod data;
pub mod resolver;

pub use cache::CACHE_TTL;
pub use config::{ResolverConfig, IMBIB_PORT, IMPRINT_PORT};
pub use data::{
    DatasetData, DocumentData, PaperData, RepositoryData, ResolvedArtifact, ResolvedArtifactData,
};
pub use resolver::ArtifactResolver;
