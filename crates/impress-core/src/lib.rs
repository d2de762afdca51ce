// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Impress artifact subsystem.
//!
//! This crate provides the shared error type, the persisted record types
//! (artifacts, mentions, statistics), and the persistence gateway trait that
//! storage engines implement. The URI scheme itself lives in `impress-uri`
//! and is re-exported here for convenience.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ImpressError;
pub use traits::ArtifactGateway;
pub use types::{
    ActorId, ArtifactId, ArtifactMention, ArtifactMetadata, ArtifactReference, ConversationId,
    MentionId, MentionStatistics, MentionType, MessageId,
};

// The URI model is defined in its own leaf crate.
pub use impress_uri::{determine_type, ArtifactType, ArtifactUri};
