// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The artifact directory: the single authority for artifact records and
//! mention provenance.
//!
//! All creation goes through [`ArtifactDirectory::get_or_create_artifact`],
//! which deduplicates by canonical URI, and all mention recording goes
//! through [`ArtifactDirectory::record_mention`], which keeps the
//! first-mention flag unique per artifact and conversation even under
//! concurrent writers. [`ArtifactDirectory::process_message_content`] wires
//! the extractor to both.
//!
//! Persistence sits behind the [`ArtifactGateway`] trait from
//! `impress-core`; [`InMemoryGateway`] is the bundled engine.

pub mod directory;
pub mod memory;

pub use directory::{ArtifactDirectory, ArtifactSeed, ArtifactUpdate, NewMention};
pub use memory::InMemoryGateway;

pub use impress_core::ArtifactGateway;
