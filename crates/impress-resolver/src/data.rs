// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution outcome types.
//!
//! A [`ResolvedArtifact`] is ephemeral: recomputed on demand, cached only in
//! memory, never persisted. The typed payload is a closed sum keyed by
//! artifact type so the resolver's dispatch stays an exhaustive match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use impress_core::ArtifactReference;

/// Paper metadata as served by the reference manager's local API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperData {
    pub cite_key: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    pub arxiv_id: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub tags: Vec<String>,
}

/// Document metadata as served by the writing tool's local API.
/// Date fields are strict ISO-8601.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentData {
    pub id: String,
    pub title: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub word_count: Option<u64>,
}

/// Repository metadata assembled from the code-host API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryData {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub default_branch: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
}

/// Dataset metadata. Dataset resolution is not yet implemented, but the
/// payload type exists so the sum stays closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetData {
    pub source: String,
    pub id: String,
    pub version: Option<String>,
}

/// Typed resolution payload, keyed by artifact type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResolvedArtifactData {
    Paper(PaperData),
    Document(DocumentData),
    Repository(RepositoryData),
    Dataset(DatasetData),
}

/// The outcome of resolving one artifact reference.
///
/// Failures are values, not errors: an unreachable sibling or unsupported
/// host produces `is_resolved = false` with a human-readable `error`, and is
/// cached under the same TTL as a success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedArtifact {
    pub reference: ArtifactReference,
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResolvedArtifactData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolvedArtifact {
    /// A successful resolution carrying a typed payload.
    pub fn resolved(mut reference: ArtifactReference, data: ResolvedArtifactData) -> Self {
        reference.is_resolved = true;
        Self {
            reference,
            is_resolved: true,
            data: Some(data),
            error: None,
        }
    }

    /// A degraded outcome: the reference survives, with an error note.
    pub fn unresolved(reference: ArtifactReference, error: impl Into<String>) -> Self {
        Self {
            reference,
            is_resolved: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
