// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Artifact type classification derived from URI provider and path.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The kind of object an artifact URI points at.
///
/// Derived from the URI, never stored independently of it: the provider and
/// path prefix fully determine the type (see [`determine_type`]).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ArtifactType {
    Paper,
    Document,
    Repository,
    Dataset,
    Robot,
    Stream,
    ExternalUrl,
    Unknown,
}

/// Map a provider and resource path to an artifact type.
///
/// This table is the single source of truth for type inference. It is total:
/// every provider maps to exactly one type, defaulting to
/// [`ArtifactType::Unknown`]. The `doi` and `arxiv` providers classify as
/// papers so that extracted raw identifiers resolve through the paper
/// strategy; `external` carries arbitrary web URLs.
pub fn determine_type(provider: &str, path: &str) -> ArtifactType {
    match provider {
        "imbib" if path.starts_with("papers/") => ArtifactType::Paper,
        "imprint" if path.starts_with("documents/") => ArtifactType::Document,
        "repos" => ArtifactType::Repository,
        "data" => ArtifactType::Dataset,
        "robots" => ArtifactType::Robot,
        "streams" => ArtifactType::Stream,
        "doi" | "arxiv" => ArtifactType::Paper,
        "external" => ArtifactType::ExternalUrl,
        _ => ArtifactType::Unknown,
    }
}
