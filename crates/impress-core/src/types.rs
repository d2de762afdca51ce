// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain record types shared across the Impress crates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use impress_uri::ArtifactType;

/// Unique identifier for a persisted artifact record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub String);

/// Unique identifier for a persisted mention record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionId(pub String);

/// Unique identifier for a message in the suite's mailbox storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Unique identifier for an actor (human or agent) in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an artifact was referred to in a message.
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
pub enum MentionType {
    /// First appearance of a new artifact in the conversation.
    Introduced,
    /// A later reference to an artifact the conversation already knows.
    Referenced,
    /// A citation-style reference (cite key, DOI, arXiv id).
    Cited,
    /// A closing reference summarizing or wrapping up the artifact.
    Concluded,
    /// A plain hyperlink-style reference.
    Linked,
}

/// Structured metadata attached to an artifact after resolution or editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Free-form extension map for provider-specific fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Persisted record representing a known artifact.
///
/// The `uri` string is unique across all records; uniqueness is enforced by
/// the directory's get-or-create path, which serializes the check-then-insert
/// behind its own lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReference {
    pub id: ArtifactId,
    /// Canonical string form of the artifact URI.
    pub uri: String,
    pub display_name: String,
    pub artifact_type: ArtifactType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_by: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_conversation_id: Option<ConversationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_message_id: Option<MessageId>,
    pub is_resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArtifactMetadata>,
}

/// Persisted record of one occurrence of an artifact reference inside one
/// message. Append-only: never updated, never deleted.
///
/// For a given (artifact URI, conversation) pair exactly one mention has
/// `is_first_mention = true`, and it is the chronologically earliest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMention {
    pub id: MentionId,
    pub artifact_id: ArtifactId,
    /// Denormalized URI string, for fast filtering without a join.
    pub artifact_uri: String,
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    pub mention_type: MentionType,
    /// Character offset of the match span in the message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Character length of the match span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Bounded window of surrounding text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ActorId>,
    pub is_first_mention: bool,
}

/// Aggregate statistics over all mentions in one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionStatistics {
    pub total_mentions: usize,
    pub distinct_artifacts: usize,
    pub by_artifact_type: BTreeMap<ArtifactType, usize>,
    pub by_mention_type: BTreeMap<MentionType, usize>,
    /// Top-10 most-mentioned URIs, count descending, ties broken by URI
    /// string order.
    pub top_mentioned: Vec<(String, usize)>,
}
