// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence gateway trait for artifact and mention records.

use async_trait::async_trait;

use crate::error::ImpressError;
use crate::types::{
    ArtifactId, ArtifactMention, ArtifactReference, ConversationId, MessageId,
};
use impress_uri::ArtifactType;

/// Adapter for the storage engine that holds artifact and mention records.
///
/// The directory performs all check-then-act sequencing itself; a gateway
/// only has to provide atomicity at the granularity of one insert or one
/// update. No schema is mandated beyond these access patterns. Listing
/// methods may return rows in any order — the directory applies the
/// externally visible sort orders.
#[async_trait]
pub trait ArtifactGateway: Send + Sync {
    /// Insert a new artifact record. Fails if the URI already exists.
    async fn insert_artifact(&self, artifact: &ArtifactReference) -> Result<(), ImpressError>;

    /// Fetch an artifact by its canonical URI string.
    async fn artifact_by_uri(&self, uri: &str)
        -> Result<Option<ArtifactReference>, ImpressError>;

    /// Fetch an artifact by id.
    async fn artifact_by_id(
        &self,
        id: &ArtifactId,
    ) -> Result<Option<ArtifactReference>, ImpressError>;

    /// Replace an existing artifact record, matched by id.
    async fn update_artifact(&self, artifact: &ArtifactReference) -> Result<(), ImpressError>;

    /// All artifacts of one type.
    async fn artifacts_by_type(
        &self,
        artifact_type: ArtifactType,
    ) -> Result<Vec<ArtifactReference>, ImpressError>;

    /// All artifacts first attached from one conversation.
    async fn artifacts_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactReference>, ImpressError>;

    /// Append a mention record.
    async fn insert_mention(&self, mention: &ArtifactMention) -> Result<(), ImpressError>;

    /// All mentions of one artifact URI, across conversations.
    async fn mentions_for_artifact(
        &self,
        artifact_uri: &str,
    ) -> Result<Vec<ArtifactMention>, ImpressError>;

    /// All mentions inside one message.
    async fn mentions_for_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Vec<ArtifactMention>, ImpressError>;

    /// All mentions inside one conversation.
    async fn mentions_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactMention>, ImpressError>;

    /// Number of mentions already recorded for an (artifact URI,
    /// conversation) pair. Drives first-mention detection.
    async fn count_mentions(
        &self,
        artifact_uri: &str,
        conversation_id: &ConversationId,
    ) -> Result<usize, ImpressError>;
}
