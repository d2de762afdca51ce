// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence gateway.
//!
//! The default engine for tests and single-process deployments. Durable
//! engines live outside this subsystem and plug in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use impress_core::{
    ArtifactGateway, ArtifactId, ArtifactMention, ArtifactReference, ConversationId,
    ImpressError, MessageId,
};
use impress_uri::ArtifactType;

#[derive(Default)]
struct Inner {
    artifacts: HashMap<ArtifactId, ArtifactReference>,
    uri_index: HashMap<String, ArtifactId>,
    mentions: Vec<ArtifactMention>,
}

/// Gateway backed by plain in-memory maps behind an `RwLock`.
#[derive(Default)]
pub struct InMemoryGateway {
    inner: RwLock<Inner>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactGateway for InMemoryGateway {
    async fn insert_artifact(&self, artifact: &ArtifactReference) -> Result<(), ImpressError> {
        let mut inner = self.inner.write().await;
        if inner.uri_index.contains_key(&artifact.uri) {
            return Err(ImpressError::storage(format!(
                "artifact URI already exists: {}",
                artifact.uri
            )));
        }
        inner
            .uri_index
            .insert(artifact.uri.clone(), artifact.id.clone());
        inner.artifacts.insert(artifact.id.clone(), artifact.clone());
        Ok(())
    }

    async fn artifact_by_uri(
        &self,
        uri: &str,
    ) -> Result<Option<ArtifactReference>, ImpressError> {
        let inner = self.inner.read().await;
        Ok(inner
            .uri_index
            .get(uri)
            .and_then(|id| inner.artifacts.get(id))
            .cloned())
    }

    async fn artifact_by_id(
        &self,
        id: &ArtifactId,
    ) -> Result<Option<ArtifactReference>, ImpressError> {
        Ok(self.inner.read().await.artifacts.get(id).cloned())
    }

    async fn update_artifact(&self, artifact: &ArtifactReference) -> Result<(), ImpressError> {
        let mut inner = self.inner.write().await;
        if !inner.artifacts.contains_key(&artifact.id) {
            return Err(ImpressError::NotFound(artifact.id.to_string()));
        }
        inner.artifacts.insert(artifact.id.clone(), artifact.clone());
        Ok(())
    }

    async fn artifacts_by_type(
        &self,
        artifact_type: ArtifactType,
    ) -> Result<Vec<ArtifactReference>, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .artifacts
            .values()
            .filter(|a| a.artifact_type == artifact_type)
            .cloned()
            .collect())
    }

    async fn artifacts_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactReference>, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .artifacts
            .values()
            .filter(|a| a.source_conversation_id.as_ref() == Some(conversation_id))
            .cloned()
            .collect())
    }

    async fn insert_mention(&self, mention: &ArtifactMention) -> Result<(), ImpressError> {
        self.inner.write().await.mentions.push(mention.clone());
        Ok(())
    }

    async fn mentions_for_artifact(
        &self,
        artifact_uri: &str,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .mentions
            .iter()
            .filter(|m| m.artifact_uri == artifact_uri)
            .cloned()
            .collect())
    }

    async fn mentions_for_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .mentions
            .iter()
            .filter(|m| &m.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn mentions_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .mentions
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn count_mentions(
        &self,
        artifact_uri: &str,
        conversation_id: &ConversationId,
    ) -> Result<usize, ImpressError> {
        Ok(self
            .inner
            .read()
            .await
            .mentions
            .iter()
            .filter(|m| m.artifact_uri == artifact_uri && &m.conversation_id == conversation_id)
            .count())
    }
}
