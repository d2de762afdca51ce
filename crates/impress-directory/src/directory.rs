// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The artifact directory service.
//!
//! Single logical owner of the by-URI cache and of every check-then-act
//! sequence: get-or-create and first-mention detection run under one
//! internal lock, so two concurrent calls for the same URI (or the same
//! URI/conversation pair) cannot both observe "absent" and both insert.
//! Gateway calls are local persistence fast paths and may run under the
//! lock; resolution never does — the resolver is a separate owner.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use impress_core::{
    ActorId, ArtifactGateway, ArtifactId, ArtifactMention, ArtifactMetadata, ArtifactReference,
    ConversationId, ImpressError, MentionId, MentionStatistics, MentionType, MessageId,
};
use impress_extract::extract_mentions;
use impress_uri::{ArtifactType, ArtifactUri};

/// Optional fields supplied when an artifact is first created.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSeed {
    pub display_name: Option<String>,
    pub introduced_by: Option<ActorId>,
    pub source_conversation_id: Option<ConversationId>,
    pub source_message_id: Option<MessageId>,
    pub metadata: Option<ArtifactMetadata>,
}

/// Partial update: only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct ArtifactUpdate {
    pub display_name: Option<String>,
    pub metadata: Option<ArtifactMetadata>,
    pub is_resolved: Option<bool>,
}

/// Input for recording one mention occurrence.
#[derive(Debug, Clone)]
pub struct NewMention {
    pub artifact_id: ArtifactId,
    pub artifact_uri: String,
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    pub mention_type: MentionType,
    pub offset: Option<usize>,
    pub length: Option<usize>,
    pub context: Option<String>,
    pub actor_id: Option<ActorId>,
}

#[derive(Default)]
struct DirectoryState {
    by_uri: HashMap<String, ArtifactReference>,
}

/// Deduplicates artifact records, records mention provenance, and computes
/// aggregate statistics, on top of a pluggable persistence gateway.
pub struct ArtifactDirectory {
    gateway: Arc<dyn ArtifactGateway>,
    state: Mutex<DirectoryState>,
}

impl ArtifactDirectory {
    pub fn new(gateway: Arc<dyn ArtifactGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// The sole artifact-creation entry point. Idempotent: repeated calls
    /// with the same URI return the existing record unchanged.
    pub async fn get_or_create_artifact(
        &self,
        uri: &ArtifactUri,
        seed: ArtifactSeed,
    ) -> Result<ArtifactReference, ImpressError> {
        let uri_str = uri.to_string();
        let mut state = self.state.lock().await;

        if let Some(cached) = state.by_uri.get(&uri_str) {
            return Ok(cached.clone());
        }
        if let Some(existing) = self.gateway.artifact_by_uri(&uri_str).await? {
            state.by_uri.insert(uri_str, existing.clone());
            return Ok(existing);
        }

        let artifact = ArtifactReference {
            id: ArtifactId(Uuid::new_v4().to_string()),
            uri: uri_str.clone(),
            display_name: seed
                .display_name
                .unwrap_or_else(|| uri.display_name().to_string()),
            artifact_type: uri.artifact_type(),
            version: uri.version().map(str::to_string),
            created_at: Utc::now(),
            introduced_by: seed.introduced_by,
            source_conversation_id: seed.source_conversation_id,
            source_message_id: seed.source_message_id,
            is_resolved: false,
            metadata: seed.metadata,
        };
        self.gateway.insert_artifact(&artifact).await?;
        debug!(uri = uri_str.as_str(), id = %artifact.id, "created artifact record");
        state.by_uri.insert(uri_str, artifact.clone());
        Ok(artifact)
    }

    /// Lookup by URI string, cache first.
    pub async fn get_artifact_by_uri(
        &self,
        uri: &str,
    ) -> Result<Option<ArtifactReference>, ImpressError> {
        let mut state = self.state.lock().await;
        if let Some(cached) = state.by_uri.get(uri) {
            return Ok(Some(cached.clone()));
        }
        let found = self.gateway.artifact_by_uri(uri).await?;
        if let Some(artifact) = &found {
            state.by_uri.insert(uri.to_string(), artifact.clone());
        }
        Ok(found)
    }

    /// Lookup by id.
    pub async fn get_artifact_by_id(
        &self,
        id: &ArtifactId,
    ) -> Result<Option<ArtifactReference>, ImpressError> {
        self.gateway.artifact_by_id(id).await
    }

    /// Partial update; invalidates the cache entry for the artifact's URI.
    pub async fn update_artifact(
        &self,
        id: &ArtifactId,
        update: ArtifactUpdate,
    ) -> Result<ArtifactReference, ImpressError> {
        let mut state = self.state.lock().await;
        let mut artifact = self
            .gateway
            .artifact_by_id(id)
            .await?
            .ok_or_else(|| ImpressError::NotFound(id.to_string()))?;

        if let Some(display_name) = update.display_name {
            artifact.display_name = display_name;
        }
        if let Some(metadata) = update.metadata {
            artifact.metadata = Some(metadata);
        }
        if let Some(is_resolved) = update.is_resolved {
            artifact.is_resolved = is_resolved;
        }

        self.gateway.update_artifact(&artifact).await?;
        state.by_uri.remove(&artifact.uri);
        Ok(artifact)
    }

    /// All artifacts of one type, newest first.
    pub async fn get_artifacts_of_type(
        &self,
        artifact_type: ArtifactType,
    ) -> Result<Vec<ArtifactReference>, ImpressError> {
        let mut artifacts = self.gateway.artifacts_by_type(artifact_type).await?;
        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.uri.cmp(&b.uri)));
        Ok(artifacts)
    }

    /// Artifacts first attached from one conversation, oldest first.
    pub async fn get_artifacts_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactReference>, ImpressError> {
        let mut artifacts = self
            .gateway
            .artifacts_for_conversation(conversation_id)
            .await?;
        artifacts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.uri.cmp(&b.uri)));
        Ok(artifacts)
    }

    /// Record one mention occurrence.
    ///
    /// First-mention detection is atomic with respect to other concurrent
    /// calls for the same (URI, conversation) pair: the count and the
    /// insert run under the directory's owner lock.
    pub async fn record_mention(
        &self,
        mention: NewMention,
    ) -> Result<ArtifactMention, ImpressError> {
        let state = self.state.lock().await;
        let prior = self
            .gateway
            .count_mentions(&mention.artifact_uri, &mention.conversation_id)
            .await?;
        let record = ArtifactMention {
            id: MentionId(Uuid::new_v4().to_string()),
            artifact_id: mention.artifact_id,
            artifact_uri: mention.artifact_uri,
            message_id: mention.message_id,
            conversation_id: mention.conversation_id,
            mention_type: mention.mention_type,
            offset: mention.offset,
            length: mention.length,
            context: mention.context,
            recorded_at: Utc::now(),
            actor_id: mention.actor_id,
            is_first_mention: prior == 0,
        };
        self.gateway.insert_mention(&record).await?;
        drop(state);
        Ok(record)
    }

    /// All mentions of one artifact URI, recorded-at ascending.
    pub async fn get_mentions_for_artifact(
        &self,
        artifact_uri: &str,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        let mut mentions = self.gateway.mentions_for_artifact(artifact_uri).await?;
        mentions.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(mentions)
    }

    /// All mentions in one message, character offset ascending.
    pub async fn get_mentions_for_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        let mut mentions = self.gateway.mentions_for_message(message_id).await?;
        mentions.sort_by_key(|m| m.offset.unwrap_or(usize::MAX));
        Ok(mentions)
    }

    /// All mentions in one conversation, recorded-at ascending.
    pub async fn get_mentions_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        let mut mentions = self
            .gateway
            .mentions_for_conversation(conversation_id)
            .await?;
        mentions.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(mentions)
    }

    /// Aggregate statistics over one conversation's mentions.
    pub async fn get_mention_statistics(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<MentionStatistics, ImpressError> {
        let mentions = self
            .gateway
            .mentions_for_conversation(conversation_id)
            .await?;

        let mut by_artifact_type: BTreeMap<ArtifactType, usize> = BTreeMap::new();
        let mut by_mention_type: BTreeMap<MentionType, usize> = BTreeMap::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for mention in &mentions {
            let artifact_type = ArtifactUri::parse(&mention.artifact_uri)
                .map(|uri| uri.artifact_type())
                .unwrap_or(ArtifactType::Unknown);
            *by_artifact_type.entry(artifact_type).or_default() += 1;
            *by_mention_type.entry(mention.mention_type).or_default() += 1;
            *counts.entry(mention.artifact_uri.as_str()).or_default() += 1;
        }

        let distinct_artifacts = counts.len();
        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(uri, count)| (uri.to_string(), count))
            .collect();
        // Count descending, ties broken deterministically by URI order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(10);

        Ok(MentionStatistics {
            total_mentions: mentions.len(),
            distinct_artifacts,
            by_artifact_type,
            by_mention_type,
            top_mentioned: ranked,
        })
    }

    /// Orchestration entry point: extract mentions from a message body,
    /// create any new artifacts, and record every mention — in extraction
    /// order. The only place the extractor and the directory meet.
    pub async fn process_message_content(
        &self,
        text: &str,
        message_id: &MessageId,
        conversation_id: &ConversationId,
        actor_id: Option<&ActorId>,
    ) -> Result<Vec<ArtifactMention>, ImpressError> {
        let mut known: HashSet<String> = self
            .gateway
            .mentions_for_conversation(conversation_id)
            .await?
            .into_iter()
            .map(|m| m.artifact_uri)
            .collect();
        known.extend(
            self.gateway
                .artifacts_for_conversation(conversation_id)
                .await?
                .into_iter()
                .map(|a| a.uri),
        );

        let extracted = extract_mentions(text, &known);
        let mut recorded = Vec::with_capacity(extracted.len());
        for mention in extracted {
            let artifact = self
                .get_or_create_artifact(
                    &mention.uri,
                    ArtifactSeed {
                        introduced_by: actor_id.cloned(),
                        source_conversation_id: Some(conversation_id.clone()),
                        source_message_id: Some(message_id.clone()),
                        ..Default::default()
                    },
                )
                .await?;
            let record = self
                .record_mention(NewMention {
                    artifact_id: artifact.id.clone(),
                    artifact_uri: artifact.uri.clone(),
                    message_id: message_id.clone(),
                    conversation_id: conversation_id.clone(),
                    mention_type: mention.mention_type,
                    offset: Some(mention.offset),
                    length: Some(mention.length),
                    context: Some(mention.context),
                    actor_id: actor_id.cloned(),
                })
                .await?;
            recorded.push(record);
        }
        Ok(recorded)
    }

    // --- Thin sugar over the generic operations ---

    pub async fn get_or_create_paper(
        &self,
        cite_key: &str,
        seed: ArtifactSeed,
    ) -> Result<ArtifactReference, ImpressError> {
        self.get_or_create_artifact(&ArtifactUri::paper(cite_key), seed)
            .await
    }

    pub async fn get_or_create_repository(
        &self,
        host: &str,
        owner: &str,
        repo: &str,
        commit: Option<&str>,
        seed: ArtifactSeed,
    ) -> Result<ArtifactReference, ImpressError> {
        self.get_or_create_artifact(&ArtifactUri::repository(host, owner, repo, commit), seed)
            .await
    }

    pub async fn get_all_papers(&self) -> Result<Vec<ArtifactReference>, ImpressError> {
        self.get_artifacts_of_type(ArtifactType::Paper).await
    }

    pub async fn get_all_repositories(&self) -> Result<Vec<ArtifactReference>, ImpressError> {
        self.get_artifacts_of_type(ArtifactType::Repository).await
    }

    pub async fn get_papers_for_conversation(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<ArtifactReference>, ImpressError> {
        Ok(self
            .get_artifacts_for_conversation(conversation_id)
            .await?
            .into_iter()
            .filter(|a| a.artifact_type == ArtifactType::Paper)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryGateway;

    fn directory() -> Arc<ArtifactDirectory> {
        Arc::new(ArtifactDirectory::new(Arc::new(InMemoryGateway::new())))
    }

    fn conv(id: &str) -> ConversationId {
        ConversationId(id.into())
    }

    fn msg(id: &str) -> MessageId {
        MessageId(id.into())
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let dir = directory();
        let uri = ArtifactUri::paper("Fowler2012");
        let first = dir
            .get_or_create_artifact(&uri, ArtifactSeed::default())
            .await
            .unwrap();
        let second = dir
            .get_or_create_artifact(
                &uri,
                ArtifactSeed {
                    display_name: Some("should be ignored".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        // The existing record is returned unchanged.
        assert_eq!(second.display_name, "Fowler2012");
        assert!(!second.is_resolved);
    }

    #[tokio::test]
    async fn concurrent_get_or_create_inserts_exactly_once() {
        let dir = directory();
        let uri = ArtifactUri::paper("Race2024");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let dir = Arc::clone(&dir);
            let uri = uri.clone();
            handles.push(tokio::spawn(async move {
                dir.get_or_create_artifact(&uri, ArtifactSeed::default())
                    .await
                    .unwrap()
            }));
        }
        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().id.0);
        }
        assert_eq!(ids.len(), 1, "all callers must observe the same record");
    }

    #[tokio::test]
    async fn first_mention_is_unique_under_concurrency() {
        let dir = directory();
        let artifact = dir
            .get_or_create_paper("Hot2025", ArtifactSeed::default())
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let dir = Arc::clone(&dir);
            let artifact_id = artifact.id.clone();
            let artifact_uri = artifact.uri.clone();
            handles.push(tokio::spawn(async move {
                dir.record_mention(NewMention {
                    artifact_id,
                    artifact_uri,
                    message_id: msg(&format!("m-{i}")),
                    conversation_id: conv("c-1"),
                    mention_type: MentionType::Cited,
                    offset: None,
                    length: None,
                    context: None,
                    actor_id: None,
                })
                .await
                .unwrap()
            }));
        }

        let mut first_count = 0;
        for handle in handles {
            if handle.await.unwrap().is_first_mention {
                first_count += 1;
            }
        }
        assert_eq!(first_count, 1, "exactly one mention may be first");
    }

    #[tokio::test]
    async fn first_mention_is_per_conversation() {
        let dir = directory();
        let artifact = dir
            .get_or_create_paper("Span2021", ArtifactSeed::default())
            .await
            .unwrap();
        for conversation in ["c-1", "c-2"] {
            let mention = dir
                .record_mention(NewMention {
                    artifact_id: artifact.id.clone(),
                    artifact_uri: artifact.uri.clone(),
                    message_id: msg("m-1"),
                    conversation_id: conv(conversation),
                    mention_type: MentionType::Cited,
                    offset: None,
                    length: None,
                    context: None,
                    actor_id: None,
                })
                .await
                .unwrap();
            assert!(mention.is_first_mention, "first in {conversation}");
        }
    }

    #[tokio::test]
    async fn update_artifact_changes_only_supplied_fields() {
        let dir = directory();
        let artifact = dir
            .get_or_create_paper("Edit2020", ArtifactSeed::default())
            .await
            .unwrap();

        let updated = dir
            .update_artifact(
                &artifact.id,
                ArtifactUpdate {
                    is_resolved: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_resolved);
        assert_eq!(updated.display_name, artifact.display_name);

        // Cache was invalidated: the lookup sees the updated record.
        let fetched = dir.get_artifact_by_uri(&artifact.uri).await.unwrap().unwrap();
        assert!(fetched.is_resolved);

        let missing = dir
            .update_artifact(&ArtifactId("ghost".into()), ArtifactUpdate::default())
            .await;
        assert!(matches!(missing, Err(ImpressError::NotFound(_))));
    }

    #[tokio::test]
    async fn process_message_introduces_then_cites() {
        let dir = directory();
        let conversation = conv("c-1");

        let first = dir
            .process_message_content(
                "See [Fowler2012] for details.",
                &msg("m-1"),
                &conversation,
                Some(&ActorId("alice".into())),
            )
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].mention_type, MentionType::Introduced);
        assert!(first[0].is_first_mention);
        assert_eq!(first[0].artifact_uri, "impress://imbib/papers/Fowler2012");

        // Same cite key later in the conversation: now known, so cited,
        // and no longer the first mention.
        let second = dir
            .process_message_content(
                "As [Fowler2012] argues...",
                &msg("m-2"),
                &conversation,
                None,
            )
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].mention_type, MentionType::Cited);
        assert!(!second[0].is_first_mention);

        // Both mentions share one artifact record.
        assert_eq!(second[0].artifact_id, first[0].artifact_id);
    }

    #[tokio::test]
    async fn process_message_records_doi_as_cited() {
        let dir = directory();
        let mentions = dir
            .process_message_content(
                "doi:10.1038/nature12373 shows...",
                &msg("m-1"),
                &conv("c-1"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].mention_type, MentionType::Cited);
        assert_eq!(mentions[0].artifact_uri, "impress://doi/10.1038/nature12373");
    }

    #[tokio::test]
    async fn process_message_provenance_fields_are_set() {
        let dir = directory();
        let actor = ActorId("bob".into());
        dir.process_message_content(
            "New repo: https://github.com/foo/bar",
            &msg("m-9"),
            &conv("c-3"),
            Some(&actor),
        )
        .await
        .unwrap();

        let artifact = dir
            .get_artifact_by_uri("impress://repos/github.com/foo/bar@HEAD")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.introduced_by.as_ref(), Some(&actor));
        assert_eq!(artifact.source_conversation_id, Some(conv("c-3")));
        assert_eq!(artifact.source_message_id, Some(msg("m-9")));
        assert_eq!(artifact.version.as_deref(), Some("HEAD"));
    }

    #[tokio::test]
    async fn mention_listings_have_defined_orders() {
        let dir = directory();
        let artifact = dir
            .get_or_create_paper("Order2022", ArtifactSeed::default())
            .await
            .unwrap();

        // Record mentions with descending offsets inside one message.
        for (i, offset) in [(0usize, 40usize), (1, 10), (2, 25)] {
            dir.record_mention(NewMention {
                artifact_id: artifact.id.clone(),
                artifact_uri: artifact.uri.clone(),
                message_id: msg("m-1"),
                conversation_id: conv("c-1"),
                mention_type: MentionType::Cited,
                offset: Some(offset),
                length: Some(5),
                context: Some(format!("snippet {i}")),
                actor_id: None,
            })
            .await
            .unwrap();
        }

        let in_message = dir.get_mentions_for_message(&msg("m-1")).await.unwrap();
        let offsets: Vec<_> = in_message.iter().filter_map(|m| m.offset).collect();
        assert_eq!(offsets, vec![10, 25, 40]);

        let in_conversation = dir.get_mentions_for_conversation(&conv("c-1")).await.unwrap();
        assert_eq!(in_conversation.len(), 3);
        assert!(in_conversation.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));

        let for_artifact = dir.get_mentions_for_artifact(&artifact.uri).await.unwrap();
        assert_eq!(for_artifact.len(), 3);
        assert!(for_artifact[0].is_first_mention);
    }

    #[tokio::test]
    async fn statistics_aggregate_one_conversation() {
        let dir = directory();
        let conversation = conv("c-1");
        dir.process_message_content(
            "See [Fowler2012] and https://github.com/foo/bar",
            &msg("m-1"),
            &conversation,
            None,
        )
        .await
        .unwrap();
        dir.process_message_content(
            "Back to [Fowler2012], plus doi:10.1000/stats",
            &msg("m-2"),
            &conversation,
            None,
        )
        .await
        .unwrap();
        // A different conversation must not leak into the statistics.
        dir.process_message_content("[Other2019]", &msg("m-3"), &conv("c-2"), None)
            .await
            .unwrap();

        let stats = dir.get_mention_statistics(&conversation).await.unwrap();
        assert_eq!(stats.total_mentions, 4);
        assert_eq!(stats.distinct_artifacts, 3);
        assert_eq!(stats.by_artifact_type.get(&ArtifactType::Paper), Some(&3));
        assert_eq!(stats.by_artifact_type.get(&ArtifactType::Repository), Some(&1));
        assert_eq!(stats.by_mention_type.get(&MentionType::Introduced), Some(&2));
        assert_eq!(stats.by_mention_type.get(&MentionType::Cited), Some(&2));
        assert_eq!(
            stats.top_mentioned.first(),
            Some(&("impress://imbib/papers/Fowler2012".to_string(), 2))
        );
    }

    #[tokio::test]
    async fn listings_by_type_and_conversation() {
        let dir = directory();
        let seed_in = |c: &str| ArtifactSeed {
            source_conversation_id: Some(conv(c)),
            ..Default::default()
        };
        dir.get_or_create_paper("A2020", seed_in("c-1")).await.unwrap();
        dir.get_or_create_paper("B2021", seed_in("c-1")).await.unwrap();
        dir.get_or_create_repository("github.com", "x", "y", None, seed_in("c-1"))
            .await
            .unwrap();
        dir.get_or_create_paper("C2022", seed_in("c-2")).await.unwrap();

        let papers = dir.get_all_papers().await.unwrap();
        assert_eq!(papers.len(), 3);
        // Newest first.
        assert!(papers.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let repos = dir.get_all_repositories().await.unwrap();
        assert_eq!(repos.len(), 1);

        let in_conversation = dir.get_artifacts_for_conversation(&conv("c-1")).await.unwrap();
        assert_eq!(in_conversation.len(), 3);
        // Oldest first (conversation order).
        assert!(
            in_conversation
                .windows(2)
                .all(|w| w[0].created_at <= w[1].created_at)
        );

        let conversation_papers = dir.get_papers_for_conversation(&conv("c-1")).await.unwrap();
        assert_eq!(conversation_papers.len(), 2);
    }
}
