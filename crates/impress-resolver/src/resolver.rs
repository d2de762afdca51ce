// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resolver: cache lookup, type dispatch, and the per-type HTTP
//! strategies.
//!
//! The resolver is a single owner of its cache, reachable from many
//! concurrent callers. The cache lock is held only for the map lookup and
//! insert, never across a network call, so a slow sibling cannot stall
//! other resolutions.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use futures::future;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use impress_core::{
    ArtifactId, ArtifactMetadata, ArtifactReference, ArtifactType, ImpressError,
};
use impress_uri::ArtifactUri;

use crate::cache::{ResolutionCache, CACHE_TTL};
use crate::config::ResolverConfig;
use crate::data::{
    DocumentData, PaperData, RepositoryData, ResolvedArtifact, ResolvedArtifactData,
};

/// Fields consumed from the GitHub repository endpoint.
#[derive(Debug, serde::Deserialize)]
struct GithubRepoResponse {
    default_branch: Option<String>,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
}

/// Resolves artifact URIs into displayable data by querying the owning
/// application's local API, with in-memory TTL caching of every outcome.
pub struct ArtifactResolver {
    client: reqwest::Client,
    config: ResolverConfig,
    cache: Mutex<ResolutionCache>,
}

impl ArtifactResolver {
    /// Create a resolver with the given endpoint configuration.
    pub fn new(config: ResolverConfig) -> Result<Self, ImpressError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("impress-resolver")
            .build()
            .map_err(|e| ImpressError::Resolution {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            config,
            cache: Mutex::new(ResolutionCache::new(CACHE_TTL)),
        })
    }

    /// Resolve one URI string.
    ///
    /// An unparseable string is a hard error and is never cached — there is
    /// no canonical key to cache a malformed string under. Every parseable
    /// URI produces a `ResolvedArtifact` (possibly degraded), which is
    /// cached for the TTL window.
    pub async fn resolve(&self, uri_str: &str) -> Result<ResolvedArtifact, ImpressError> {
        if let Some(hit) = self.cache.lock().await.get(uri_str) {
            debug!(uri = uri_str, "resolution served from cache");
            return Ok(hit);
        }

        let uri = ArtifactUri::parse(uri_str)
            .ok_or_else(|| ImpressError::InvalidUri(uri_str.to_string()))?;

        let outcome = self.dispatch(&uri, uri_str).await;
        self.cache
            .lock()
            .await
            .insert(uri_str.to_string(), outcome.clone());
        Ok(outcome)
    }

    /// Resolve a batch concurrently.
    ///
    /// Unbounded fan-out: call volumes are tens, not thousands. Individual
    /// failures (including malformed URIs) degrade to unresolved entries;
    /// the result always has one entry per input string.
    pub async fn resolve_all(&self, uri_strings: &[String]) -> HashMap<String, ResolvedArtifact> {
        let tasks = uri_strings
            .iter()
            .map(|uri_str| async move { (uri_str.clone(), self.resolve(uri_str).await) });
        future::join_all(tasks)
            .await
            .into_iter()
            .map(|(uri_str, result)| {
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(uri = uri_str.as_str(), error = %e, "batch entry degraded");
                        ResolvedArtifact::unresolved(fallback_reference(&uri_str), e.to_string())
                    }
                };
                (uri_str, outcome)
            })
            .collect()
    }

    /// Peek at the cache without forcing a resolution.
    pub async fn get_cached(&self, uri_str: &str) -> Option<ResolvedArtifact> {
        self.cache.lock().await.get(uri_str)
    }

    /// Drop every cached outcome.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Exhaustive dispatch over the artifact type.
    async fn dispatch(&self, uri: &ArtifactUri, uri_str: &str) -> ResolvedArtifact {
        match uri.artifact_type() {
            ArtifactType::Paper => self.resolve_paper(uri, uri_str).await,
            ArtifactType::Document => self.resolve_document(uri, uri_str).await,
            ArtifactType::Repository => self.resolve_repository(uri, uri_str).await,
            ArtifactType::Dataset => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Dataset resolution not yet implemented",
            ),
            ArtifactType::Robot => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Robot resolution not yet implemented",
            ),
            ArtifactType::Stream => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Stream resolution not yet implemented",
            ),
            ArtifactType::ExternalUrl | ArtifactType::Unknown => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "No resolution strategy for this artifact type",
            ),
        }
    }

    /// Paper strategy: the reference manager's local API.
    async fn resolve_paper(&self, uri: &ArtifactUri, uri_str: &str) -> ResolvedArtifact {
        let Some(cite_key) = uri.cite_key() else {
            // doi/arxiv provider URIs classify as papers but carry no cite
            // key; the identifier-to-cite-key mapping is not resolved here.
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Paper reference has no cite key",
            );
        };

        let url = format!("{}/api/publications/{cite_key}", self.config.imbib_base_url);
        debug!(%url, "resolving paper via reference manager");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(cite_key, error = %e, "reference manager unreachable");
                return ResolvedArtifact::unresolved(reference_for(uri, uri_str), e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Reference manager returned {status}"),
            );
        }

        match response.json::<PaperData>().await {
            Ok(paper) => {
                let mut reference = reference_for(uri, uri_str);
                if let Some(title) = &paper.title {
                    reference.display_name = title.clone();
                }
                reference.metadata = Some(paper_metadata(&paper));
                ResolvedArtifact::resolved(reference, ResolvedArtifactData::Paper(paper))
            }
            Err(e) => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Failed to decode paper metadata: {e}"),
            ),
        }
    }

    /// Document strategy: the writing tool's local API.
    async fn resolve_document(&self, uri: &ArtifactUri, uri_str: &str) -> ResolvedArtifact {
        let Some(doc_id) = uri.resource_path().strip_prefix("documents/") else {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Malformed document path",
            );
        };

        let url = format!("{}/api/documents/{doc_id}", self.config.imprint_base_url);
        debug!(%url, "resolving document via writing tool");
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(doc_id, error = %e, "writing tool unreachable");
                return ResolvedArtifact::unresolved(reference_for(uri, uri_str), e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Writing tool returned {status}"),
            );
        }

        match response.json::<DocumentData>().await {
            Ok(document) => {
                let mut reference = reference_for(uri, uri_str);
                if let Some(title) = &document.title {
                    reference.display_name = title.clone();
                }
                reference.metadata = Some(ArtifactMetadata {
                    title: document.title.clone(),
                    date: document.modified_at,
                    ..Default::default()
                });
                ResolvedArtifact::resolved(reference, ResolvedArtifactData::Document(document))
            }
            Err(e) => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Failed to decode document metadata: {e}"),
            ),
        }
    }

    /// Repository strategy: github.com via the public code-host API; all
    /// other hosts degrade immediately with zero network calls.
    async fn resolve_repository(&self, uri: &ArtifactUri, uri_str: &str) -> ResolvedArtifact {
        let Some((host, owner, repo)) = uri.repository_components() else {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Malformed repository path",
            );
        };

        if host != "github.com" {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                "Repository resolution not available",
            );
        }

        let url = format!("{}/repos/{owner}/{repo}", self.config.github_base_url);
        debug!(%url, "resolving repository via code-host API");
        let response = match self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(owner, repo, error = %e, "code-host API unreachable");
                return ResolvedArtifact::unresolved(reference_for(uri, uri_str), e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Code-host API returned {status}"),
            );
        }

        match response.json::<GithubRepoResponse>().await {
            Ok(body) => {
                let data = RepositoryData {
                    host: host.to_string(),
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    default_branch: body.default_branch,
                    description: body.description,
                    language: body.language,
                    stargazers_count: body.stargazers_count,
                };
                let mut reference = reference_for(uri, uri_str);
                reference.metadata = Some(ArtifactMetadata {
                    title: Some(format!("{owner}/{repo}")),
                    abstract_text: data.description.clone(),
                    ..Default::default()
                });
                ResolvedArtifact::resolved(reference, ResolvedArtifactData::Repository(data))
            }
            Err(e) => ResolvedArtifact::unresolved(
                reference_for(uri, uri_str),
                format!("Failed to decode repository metadata: {e}"),
            ),
        }
    }
}

/// Ephemeral reference for a URI that may not be persisted anywhere.
fn reference_for(uri: &ArtifactUri, uri_str: &str) -> ArtifactReference {
    ArtifactReference {
        id: ArtifactId(Uuid::new_v4().to_string()),
        uri: uri_str.to_string(),
        display_name: uri.display_name().to_string(),
        artifact_type: uri.artifact_type(),
        version: uri.version().map(str::to_string),
        created_at: Utc::now(),
        introduced_by: None,
        source_conversation_id: None,
        source_message_id: None,
        is_resolved: false,
        metadata: None,
    }
}

/// Placeholder reference for strings that did not even parse.
fn fallback_reference(uri_str: &str) -> ArtifactReference {
    ArtifactReference {
        id: ArtifactId(Uuid::new_v4().to_string()),
        uri: uri_str.to_string(),
        display_name: uri_str.to_string(),
        artifact_type: ArtifactType::Unknown,
        version: None,
        created_at: Utc::now(),
        introduced_by: None,
        source_conversation_id: None,
        source_message_id: None,
        is_resolved: false,
        metadata: None,
    }
}

/// Fold paper JSON into the shared metadata shape.
fn paper_metadata(paper: &PaperData) -> ArtifactMetadata {
    let mut extra = std::collections::BTreeMap::new();
    if let Some(year) = paper.year {
        extra.insert("year".to_string(), year.to_string());
    }
    ArtifactMetadata {
        title: paper.title.clone(),
        authors: paper.authors.clone(),
        doi: paper.doi.clone(),
        arxiv_id: paper.arxiv_id.clone(),
        abstract_text: paper.abstract_text.clone(),
        tags: paper.tags.clone(),
        extra,
        ..Default::default()
    }
}
