// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`ArtifactUri`] value type: parsing, canonical rendering, typed
//! builders, and wildcard matching.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{determine_type, ArtifactType};

/// Scheme prefix shared by every artifact URI in the suite.
pub const SCHEME_PREFIX: &str = "impress://";

/// A parsed artifact reference, immutable once constructed.
///
/// The canonical wire form is
/// `impress://{provider}/{resourcePath}[@{version}][?{key}={value}&...]`.
/// Building a URI from components and re-parsing its rendered string yields
/// identical components. Query parameters are held in a [`BTreeMap`] so the
/// rendered form is deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactUri {
    provider: String,
    resource_path: String,
    version: Option<String>,
    query: BTreeMap<String, String>,
}

impl ArtifactUri {
    /// Construct a URI from a provider and provider-relative path.
    pub fn new(provider: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            resource_path: resource_path.into(),
            version: None,
            query: BTreeMap::new(),
        }
    }

    /// Attach a version identifier (git SHA, timestamp, or version tag).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a query parameter. Re-using a key overwrites the prior value.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Parse an artifact URI string.
    ///
    /// Parsing is permissive and total: it never errors. `None` means the
    /// scheme prefix is missing, the provider is absent, or the path is
    /// empty. The version suffix splits on the *last* `@` in the path, so
    /// paths containing `@` in earlier segments survive intact. Duplicate
    /// query keys keep the last occurrence.
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.strip_prefix(SCHEME_PREFIX)?;
        let (body, query_str) = match rest.split_once('?') {
            Some((body, q)) => (body, Some(q)),
            None => (rest, None),
        };
        let (provider, path) = body.split_once('/')?;
        if provider.is_empty() || path.is_empty() {
            return None;
        }

        let (resource_path, version) = match path.rsplit_once('@') {
            Some((p, v)) if !p.is_empty() && !v.is_empty() => {
                (p.to_string(), Some(v.to_string()))
            }
            _ => (path.to_string(), None),
        };

        let mut query = BTreeMap::new();
        if let Some(q) = query_str {
            for (key, value) in url::form_urlencoded::parse(q.as_bytes()) {
                query.insert(key.into_owned(), value.into_owned());
            }
        }

        Some(Self {
            provider: provider.to_string(),
            resource_path,
            version,
            query,
        })
    }

    // --- Typed builders, one per artifact type ---

    /// A paper in the reference manager, addressed by cite key.
    pub fn paper(cite_key: &str) -> Self {
        Self::new("imbib", format!("papers/{cite_key}"))
    }

    /// A document in the writing tool.
    pub fn document(id: &str) -> Self {
        Self::new("imprint", format!("documents/{id}"))
    }

    /// A git repository, optionally pinned to a commit.
    pub fn repository(host: &str, owner: &str, repo: &str, commit: Option<&str>) -> Self {
        let uri = Self::new("repos", format!("{host}/{owner}/{repo}"));
        match commit {
            Some(sha) => uri.with_version(sha),
            None => uri,
        }
    }

    /// A dataset held by a data provider, optionally versioned.
    pub fn dataset(source: &str, id: &str, version: Option<&str>) -> Self {
        let uri = Self::new("data", format!("{source}/{id}"));
        match version {
            Some(v) => uri.with_version(v),
            None => uri,
        }
    }

    /// A robot configuration.
    pub fn robot(name: &str) -> Self {
        Self::new("robots", name)
    }

    /// A live data stream.
    pub fn stream(name: &str) -> Self {
        Self::new("streams", name)
    }

    /// An arbitrary web URL, wrapped so it can travel through the scheme.
    ///
    /// The URL's host becomes the resource path and the full URL rides in an
    /// `href` query parameter, which keeps the round-trip invariant without
    /// bespoke path escaping. Returns `None` for unparseable URLs.
    pub fn external_url(raw: &str) -> Option<Self> {
        let parsed = url::Url::parse(raw).ok()?;
        let host = parsed.host_str()?.to_string();
        Some(Self::new("external", host).with_query("href", raw))
    }

    // --- Accessors ---

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn query_parameters(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// The artifact type derived from provider and path.
    pub fn artifact_type(&self) -> ArtifactType {
        determine_type(&self.provider, &self.resource_path)
    }

    /// Last path segment, used as a default human-readable name.
    pub fn display_name(&self) -> &str {
        self.resource_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.resource_path)
    }

    /// Cite key for paper URIs whose path is `papers/{citeKey}`.
    ///
    /// `doi`/`arxiv` provider URIs classify as papers but carry no cite key.
    pub fn cite_key(&self) -> Option<&str> {
        if self.artifact_type() != ArtifactType::Paper {
            return None;
        }
        let rest = self.resource_path.strip_prefix("papers/")?;
        rest.split('/').next().filter(|s| !s.is_empty())
    }

    /// Host, owner, and repo for repository URIs.
    pub fn repository_components(&self) -> Option<(&str, &str, &str)> {
        if self.artifact_type() != ArtifactType::Repository {
            return None;
        }
        let mut parts = self.resource_path.splitn(4, '/');
        let host = parts.next().filter(|s| !s.is_empty())?;
        let owner = parts.next().filter(|s| !s.is_empty())?;
        let repo = parts.next().filter(|s| !s.is_empty())?;
        Some((host, owner, repo))
    }

    /// Wildcard matching against a pattern URI string.
    ///
    /// A pattern provider of `*` matches any provider. A pattern path of
    /// exactly `*` matches any path; a pattern path ending in `/*` matches
    /// the prefix itself and anything below it; otherwise paths compare
    /// exactly. Unparseable patterns match nothing.
    pub fn matches(&self, pattern: &str) -> bool {
        let Some(pat) = Self::parse(pattern) else {
            return false;
        };
        if pat.provider != "*" && pat.provider != self.provider {
            return false;
        }
        if pat.resource_path == "*" {
            return true;
        }
        if let Some(prefix) = pat.resource_path.strip_suffix("/*") {
            return self.resource_path == prefix
                || self
                    .resource_path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'));
        }
        self.resource_path == pat.resource_path
    }
}

impl fmt::Display for ArtifactUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME_PREFIX}{}/{}", self.provider, self.resource_path)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        if !self.query.is_empty() {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in &self.query {
                serializer.append_pair(key, value);
            }
            write!(f, "?{}", serializer.finish())?;
        }
        Ok(())
    }
}
