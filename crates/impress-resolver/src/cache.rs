// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory TTL cache for resolution outcomes.
//!
//! Keyed by the literal URI string. Both successes and failures live under
//! the same expiration window: a short negative cache keeps a briefly
//! unavailable sibling app from being hammered by UI re-renders.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::data::ResolvedArtifact;

/// Expiration window for cached outcomes.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub(crate) struct ResolutionCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

struct CacheEntry {
    artifact: ResolvedArtifact,
    inserted_at: Instant,
}

impl ResolutionCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`, or `None` if absent or expired.
    pub(crate) fn get(&self, key: &str) -> Option<ResolvedArtifact> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.artifact.clone())
    }

    pub(crate) fn insert(&mut self, key: String, artifact: ResolvedArtifact) {
        // Expired entries are dropped lazily; the key space is small (tens
        // of URIs per window), so no background sweep is needed.
        self.entries.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
        self.entries.insert(
            key,
            CacheEntry {
                artifact,
                inserted_at: Instant::now(),
            },
        );
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
