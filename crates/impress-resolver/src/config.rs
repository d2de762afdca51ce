// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolver configuration: sibling app endpoints and timeouts.

use serde::{Deserialize, Serialize};

/// Well-known local port of the reference manager (imbib).
pub const IMBIB_PORT: u16 = 8765;

/// Well-known local port of the writing tool (imprint).
pub const IMPRINT_PORT: u16 = 8766;

fn default_imbib_base_url() -> String {
    format!("http://127.0.0.1:{IMBIB_PORT}")
}

fn default_imprint_base_url() -> String {
    format!("http://127.0.0.1:{IMPRINT_PORT}")
}

fn default_github_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

/// Endpoints and timeout for artifact resolution.
///
/// Sibling apps listen on fixed loopback ports; the base URLs are
/// overridable for tests and unusual deployments. Plain serde with
/// field-level defaults, so any layered config loader can deserialize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL of the reference manager's local HTTP API.
    #[serde(default = "default_imbib_base_url")]
    pub imbib_base_url: String,

    /// Base URL of the writing tool's local HTTP API.
    #[serde(default = "default_imprint_base_url")]
    pub imprint_base_url: String,

    /// Base URL of the GitHub REST API.
    #[serde(default = "default_github_base_url")]
    pub github_base_url: String,

    /// Per-request timeout; a timed-out call degrades to an unresolved
    /// result exactly like any other failure.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            imbib_base_url: default_imbib_base_url(),
            imprint_base_url: default_imprint_base_url(),
            github_base_url: default_github_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
