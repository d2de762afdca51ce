// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Impress artifact subsystem.

use thiserror::Error;

/// The primary error type used across the Impress crates.
///
/// Resolution *outcomes* (sibling app down, unsupported host) are not errors:
/// they are carried inside `ResolvedArtifact` values. This enum covers the
/// cases that must surface to the caller.
#[derive(Debug, Error)]
pub enum ImpressError {
    /// Configuration errors (bad base URL, invalid timeout, missing fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistence gateway errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport-level resolution errors that cannot produce a degraded
    /// result (e.g. the HTTP client itself could not be constructed).
    #[error("resolution error: {message}")]
    Resolution {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The input string is not a well-formed artifact URI.
    #[error("invalid artifact URI: {0}")]
    InvalidUri(String),

    /// A lookup by id found no record.
    #[error("artifact not found: {0}")]
    NotFound(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ImpressError {
    /// Build a storage error from a plain message.
    pub fn storage(message: impl Into<String>) -> Self {
        ImpressError::Storage {
            source: message.into().into(),
        }
    }
}
