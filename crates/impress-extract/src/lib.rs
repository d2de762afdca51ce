// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mention extraction from conversational text.
//!
//! Scans free-form message bodies for embedded artifact references: direct
//! `impress://` URIs, bracketed cite keys, DOIs, arXiv identifiers, and git
//! host URLs. Extraction is a pure function of the text and the set of URIs
//! the conversation already knows; it performs no I/O and no persistence.

pub mod extractor;

pub use extractor::{extract_mentions, ExtractedMention, CONTEXT_RADIUS};
