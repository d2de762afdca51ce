// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `impress://` artifact URI scheme.
//!
//! Every application in the suite refers to another application's objects
//! through a compact URI of the form
//! `impress://{provider}/{resourcePath}[@{version}][?{key}={value}&...]`.
//! This crate is the single source of truth for parsing, building, and
//! matching those URIs. It is pure: no I/O, no clocks, no global state.

pub mod types;
pub mod uri;

pub use types::{determine_type, ArtifactType};
pub use uri::ArtifactUri;
