// SPDX-FileCopyrightText: 2026 Impress Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the artifact subsystem and its environment.

pub mod gateway;

pub use gateway::ArtifactGateway;
