// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Checkpoint Store Port
//!
//! Persists and retrieves [`PipelineSnapshot`] blobs keyed by
//! `ProcessingId`, for crash recovery via
//! [`crate::orchestrator::PipelineOrchestrator::resume_from_checkpoint`].
//! Every entry carries a TTL, refreshed on `save`; `load` returns
//! `None` if missing or expired rather than failing, but transport
//! errors are always surfaced as a typed `PipelineError`, never
//! swallowed.

use async_trait::async_trait;
use pipeline_domain::{PipelineError, PipelineSnapshot, ProcessingId};

/// Default time-to-live for a stored checkpoint: 7 days.
pub const DEFAULT_CHECKPOINT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, pipeline_id: ProcessingId, snapshot: &PipelineSnapshot) -> Result<(), PipelineError>;

    async fn load(&self, pipeline_id: ProcessingId) -> Result<Option<PipelineSnapshot>, PipelineError>;

    async fn delete(&self, pipeline_id: ProcessingId) -> Result<(), PipelineError>;

    async fn list(&self) -> Result<Vec<ProcessingId>, PipelineError>;
}
