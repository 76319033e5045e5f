// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Result
//!
//! The immutable outcome of one [`crate::Stage::process`] invocation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a single stage within a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl StageStatus {
    /// Stable string discriminator, matching the wire format used in
    /// events and checkpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }
}

/// Immutable record of what happened when a stage ran.
///
/// A successful result must include every key the next stage is
/// contractually promised in `output_data`; this is a contract between
/// stages that the orchestrator does not itself validate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage_name: String,
    pub status: StageStatus,
    #[serde(default)]
    pub output_data: HashMap<String, Value>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub checkpoint_data: Option<HashMap<String, Value>>,
}

impl StageResult {
    /// Builds a `COMPLETED` result.
    pub fn completed(stage_name: impl Into<String>, output_data: HashMap<String, Value>, processing_time_ms: u64) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Completed,
            output_data,
            metadata: HashMap::new(),
            error_message: None,
            processing_time_ms,
            checkpoint_data: None,
        }
    }

    /// Builds a `FAILED` result carrying the given error message.
    pub fn failed(stage_name: impl Into<String>, error_message: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            stage_name: stage_name.into(),
            status: StageStatus::Failed,
            output_data: HashMap::new(),
            metadata: HashMap::new(),
            error_message: Some(error_message.into()),
            processing_time_ms,
            checkpoint_data: None,
        }
    }

    /// Attaches stage metadata, returning `self` for chaining.
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attaches checkpoint data, returning `self` for chaining.
    pub fn with_checkpoint_data(mut self, checkpoint_data: HashMap<String, Value>) -> Self {
        self.checkpoint_data = Some(checkpoint_data);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.status == StageStatus::Failed
    }
}
