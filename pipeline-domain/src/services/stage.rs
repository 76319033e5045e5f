// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Interface
//!
//! This module defines the interface a pipeline stage must implement.
//!
//! ## Design Principles
//!
//! - **Async-first**: stages perform I/O (model inference, storage,
//!   network calls) and are scheduled cooperatively on the tokio runtime.
//! - **Pure contract**: a `Stage` never raises — failures come back as a
//!   `StageResult` with `status = FAILED`, matching the orchestrator's
//!   no-exception-across-the-boundary rule.
//! - **Declared dependencies**: a stage states its own upstream stage
//!   names; the aggregate is responsible for enforcing them before
//!   dispatch.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{PipelineConfiguration, StageResult};

/// A named unit of work within a pipeline.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to support concurrent
/// scheduling across multiple in-flight pipelines.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Unique name identifying this stage within a pipeline.
    fn name(&self) -> &str;

    /// Names of stages that must have reached `COMPLETED` before this
    /// stage may run.
    fn dependencies(&self) -> &[String];

    /// Runs the stage body against the accumulated `input_data` and the
    /// pipeline's configuration, returning a `StageResult` regardless of
    /// success or failure.
    async fn process(&self, input_data: &HashMap<String, Value>, config: &PipelineConfiguration) -> StageResult;
}
