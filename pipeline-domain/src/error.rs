// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Errors
//!
//! All failure modes the `Pipeline` aggregate and its collaborators can
//! raise. Each variant corresponds to one of the named error kinds in the
//! orchestrator's error taxonomy: state-machine violations
//! (`InvalidState`, `IncompleteStage`, `IncompatibleStages`), lookup
//! failures (`UnknownStage`), stage execution (`StageExecution`,
//! `DependencyNotMet`), and infrastructure ports (`EventPublish`,
//! `CheckpointIo`, `Timeout`).
//!
//! ## Recoverability
//!
//! [`PipelineError::is_recoverable`] flags errors a caller may reasonably
//! retry (timeouts, checkpoint I/O); [`PipelineError::is_state_violation`]
//! flags programming-bug-shaped errors that should never be retried blindly.

use thiserror::Error;

/// Domain-specific errors for the pipeline orchestrator.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// An operation was attempted that is forbidden in the aggregate's
    /// current state (e.g. `start()` on a non-`PENDING` pipeline).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A stage name was referenced that is not declared on the pipeline.
    #[error("unknown stage: {0}")]
    UnknownStage(String),

    /// `completePipeline` was invoked with a missing or non-`COMPLETED`
    /// stage.
    #[error("incomplete stage: {0}")]
    IncompleteStage(String),

    /// `restore` was called with a stage-handle list that does not match
    /// the snapshot's declared stage order.
    #[error("incompatible stages: {0}")]
    IncompatibleStages(String),

    /// A stage body raised or returned a `FAILED` result.
    #[error("stage execution failed: {0}")]
    StageExecution(String),

    /// A stage was reached while a declared dependency has not
    /// `COMPLETED`.
    #[error("dependencies not met for stage: {0}")]
    DependencyNotMet(String),

    /// The event bus rejected a publish; fatal to the pipeline.
    #[error("event publish failed: {0}")]
    EventPublish(String),

    /// The checkpoint store failed; non-fatal to the pipeline but
    /// surfaced to `save`/`load`/`delete`/`list` callers.
    #[error("checkpoint I/O failed: {0}")]
    CheckpointIo(String),

    /// The pipeline exceeded `configuration.timeout_seconds`.
    #[error("pipeline timed out: {0}")]
    Timeout(String),
}

impl PipelineError {
    /// Creates an [`PipelineError::InvalidState`] error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates an [`PipelineError::UnknownStage`] error.
    pub fn unknown_stage(msg: impl Into<String>) -> Self {
        Self::UnknownStage(msg.into())
    }

    /// Creates an [`PipelineError::IncompleteStage`] error.
    pub fn incomplete_stage(msg: impl Into<String>) -> Self {
        Self::IncompleteStage(msg.into())
    }

    /// Creates an [`PipelineError::IncompatibleStages`] error.
    pub fn incompatible_stages(msg: impl Into<String>) -> Self {
        Self::IncompatibleStages(msg.into())
    }

    /// Creates a [`PipelineError::StageExecution`] error.
    pub fn stage_execution(msg: impl Into<String>) -> Self {
        Self::StageExecution(msg.into())
    }

    /// Creates a [`PipelineError::DependencyNotMet`] error.
    pub fn dependency_not_met(msg: impl Into<String>) -> Self {
        Self::DependencyNotMet(msg.into())
    }

    /// Creates an [`PipelineError::EventPublish`] error.
    pub fn event_publish(msg: impl Into<String>) -> Self {
        Self::EventPublish(msg.into())
    }

    /// Creates a [`PipelineError::CheckpointIo`] error.
    pub fn checkpoint_io(msg: impl Into<String>) -> Self {
        Self::CheckpointIo(msg.into())
    }

    /// Creates a [`PipelineError::Timeout`] error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Whether a caller may reasonably retry the operation that produced
    /// this error (transient infrastructure conditions).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CheckpointIo(_) | Self::Timeout(_))
    }

    /// Whether this error indicates a state-machine invariant violation
    /// rather than an environmental failure.
    pub fn is_state_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidState(_) | Self::IncompleteStage(_) | Self::IncompatibleStages(_) | Self::UnknownStage(_)
        )
    }
}
