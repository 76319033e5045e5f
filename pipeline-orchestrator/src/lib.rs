// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator
//!
//! Drives [`pipeline_domain::Pipeline`] aggregates to completion against
//! real infrastructure, following Clean Architecture's dependency
//! direction: this crate depends on `pipeline-domain`, never the
//! reverse.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     pipeline-bootstrap                      │
//! │           (CLI, process entry point, wiring)                │
//! └───────────────────────────┬───────────────────────────────┘
//! ┌───────────────────────────┴───────────────────────────────┐
//! │                   pipeline-orchestrator                     │
//! │  orchestrator::PipelineOrchestrator  │  ports (traits)       │
//! │  infrastructure::adapters (concrete event bus, checkpoint   │
//! │  store, progress notifier implementations)                  │
//! └───────────────────────────┬───────────────────────────────┘
//! ┌───────────────────────────┴───────────────────────────────┐
//! │                     pipeline-domain                          │
//! │     Pipeline aggregate, value objects, domain events        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ports and adapters
//!
//! [`ports::EventPublisher`], [`ports::CheckpointStore`], and
//! [`ports::ProgressNotifier`] are the I/O-bound seams the domain
//! aggregate never touches directly. [`infrastructure::adapters`]
//! supplies an in-memory implementation of each for tests and demos,
//! a `redis-backend`-gated Redis checkpoint store, and a
//! `ws-backend`-gated WebSocket progress notifier.
//!
//! ## Orchestrator
//!
//! [`orchestrator::PipelineOrchestrator`] owns the active-pipeline
//! registry and the main/resume/cancel/status algorithms, including the
//! flush ordering contract (publish events, clear, checkpoint, notify)
//! and per-pipeline timeout-to-cancellation.

pub mod infrastructure;
pub mod orchestrator;
pub mod ports;

pub use orchestrator::{PipelineOrchestrator, PipelineStatusView, StageResultView};
pub use ports::{CheckpointStore, EventPublisher, ProgressMessage, ProgressMessageType, ProgressNotifier};

pub use pipeline_domain::{
    DomainEvent, EventPayload, Pipeline, PipelineConfiguration, PipelineError, PipelineSnapshot, PipelineStatus, ProcessingId, Stage, StageBody,
    StageContract, StageHarness, StageResult, StageStatus, StageSummary, VideoId,
};
