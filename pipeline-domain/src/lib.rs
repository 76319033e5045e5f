// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Domain
//!
//! The core business rules of a video-processing pipeline: what a
//! pipeline is, what states it can be in, and what it means to start,
//! advance, fail, cancel, checkpoint, and resume one. This crate has no
//! I/O and no async runtime dependency beyond `async-trait`, which
//! exists solely to let `Stage::process` be implemented by async code
//! in the orchestrator layer.
//!
//! ## Domain-Driven Design concepts
//!
//! ### Aggregate root
//! [`aggregates::Pipeline`] is the single consistency boundary in this
//! domain. Every state transition is one of its own methods; nothing
//! outside the aggregate mutates its fields directly.
//!
//! **Key characteristics:**
//! - Has a stable identity (`ProcessingId`) that persists across state
//!   changes.
//! - Validates before mutating: an operation either fully applies or is
//!   rejected with a `PipelineError`, never partially applies.
//! - Emits [`events::DomainEvent`]s rather than performing I/O; the
//!   orchestrator drains and publishes them.
//!
//! ### Value objects
//! [`value_objects::VideoId`] and [`value_objects::ProcessingId`] are
//! immutable, UUID-backed identifiers with equality and hashing by
//! value.
//!
//! ### Entities
//! [`entities::StageResult`], [`entities::PipelineConfiguration`], and
//! the [`entities::StageStatus`] / [`entities::PipelineStatus`]
//! enumerations describe pipeline and stage state without themselves
//! carrying identity.
//!
//! ### Domain services
//! [`services::Stage`] is the contract a stage implementation fulfills;
//! the aggregate owns only a stage's name and declared dependencies
//! ([`aggregates::StageContract`]), never its body or resources.
//!
//! ### Domain events
//! [`events::DomainEvent`] carries a fixed envelope (identity,
//! aggregate, schema version, timestamp, causality) plus one of five
//! payload variants. Serialization flattens envelope and payload into a
//! single JSON object ([`events::DomainEvent::to_json`]).
//!
//! ## Error handling
//!
//! [`PipelineError`] is the single error type this crate raises,
//! covering state-machine violations, lookup failures, and the
//! infrastructure-facing error kinds the orchestrator surfaces
//! (event-publish, checkpoint I/O, timeout).

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod services;
pub mod value_objects;

pub use aggregates::{Pipeline, PipelineSnapshot, StageContract};
pub use entities::{PipelineConfiguration, PipelineStatus, StageResult, StageStatus};
pub use error::PipelineError;
pub use events::{DomainEvent, EventPayload, StageCompletedResult, StageSummary};
pub use services::{Stage, StageBody, StageHarness};
pub use value_objects::{ProcessingId, VideoId};
