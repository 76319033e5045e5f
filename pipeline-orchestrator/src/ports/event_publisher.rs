// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Publisher Port
//!
//! Single operation, at-least-once semantics. A production implementation
//! partitions by `aggregate_id` so that every event for one pipeline lands
//! on one ordered partition; an in-memory implementation exists purely for
//! tests and demos. Implementations must be safe for concurrent use —
//! they are long-lived and shared across every pipeline the orchestrator
//! drives.

use async_trait::async_trait;
use pipeline_domain::{DomainEvent, PipelineError};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `event`. A publish failure is fatal to the pipeline that
    /// produced the event (§4.7): the orchestrator does not attempt to
    /// silently drop transitions.
    async fn publish(&self, event: &DomainEvent) -> Result<(), PipelineError>;
}
