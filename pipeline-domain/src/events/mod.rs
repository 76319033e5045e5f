// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Events
//!
//! A `Pipeline` aggregate never performs I/O itself; instead every state
//! transition appends a [`DomainEvent`] to its pending list, which the
//! orchestrator drains and publishes after the mutation returns. This
//! keeps the aggregate synchronous and trivially testable while still
//! giving the infrastructure layer an append-only history of what
//! happened.
//!
//! Each event carries a common envelope (identity, aggregate, version,
//! timestamps, causality) plus a payload specific to its kind. Wire
//! consumers see a single flat JSON object per event: [`DomainEvent::to_json`]
//! merges the envelope and the payload into one map, matching the shape
//! produced by the original event-sourcing implementation this system
//! reimplements.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::value_objects::{ProcessingId, VideoId};

/// The specific thing that happened to a `Pipeline` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    #[serde(rename = "PipelineStarted", rename_all = "camelCase")]
    PipelineStarted {
        total_stages: u32,
        configuration: HashMap<String, Value>,
    },

    #[serde(rename = "StageCompleted", rename_all = "camelCase")]
    StageCompleted {
        stage_name: String,
        progress_percentage: f64,
        result: StageCompletedResult,
    },

    #[serde(rename = "StageFailed", rename_all = "camelCase")]
    StageFailed {
        stage_name: String,
        error_message: String,
        retry_count: u32,
        max_retries: u32,
        will_retry: bool,
    },

    #[serde(rename = "PipelineCompleted", rename_all = "camelCase")]
    PipelineCompleted {
        total_processing_time_ms: u64,
        stage_results: HashMap<String, StageSummary>,
    },

    #[serde(rename = "PipelineCancelled", rename_all = "camelCase")]
    PipelineCancelled { reason: String, stage_at_cancellation: Option<String> },
}

/// Condensed per-stage summary carried by `PipelineCompleted`, omitting
/// bulky `output_data` that downstream consumers can fetch separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub status: String,
    pub processing_time_ms: u64,
    pub metadata: HashMap<String, Value>,
}

/// Nested `result` payload of a `StageCompleted` event, matching the
/// wire shape consumers build against: `event.result.status`,
/// `event.result.processingTimeMs`, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCompletedResult {
    pub stage_name: String,
    pub status: String,
    pub processing_time_ms: u64,
    pub metadata: HashMap<String, Value>,
    pub error_message: Option<String>,
}

impl EventPayload {
    /// Stable event-type discriminator, used as the wire `event_type`
    /// field and for topic/routing decisions in infrastructure adapters.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PipelineStarted { .. } => "PipelineStarted",
            Self::StageCompleted { .. } => "StageCompleted",
            Self::StageFailed { .. } => "StageFailed",
            Self::PipelineCompleted { .. } => "PipelineCompleted",
            Self::PipelineCancelled { .. } => "PipelineCancelled",
        }
    }
}

/// An immutable fact about something that happened to a pipeline.
///
/// `aggregate_id` doubles as the partition key for ordered delivery:
/// infrastructure adapters must preserve emission order for events
/// sharing an `aggregate_id`, and make no ordering promise across
/// distinct aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    pub aggregate_id: ProcessingId,
    pub video_id: VideoId,
    /// Event schema version, not an aggregate revision counter. Fixed
    /// at 1 for every event this system emits today.
    pub version: u64,
    pub occurred_on: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,
    pub payload: EventPayload,
}

impl DomainEvent {
    /// Constructs a new event, generating a fresh `event_id`.
    pub fn new(
        aggregate_id: ProcessingId,
        video_id: VideoId,
        version: u64,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            video_id,
            version,
            occurred_on: Utc::now(),
            correlation_id,
            causation_id,
            payload,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    /// Flattens the envelope and payload into a single JSON object
    /// suitable for publication on an event bus.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("eventId".into(), Value::String(self.event_id.to_string()));
        map.insert("eventType".into(), Value::String(self.event_type().to_string()));
        map.insert("pipelineId".into(), Value::String(self.aggregate_id.as_str()));
        map.insert("videoId".into(), Value::String(self.video_id.as_str()));
        map.insert("version".into(), Value::from(self.version));
        map.insert("occurredOn".into(), Value::String(self.occurred_on.to_rfc3339()));
        map.insert("correlationId".into(), Value::String(self.correlation_id.to_string()));
        map.insert(
            "causationId".into(),
            match self.causation_id {
                Some(id) => Value::String(id.to_string()),
                None => Value::Null,
            },
        );

        if let Ok(Value::Object(payload_map)) = serde_json::to_value(&self.payload) {
            for (key, value) in payload_map {
                if key != "event_type" {
                    map.insert(key, value);
                }
            }
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_json_flattens_envelope_and_payload() {
        let event = DomainEvent::new(
            ProcessingId::generate(),
            VideoId::generate(),
            1,
            Uuid::new_v4(),
            None,
            EventPayload::StageCompleted {
                stage_name: "transcode".into(),
                progress_percentage: 33.33,
                result: StageCompletedResult {
                    stage_name: "transcode".into(),
                    status: "COMPLETED".into(),
                    processing_time_ms: 42,
                    metadata: HashMap::new(),
                    error_message: None,
                },
            },
        );

        let json = event.to_json();
        assert_eq!(json["eventType"], "StageCompleted");
        assert_eq!(json["stageName"], "transcode");
        assert_eq!(json["version"], 1);
        assert_eq!(json["result"]["status"], "COMPLETED");
        assert_eq!(json["result"]["processingTimeMs"], 42);
        assert!(json["causationId"].is_null());
    }
}
