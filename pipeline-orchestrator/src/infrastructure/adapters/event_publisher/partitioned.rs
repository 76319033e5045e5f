// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Partitioned Event Publisher
//!
//! Models the ordering and naming contract of a broker-backed publisher
//! (§4.4) without depending on an external broker: events are routed by
//! `aggregate_id` to a dedicated per-partition lock, so that all events
//! for one pipeline reach the inner sink in the order `publish` was
//! called for them, one at a time. Across pipelines, delivery is
//! concurrent and unordered, matching §5's "per-partition order only"
//! guarantee.
//!
//! `publish` awaits the inner `sink`'s own `publish` call directly and
//! returns its result — a sink failure is a `publish` failure here too,
//! per §4.7's "event-publish failure is fatal" contract. There is no
//! background task and no channel standing between the caller and the
//! sink: the per-partition lock provides ordering without sacrificing
//! error propagation.
//!
//! Topic naming follows `<prefix>-<lowercased event type>`, matching
//! the event-bus contract in §6.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::{DomainEvent, PipelineError};
use tokio::sync::Mutex;

use crate::ports::EventPublisher;

struct Partition {
    lock: Arc<Mutex<()>>,
}

/// Broker-shaped event publisher backed by an in-process per-aggregate
/// serialization lock, forwarding to an inner `sink` (typically
/// [`super::in_memory::InMemoryEventPublisher`] or another
/// `EventPublisher`).
pub struct PartitionedEventPublisher<S: EventPublisher + 'static> {
    topic_prefix: String,
    partitions: Mutex<HashMap<String, Partition>>,
    sink: Arc<S>,
}

impl<S: EventPublisher + 'static> PartitionedEventPublisher<S> {
    pub fn new(topic_prefix: impl Into<String>, sink: Arc<S>) -> Self {
        Self {
            topic_prefix: topic_prefix.into(),
            partitions: Mutex::new(HashMap::new()),
            sink,
        }
    }

    fn topic_for(&self, event_type: &str) -> String {
        format!("{}-{}", self.topic_prefix, event_type.to_lowercase())
    }

    async fn partition_lock(&self, partition_key: &str) -> Arc<Mutex<()>> {
        let mut partitions = self.partitions.lock().await;
        if let Some(partition) = partitions.get(partition_key) {
            return Arc::clone(&partition.lock);
        }

        let lock = Arc::new(Mutex::new(()));
        partitions.insert(partition_key.to_string(), Partition { lock: Arc::clone(&lock) });
        lock
    }
}

#[async_trait]
impl<S: EventPublisher + 'static> EventPublisher for PartitionedEventPublisher<S> {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PipelineError> {
        let partition_key = event.aggregate_id.as_str();
        let topic = self.topic_for(event.event_type());
        tracing::debug!(topic = %topic, partition = %partition_key, event_id = %event.event_id, "routing event to partition");

        let lock = self.partition_lock(&partition_key).await;
        let _guard = lock.lock().await;
        self.sink.publish(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::event_publisher::in_memory::InMemoryEventPublisher;
    use pipeline_domain::{EventPayload, ProcessingId, StageCompletedResult, VideoId};
    use std::collections::HashMap as StdHashMap;
    use uuid::Uuid;

    fn stage_completed_event(aggregate_id: ProcessingId, video_id: VideoId, stage_name: String) -> DomainEvent {
        DomainEvent::new(
            aggregate_id,
            video_id,
            1,
            Uuid::new_v4(),
            None,
            EventPayload::StageCompleted {
                stage_name: stage_name.clone(),
                progress_percentage: 0.0,
                result: StageCompletedResult {
                    stage_name,
                    status: "COMPLETED".into(),
                    processing_time_ms: 0,
                    metadata: StdHashMap::new(),
                    error_message: None,
                },
            },
        )
    }

    #[tokio::test]
    async fn events_for_one_aggregate_preserve_order_at_the_sink() {
        let sink = Arc::new(InMemoryEventPublisher::new());
        let publisher = PartitionedEventPublisher::new("pipeline", Arc::clone(&sink));

        let aggregate_id = ProcessingId::generate();
        let video_id = VideoId::generate();

        for i in 0..5u64 {
            let event = stage_completed_event(aggregate_id, video_id, format!("stage-{i}"));
            publisher.publish(&event).await.unwrap();
        }

        let events = sink.events_of_aggregate(aggregate_id).await;
        assert_eq!(events.len(), 5);
        for (i, event) in events.iter().enumerate() {
            match &event.payload {
                EventPayload::StageCompleted { stage_name, .. } => assert_eq!(stage_name, &format!("stage-{i}")),
                _ => panic!("unexpected payload"),
            }
        }
    }

    struct FailingSink;

    #[async_trait]
    impl EventPublisher for FailingSink {
        async fn publish(&self, _event: &DomainEvent) -> Result<(), PipelineError> {
            Err(PipelineError::event_publish("sink unavailable"))
        }
    }

    #[tokio::test]
    async fn sink_failure_propagates_to_the_caller() {
        let publisher = PartitionedEventPublisher::new("pipeline", Arc::new(FailingSink));

        let event = stage_completed_event(ProcessingId::generate(), VideoId::generate(), "stage-0".into());

        let result = publisher.publish(&event).await;
        assert!(matches!(result, Err(PipelineError::EventPublish(_))));
    }
}
