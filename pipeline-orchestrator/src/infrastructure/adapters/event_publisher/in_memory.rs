// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory [`EventPublisher`] for tests and demos: appends to an
//! ordered, queryable buffer instead of talking to a broker.

use async_trait::async_trait;
use pipeline_domain::{DomainEvent, PipelineError, ProcessingId};
use tokio::sync::Mutex;

use crate::ports::EventPublisher;

#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<DomainEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events_of_type(&self, event_type: &str) -> Vec<DomainEvent> {
        self.events.lock().await.iter().filter(|e| e.event_type() == event_type).cloned().collect()
    }

    pub async fn events_of_aggregate(&self, aggregate_id: ProcessingId) -> Vec<DomainEvent> {
        self.events.lock().await.iter().filter(|e| e.aggregate_id == aggregate_id).cloned().collect()
    }

    pub async fn all_events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), PipelineError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_domain::{EventPayload, StageCompletedResult, VideoId};
    use std::collections::HashMap;
    use uuid::Uuid;

    #[tokio::test]
    async fn publish_preserves_emission_order() {
        let publisher = InMemoryEventPublisher::new();
        let aggregate_id = ProcessingId::generate();
        let video_id = VideoId::generate();

        for i in 0..3u64 {
            let event = DomainEvent::new(
                aggregate_id,
                video_id,
                1,
                Uuid::new_v4(),
                None,
                EventPayload::StageCompleted {
                    stage_name: format!("stage-{i}"),
                    progress_percentage: 0.0,
                    result: StageCompletedResult {
                        stage_name: format!("stage-{i}"),
                        status: "COMPLETED".into(),
                        processing_time_ms: 0,
                        metadata: HashMap::new(),
                        error_message: None,
                    },
                },
            );
            publisher.publish(&event).await.unwrap();
        }

        let events = publisher.events_of_aggregate(aggregate_id).await;
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].occurred_on <= w[1].occurred_on));
    }
}
