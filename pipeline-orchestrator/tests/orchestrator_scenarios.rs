// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios driving [`PipelineOrchestrator`] against the
//! in-memory adapters, each named after its counterpart in the system's
//! testable-properties list.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::{PipelineConfiguration, PipelineStatus, Stage, StageResult, VideoId};
use pipeline_orchestrator::infrastructure::adapters::checkpoint_store::InMemoryCheckpointStore;
use pipeline_orchestrator::infrastructure::adapters::event_publisher::InMemoryEventPublisher;
use pipeline_orchestrator::infrastructure::adapters::progress_notifier::LoggingProgressNotifier;
use pipeline_orchestrator::ports::CheckpointStore;
use pipeline_orchestrator::{PipelineError, PipelineOrchestrator, ProcessingId};
use serde_json::Value;
use tokio::sync::Notify;

/// A stage with a scripted, deterministic outcome: no real timing or
/// I/O, so scenario assertions aren't at the mercy of scheduler jitter.
struct ScriptedStage {
    name: String,
    dependencies: Vec<String>,
    outcome: StageResult,
}

impl ScriptedStage {
    fn completed(name: &str, dependencies: Vec<String>, output_key: &str, processing_time_ms: u64) -> Arc<dyn Stage> {
        let mut output = HashMap::new();
        output.insert(output_key.to_string(), Value::String("v".to_string()));
        Arc::new(Self {
            name: name.to_string(),
            dependencies,
            outcome: StageResult::completed(name, output, processing_time_ms),
        })
    }

    fn failed(name: &str, error_message: &str) -> Arc<dyn Stage> {
        Arc::new(Self {
            name: name.to_string(),
            dependencies: Vec::new(),
            outcome: StageResult::failed(name, error_message, 0),
        })
    }
}

#[async_trait]
impl Stage for ScriptedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn process(&self, _input_data: &HashMap<String, Value>, _config: &PipelineConfiguration) -> StageResult {
        self.outcome.clone()
    }
}

/// A stage that blocks until released, letting a test land a
/// cancellation while it is "in flight".
struct GatedStage {
    name: String,
    release: Arc<Notify>,
    entered: Arc<Notify>,
}

#[async_trait]
impl Stage for GatedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _input_data: &HashMap<String, Value>, _config: &PipelineConfiguration) -> StageResult {
        self.entered.notify_one();
        self.release.notified().await;
        StageResult::completed(self.name.clone(), HashMap::new(), 5)
    }
}

fn harness(
) -> (Arc<PipelineOrchestrator>, Arc<InMemoryEventPublisher>, Arc<InMemoryCheckpointStore>) {
    let events = Arc::new(InMemoryEventPublisher::new());
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let orchestrator = PipelineOrchestrator::new(events.clone(), checkpoints.clone(), Arc::new(LoggingProgressNotifier));
    (orchestrator, events, checkpoints)
}

#[tokio::test]
async fn happy_path_completes_all_stages_in_order() {
    let (orchestrator, events, _checkpoints) = harness();

    let stages = vec![
        ScriptedStage::completed("A", vec![], "key_A", 10),
        ScriptedStage::completed("B", vec![], "key_B", 10),
        ScriptedStage::completed("C", vec![], "key_C", 10),
    ];
    let configuration = PipelineConfiguration::new("v1", 4);

    let pipeline_id = orchestrator
        .execute_pipeline(VideoId::generate(), "s3://video.mp4", configuration, stages)
        .await
        .expect("pipeline completes");

    let recorded = events.events_of_aggregate(pipeline_id).await;
    let event_types: Vec<&str> = recorded.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        event_types,
        vec!["PipelineStarted", "StageCompleted", "StageCompleted", "StageCompleted", "PipelineCompleted"]
    );

    let completed = recorded
        .iter()
        .find(|e| e.event_type() == "PipelineCompleted")
        .expect("pipeline completed event present");
    let json = completed.to_json();
    assert_eq!(json["totalProcessingTimeMs"].as_u64(), Some(30));
}

#[tokio::test]
async fn single_failure_exhausting_retry_budget_fails_the_pipeline() {
    let (orchestrator, events, _checkpoints) = harness();

    let stages = vec![ScriptedStage::failed("A", "boom")];
    let mut configuration = PipelineConfiguration::new("v1", 1);
    configuration.max_retries = 0;

    let error = orchestrator
        .execute_pipeline(VideoId::generate(), "s3://video.mp4", configuration, stages)
        .await
        .expect_err("single attempt exhausts a zero-retry budget");

    assert!(matches!(error, PipelineError::StageExecution(_)));

    let all = events.all_events().await;
    let failed = all.iter().find(|e| e.event_type() == "StageFailed").expect("StageFailed recorded");
    let json = failed.to_json();
    assert_eq!(json["retryCount"].as_u64(), Some(1));
    assert_eq!(json["maxRetries"].as_u64(), Some(0));
    assert_eq!(json["willRetry"].as_bool(), Some(false));
    assert_eq!(json["errorMessage"].as_str().map(|s| s.contains("boom")), Some(true));
}

#[tokio::test]
async fn cancellation_mid_flight_stops_before_the_next_stage() {
    let (orchestrator, events, _checkpoints) = harness();

    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let gated: Arc<dyn Stage> = Arc::new(GatedStage {
        name: "A".to_string(),
        release: release.clone(),
        entered: entered.clone(),
    });
    let stages = vec![gated, ScriptedStage::completed("B", vec![], "key_B", 10)];
    let configuration = PipelineConfiguration::new("v1", 1);

    let (pipeline_id, join) = orchestrator
        .submit_pipeline(VideoId::generate(), "s3://video.mp4", configuration, stages)
        .await
        .expect("submission succeeds");

    entered.notified().await;
    orchestrator.cancel_pipeline(pipeline_id, "user").await.expect("cancel accepted");
    release.notify_one();

    let result = join.await.expect("task did not panic");
    assert!(result.is_ok(), "cancellation is not itself a pipeline error");

    let recorded = events.events_of_aggregate(pipeline_id).await;
    let event_types: Vec<&str> = recorded.iter().map(|e| e.event_type()).collect();
    assert_eq!(event_types, vec!["PipelineStarted", "StageCompleted", "PipelineCancelled"]);

    let cancelled = recorded.iter().find(|e| e.event_type() == "PipelineCancelled").unwrap();
    assert_eq!(cancelled.to_json()["reason"].as_str(), Some("user"));
}

#[tokio::test]
async fn resume_from_checkpoint_runs_only_remaining_stages() {
    let (orchestrator, events, checkpoints) = harness();

    let mut configuration = PipelineConfiguration::new("v1", 1);
    configuration.checkpoint_enabled = true;

    let stages = vec![
        ScriptedStage::completed("A", vec![], "key_A", 10),
        ScriptedStage::completed("B", vec![], "key_B", 10),
        ScriptedStage::failed("C", "network blip"),
    ];

    let first_run = orchestrator
        .execute_pipeline(VideoId::generate(), "s3://video.mp4", configuration, stages)
        .await;
    assert!(first_run.is_err(), "C fails on the first run");

    let pipeline_id = checkpoints
        .list()
        .await
        .expect("list succeeds")
        .into_iter()
        .next()
        .expect("a checkpoint was saved after stage B completed");

    let resume_stages = vec![
        ScriptedStage::completed("A", vec![], "key_A", 10),
        ScriptedStage::completed("B", vec![], "key_B", 10),
        ScriptedStage::completed("C", vec![], "key_C", 10),
    ];

    let resumed_id = orchestrator
        .resume_from_checkpoint(pipeline_id, resume_stages)
        .await
        .expect("resume completes C successfully");
    assert_eq!(resumed_id, pipeline_id);

    let recorded = events.events_of_aggregate(resumed_id).await;
    let event_types: Vec<&str> = recorded.iter().map(|e| e.event_type()).collect();
    assert!(!event_types.contains(&"PipelineStarted"), "resume must not re-emit PipelineStarted");
    assert_eq!(event_types, vec!["StageCompleted", "PipelineCompleted"]);
}

#[tokio::test]
async fn dependency_violation_on_resume_fails_the_dependent_stage() {
    let (orchestrator, _events, checkpoints) = harness();

    // A hand-built snapshot standing in for a corrupted or rewound
    // checkpoint: control state claims stage B is next, but A's own
    // recorded result is FAILED rather than COMPLETED.
    let mut stage_results = HashMap::new();
    stage_results.insert("A".to_string(), StageResult::failed("A", "transient", 5));

    let snapshot = pipeline_domain::PipelineSnapshot {
        id: ProcessingId::generate(),
        video_id: VideoId::generate(),
        status: PipelineStatus::Running,
        stage_order: vec!["A".to_string(), "B".to_string()],
        current_stage_index: 1,
        stage_results,
        retry_counts: HashMap::new(),
        checkpoint_data: HashMap::new(),
        configuration: PipelineConfiguration::new("v1", 1),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
        correlation_id: uuid::Uuid::new_v4(),
    };
    checkpoints.save(snapshot.id, &snapshot).await.expect("save succeeds");

    let stages = vec![
        ScriptedStage::completed("A", vec![], "key_A", 5),
        ScriptedStage::completed("B", vec!["A".to_string()], "key_B", 5),
    ];

    let error = orchestrator
        .resume_from_checkpoint(snapshot.id, stages)
        .await
        .expect_err("B's dependency on A is not met");
    assert!(matches!(error, PipelineError::DependencyNotMet(_)));
}

#[tokio::test]
async fn checkpoint_save_failure_is_logged_and_non_fatal() {
    struct FailingCheckpointStore {
        inner: InMemoryCheckpointStore,
    }

    #[async_trait]
    impl CheckpointStore for FailingCheckpointStore {
        async fn save(&self, _pipeline_id: ProcessingId, _snapshot: &pipeline_domain::PipelineSnapshot) -> Result<(), PipelineError> {
            Err(PipelineError::checkpoint_io("simulated transport failure"))
        }

        async fn load(&self, pipeline_id: ProcessingId) -> Result<Option<pipeline_domain::PipelineSnapshot>, PipelineError> {
            self.inner.load(pipeline_id).await
        }

        async fn delete(&self, pipeline_id: ProcessingId) -> Result<(), PipelineError> {
            self.inner.delete(pipeline_id).await
        }

        async fn list(&self) -> Result<Vec<ProcessingId>, PipelineError> {
            self.inner.list().await
        }
    }

    let events = Arc::new(InMemoryEventPublisher::new());
    let checkpoints = Arc::new(FailingCheckpointStore {
        inner: InMemoryCheckpointStore::new(),
    });
    let orchestrator = PipelineOrchestrator::new(events.clone(), checkpoints, Arc::new(LoggingProgressNotifier));

    let mut configuration = PipelineConfiguration::new("v1", 1);
    configuration.checkpoint_enabled = true;
    let stages = vec![
        ScriptedStage::completed("A", vec![], "key_A", 5),
        ScriptedStage::completed("B", vec![], "key_B", 5),
    ];

    let pipeline_id = orchestrator
        .execute_pipeline(VideoId::generate(), "s3://video.mp4", configuration, stages)
        .await
        .expect("checkpoint failures do not fail the pipeline");

    let recorded = events.events_of_aggregate(pipeline_id).await;
    let event_types: Vec<&str> = recorded.iter().map(|e| e.event_type()).collect();
    assert_eq!(event_types, vec!["PipelineStarted", "StageCompleted", "StageCompleted", "PipelineCompleted"]);
}

#[tokio::test]
async fn empty_stage_list_auto_completes_with_zero_progress_defined() {
    let (orchestrator, _events, _checkpoints) = harness();
    let configuration = PipelineConfiguration::new("v1", 1);

    let pipeline_id = orchestrator
        .execute_pipeline(VideoId::generate(), "s3://video.mp4", configuration, Vec::new())
        .await
        .expect("empty stage list completes immediately");

    assert!(orchestrator.get_pipeline_status(pipeline_id).await.is_none(), "terminal pipelines leave the active set");
}
