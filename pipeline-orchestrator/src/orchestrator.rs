// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator
//!
//! Drives one [`Pipeline`] aggregate from construction to a terminal
//! state, maintaining the flush ordering contract (publish events,
//! clear, checkpoint, notify) and the active-pipeline registry that
//! backs status queries and cancellation.
//!
//! The aggregate itself performs no I/O; every suspension point here —
//! `Stage::process`, `EventPublisher::publish`,
//! `CheckpointStore::save`, `ProgressNotifier::notify_*` — is owned by
//! this module. A single pipeline is driven by a single logical task;
//! `Arc<PipelineOrchestrator>` may drive many pipelines concurrently,
//! each under its own per-pipeline lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use pipeline_domain::{
    Pipeline, PipelineConfiguration, PipelineError, PipelineStatus, ProcessingId, Stage, StageContract, StageStatus, VideoId,
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::infrastructure::metrics::PipelineMetrics;
use crate::ports::{CheckpointStore, EventPublisher, ProgressNotifier};

/// A read-only view of a pipeline's current state, returned by
/// [`PipelineOrchestrator::get_pipeline_status`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStatusView {
    pub pipeline_id: ProcessingId,
    pub video_id: VideoId,
    pub status: PipelineStatus,
    pub progress_percentage: f64,
    pub current_stage: Option<String>,
    pub stage_results: HashMap<String, StageResultView>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StageResultView {
    pub status: StageStatus,
    pub processing_time_ms: u64,
    pub error_message: Option<String>,
}

type PipelineHandle = Arc<Mutex<Pipeline>>;

pub struct PipelineOrchestrator {
    event_publisher: Arc<dyn EventPublisher>,
    checkpoint_store: Arc<dyn CheckpointStore>,
    progress_notifier: Arc<dyn ProgressNotifier>,
    metrics: Option<Arc<PipelineMetrics>>,
    active: Mutex<HashMap<ProcessingId, PipelineHandle>>,
}

impl PipelineOrchestrator {
    pub fn new(
        event_publisher: Arc<dyn EventPublisher>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        progress_notifier: Arc<dyn ProgressNotifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            event_publisher,
            checkpoint_store,
            progress_notifier,
            metrics: None,
            active: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_metrics(
        event_publisher: Arc<dyn EventPublisher>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        progress_notifier: Arc<dyn ProgressNotifier>,
        metrics: Arc<PipelineMetrics>,
    ) -> Arc<Self> {
        Arc::new(Self {
            event_publisher,
            checkpoint_store,
            progress_notifier,
            metrics: Some(metrics),
            active: Mutex::new(HashMap::new()),
        })
    }

    /// Constructs and starts a pipeline for `video_id`, registers it in
    /// the active set, and spawns its driving loop in the background —
    /// matching the request-submission endpoint's "returns immediately"
    /// contract. Callers that want to observe the outcome can `.await`
    /// the returned handle; callers that only want to poll status or
    /// cancel need just the id.
    pub async fn submit_pipeline(
        self: &Arc<Self>,
        video_id: VideoId,
        input_ref: impl Into<String>,
        configuration: PipelineConfiguration,
        stages: Vec<Arc<dyn Stage>>,
    ) -> Result<(ProcessingId, tokio::task::JoinHandle<Result<(), PipelineError>>), PipelineError> {
        let contracts: Vec<StageContract> = stages
            .iter()
            .map(|s| StageContract::new(s.name(), s.dependencies().to_vec()))
            .collect();

        let mut pipeline = Pipeline::create_for_video(video_id, contracts, configuration.clone());
        let pipeline_id = pipeline.id();

        pipeline.start()?;
        self.flush(&mut pipeline).await?;

        let stage_order = pipeline.stage_order().to_vec();
        let stage_map: HashMap<String, Arc<dyn Stage>> = stages.into_iter().map(|s| (s.name().to_string(), s)).collect();

        let mut input_data = HashMap::new();
        input_data.insert("video_path".to_string(), Value::String(input_ref.into()));

        let handle: PipelineHandle = Arc::new(Mutex::new(pipeline));
        self.active.lock().await.insert(pipeline_id, Arc::clone(&handle));

        let timeout_seconds = configuration.timeout_seconds;
        let orchestrator = Arc::clone(self);
        let join = tokio::spawn(async move {
            let result = orchestrator.run_with_timeout(pipeline_id, timeout_seconds, &handle, &stage_order, &stage_map, input_data).await;
            orchestrator.active.lock().await.remove(&pipeline_id);
            result
        });

        Ok((pipeline_id, join))
    }

    /// Convenience wrapper over [`Self::submit_pipeline`] for callers
    /// that just want to drive one pipeline to completion and get its
    /// id back.
    pub async fn execute_pipeline(
        self: &Arc<Self>,
        video_id: VideoId,
        input_ref: impl Into<String>,
        configuration: PipelineConfiguration,
        stages: Vec<Arc<dyn Stage>>,
    ) -> Result<ProcessingId, PipelineError> {
        let (pipeline_id, join) = self.submit_pipeline(video_id, input_ref, configuration, stages).await?;
        join.await
            .map_err(|error| PipelineError::invalid_state(format!("pipeline task did not run to completion: {error}")))??;
        Ok(pipeline_id)
    }

    /// Restores a pipeline from its last checkpoint, registers it, and
    /// spawns its driving loop in the background from the point it left
    /// off. A checkpoint already showing every stage complete resolves
    /// the returned handle immediately with no stages re-run.
    pub async fn resume_pipeline(
        self: &Arc<Self>,
        pipeline_id: ProcessingId,
        stages: Vec<Arc<dyn Stage>>,
    ) -> Result<(ProcessingId, tokio::task::JoinHandle<Result<(), PipelineError>>), PipelineError> {
        let snapshot = self
            .checkpoint_store
            .load(pipeline_id)
            .await?
            .ok_or_else(|| PipelineError::checkpoint_io(format!("no checkpoint stored for pipeline {pipeline_id}")))?;

        let contracts: Vec<StageContract> = stages
            .iter()
            .map(|s| StageContract::new(s.name(), s.dependencies().to_vec()))
            .collect();

        let pipeline = Pipeline::restore(snapshot, contracts)?;
        let resolved_id = pipeline.id();

        if pipeline.current_stage().is_none() {
            return Ok((resolved_id, tokio::spawn(async { Ok(()) })));
        }

        let input_data = pipeline.reconstruct_input_data();
        let stage_order = pipeline.stage_order().to_vec();
        let timeout_seconds = pipeline.configuration().timeout_seconds;
        let stage_map: HashMap<String, Arc<dyn Stage>> = stages.into_iter().map(|s| (s.name().to_string(), s)).collect();

        let handle: PipelineHandle = Arc::new(Mutex::new(pipeline));
        self.active.lock().await.insert(resolved_id, Arc::clone(&handle));

        let orchestrator = Arc::clone(self);
        let join = tokio::spawn(async move {
            let result = orchestrator.run_with_timeout(resolved_id, timeout_seconds, &handle, &stage_order, &stage_map, input_data).await;
            orchestrator.active.lock().await.remove(&resolved_id);
            result
        });

        Ok((resolved_id, join))
    }

    /// Convenience wrapper over [`Self::resume_pipeline`] that awaits
    /// the driving loop to completion.
    pub async fn resume_from_checkpoint(self: &Arc<Self>, pipeline_id: ProcessingId, stages: Vec<Arc<dyn Stage>>) -> Result<ProcessingId, PipelineError> {
        let (resolved_id, join) = self.resume_pipeline(pipeline_id, stages).await?;
        join.await
            .map_err(|error| PipelineError::invalid_state(format!("pipeline task did not run to completion: {error}")))??;
        Ok(resolved_id)
    }

    /// Requests cancellation of `pipeline_id`. Safe to call at any
    /// time; the driving loop observes the transition at its next
    /// iteration boundary, after any stage currently in flight returns.
    pub async fn cancel_pipeline(&self, pipeline_id: ProcessingId, reason: impl Into<String>) -> Result<(), PipelineError> {
        let handle = {
            let active = self.active.lock().await;
            active.get(&pipeline_id).cloned()
        };

        let Some(handle) = handle else {
            return Err(PipelineError::unknown_stage(format!("no active pipeline {pipeline_id}")));
        };

        let mut pipeline = handle.lock().await;
        pipeline.cancel(reason)?;
        self.flush(&mut pipeline).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_pipeline_cancelled(pipeline.current_stage().unwrap_or("none"));
        }

        Ok(())
    }

    /// Returns a snapshot view of `pipeline_id`'s current state, or
    /// `None` if it is not in the active set.
    pub async fn get_pipeline_status(&self, pipeline_id: ProcessingId) -> Option<PipelineStatusView> {
        let handle = {
            let active = self.active.lock().await;
            active.get(&pipeline_id).cloned()
        }?;

        let pipeline = handle.lock().await;
        Some(PipelineStatusView {
            pipeline_id: pipeline.id(),
            video_id: pipeline.video_id(),
            status: pipeline.status(),
            progress_percentage: pipeline.progress_percentage(),
            current_stage: pipeline.current_stage().map(str::to_string),
            stage_results: pipeline
                .stage_results()
                .iter()
                .map(|(name, result)| {
                    (
                        name.clone(),
                        StageResultView {
                            status: result.status,
                            processing_time_ms: result.processing_time_ms,
                            error_message: result.error_message.clone(),
                        },
                    )
                })
                .collect(),
        })
    }

    async fn run_with_timeout(
        self: &Arc<Self>,
        pipeline_id: ProcessingId,
        timeout_seconds: u64,
        handle: &PipelineHandle,
        stage_order: &[String],
        stage_map: &HashMap<String, Arc<dyn Stage>>,
        input_data: HashMap<String, Value>,
    ) -> Result<(), PipelineError> {
        let orchestrator = Arc::clone(self);
        let timeout_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(timeout_seconds)).await;
            if let Err(error) = orchestrator.cancel_pipeline(pipeline_id, "timeout").await {
                tracing::debug!(%error, "timeout cancellation raced pipeline completion");
            }
        });

        let result = self.drive(handle, stage_order, stage_map, input_data).await;
        timeout_task.abort();
        result
    }

    /// Drives stages forward starting at the aggregate's own
    /// `current_stage()`, which is index 0 for a freshly started
    /// pipeline and wherever a restored snapshot left off for a
    /// resumed one — the same loop serves both callers. Stops as soon
    /// as the pipeline leaves `RUNNING`.
    async fn drive(
        &self,
        handle: &PipelineHandle,
        stage_order: &[String],
        stage_map: &HashMap<String, Arc<dyn Stage>>,
        mut input_data: HashMap<String, Value>,
    ) -> Result<(), PipelineError> {
        let start_index = {
            let pipeline = handle.lock().await;
            match pipeline.current_stage() {
                Some(name) => stage_order.iter().position(|n| n == name).unwrap_or(stage_order.len()),
                None => stage_order.len(),
            }
        };

        for name in &stage_order[start_index..] {
            let status = { handle.lock().await.status() };

            if status != PipelineStatus::Running {
                break;
            }

            let deps_met = {
                let pipeline = handle.lock().await;
                pipeline.dependencies_met(name)?
            };

            if !deps_met {
                let (pid, vid) = {
                    let mut pipeline = handle.lock().await;
                    pipeline.fail_stage(name, "dependencies not met")?;
                    self.flush(&mut pipeline).await?;
                    (pipeline.id(), pipeline.video_id())
                };
                self.progress_notifier.notify_stage_failed(pid, vid, name, "dependencies not met").await;
                if let Some(metrics) = &self.metrics {
                    metrics.record_stage_failed(name, false);
                }
                return Err(PipelineError::dependency_not_met(name.clone()));
            }

            let (pid, vid, configuration) = {
                let pipeline = handle.lock().await;
                (pipeline.id(), pipeline.video_id(), pipeline.configuration().clone())
            };
            self.progress_notifier.notify_stage_started(pid, vid, name).await;

            let stage = stage_map.get(name).ok_or_else(|| PipelineError::unknown_stage(name.clone()))?;
            let result = stage.process(&input_data, &configuration).await;

            if result.is_completed() {
                let (checkpoint_enabled, progress, processing_time_ms) = {
                    let mut pipeline = handle.lock().await;
                    pipeline.complete_stage(name, result.clone())?;
                    self.flush(&mut pipeline).await?;
                    (pipeline.configuration().checkpoint_enabled, pipeline.progress_percentage(), result.processing_time_ms)
                };

                self.progress_notifier.notify_stage_completed(pid, vid, name, progress).await;
                if let Some(metrics) = &self.metrics {
                    metrics.record_stage_completed(name, processing_time_ms);
                }

                if checkpoint_enabled {
                    let snapshot = handle.lock().await.checkpoint_snapshot();
                    if let Err(error) = self.checkpoint_store.save(pid, &snapshot).await {
                        tracing::warn!(%error, stage = %name, "checkpoint save failed, continuing without it");
                    }
                }

                for (key, value) in result.output_data {
                    input_data.insert(key, value);
                }
            } else {
                let error_message = result.error_message.clone().unwrap_or_else(|| format!("stage {name} failed with no message"));
                let will_retry = {
                    let mut pipeline = handle.lock().await;
                    pipeline.fail_stage(name, error_message.clone())?;
                    self.flush(&mut pipeline).await?;
                    pipeline.status() == PipelineStatus::Running
                };

                self.progress_notifier.notify_stage_failed(pid, vid, name, &error_message).await;
                if let Some(metrics) = &self.metrics {
                    metrics.record_stage_failed(name, will_retry);
                }

                return Err(PipelineError::stage_execution(format!("{name}: {error_message}")));
            }
        }

        Ok(())
    }

    /// Publishes every pending event in emission order, then clears
    /// them. A publish failure is fatal and propagates to the caller,
    /// per the event-publisher failure contract.
    async fn flush(&self, pipeline: &mut Pipeline) -> Result<(), PipelineError> {
        let events = pipeline.drain_events();
        for event in &events {
            self.event_publisher.publish(event).await?;
        }
        Ok(())
    }
}
