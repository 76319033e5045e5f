// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Orchestrator CLI
//!
//! Process entry point: parses and validates arguments, wires the
//! orchestrator against in-memory adapters, submits/queries/cancels a
//! pipeline run, and maps the outcome to a process exit code.

use std::sync::Arc;
use std::time::Duration;

use pipeline_bootstrap::cli::ValidatedCommand;
use pipeline_bootstrap::config::{AppConfig, LogLevel};
use pipeline_bootstrap::shutdown::{ShutdownCoordinator, DEFAULT_GRACE_PERIOD_SECS};
use pipeline_bootstrap::signals::create_signal_handler;
use pipeline_bootstrap::{bootstrap_cli, demo_stages, result_to_exit_code};
use pipeline_orchestrator::infrastructure::adapters::checkpoint_store::InMemoryCheckpointStore;
use pipeline_orchestrator::infrastructure::adapters::event_publisher::{InMemoryEventPublisher, PartitionedEventPublisher};
use pipeline_orchestrator::infrastructure::adapters::progress_notifier::LoggingProgressNotifier;
use pipeline_orchestrator::infrastructure::{logging, PipelineOrchestratorSettings};
use pipeline_orchestrator::PipelineOrchestrator;
use pipeline_domain::{PipelineConfiguration, ProcessingId, VideoId};
use thiserror::Error;
use tracing::{error, info};

/// Process-level failures that aren't shaped like a [`pipeline_domain::PipelineError`]:
/// CLI parsing, settings loading, and task-join failures. Message text is
/// kept aligned with [`pipeline_bootstrap::ExitCode::from_error`]'s
/// pattern matching.
#[derive(Debug, Error)]
enum BootstrapError {
    #[error("invalid argument: {0}")]
    Cli(#[from] pipeline_bootstrap::cli::ParseError),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("pipeline task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Pipeline(#[from] pipeline_domain::PipelineError),

    #[error("pipeline id not found: {0}")]
    InvalidPipelineId(String),
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let result = run().await;
    if let Err(error) = &result {
        error!("{error}");
    }
    result_to_exit_code(result)
}

async fn run() -> Result<(), BootstrapError> {
    let cli = bootstrap_cli()?;

    let mut app_config = AppConfig::builder().app_name(env!("CARGO_PKG_NAME")).log_level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info }).verbose(cli.verbose);
    if let Some(config_path) = &cli.config {
        app_config = app_config.config_path(config_path.clone());
    }
    let app_config = app_config.build();

    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point in startup, before the runtime spawns any tasks.
        unsafe {
            std::env::set_var("RUST_LOG", app_config.log_level().to_tracing_level().to_string().to_lowercase());
        }
    }
    logging::init();

    let config_path = app_config.config_path().and_then(|p| p.to_str());
    let settings = PipelineOrchestratorSettings::load(config_path)?;

    let event_publisher = Arc::new(PartitionedEventPublisher::new(
        settings.event_bus.topic_prefix.clone(),
        Arc::new(InMemoryEventPublisher::new()),
    ));
    let checkpoint_store = Arc::new(InMemoryCheckpointStore::new());
    let progress_notifier = Arc::new(LoggingProgressNotifier::new());

    let orchestrator = PipelineOrchestrator::new(event_publisher, checkpoint_store, progress_notifier);

    match cli.command {
        ValidatedCommand::Run {
            video_path,
            model_version,
            batch_size,
            gpu_enabled,
            checkpoint_enabled,
            max_retries,
            timeout_seconds,
        } => run_pipeline(&orchestrator, video_path, model_version, batch_size, gpu_enabled, checkpoint_enabled, max_retries, timeout_seconds).await,

        ValidatedCommand::Status { pipeline_id } => show_status(&orchestrator, &pipeline_id).await,

        ValidatedCommand::Cancel { pipeline_id, reason } => cancel_pipeline(&orchestrator, &pipeline_id, reason).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    orchestrator: &Arc<PipelineOrchestrator>,
    video_path: String,
    model_version: String,
    batch_size: u32,
    gpu_enabled: bool,
    checkpoint_enabled: bool,
    max_retries: Option<u32>,
    timeout_seconds: Option<u64>,
) -> Result<(), BootstrapError> {
    let mut configuration = PipelineConfiguration::new(model_version, batch_size);
    configuration.gpu_enabled = gpu_enabled;
    configuration.checkpoint_enabled = checkpoint_enabled;
    if let Some(max_retries) = max_retries {
        configuration.max_retries = max_retries;
    }
    if let Some(timeout_seconds) = timeout_seconds {
        configuration.timeout_seconds = timeout_seconds;
    }

    let video_id = VideoId::generate();
    let (pipeline_id, join_handle) = orchestrator.submit_pipeline(video_id, video_path, configuration, demo_stages::demo_stages()).await?;
    info!(%pipeline_id, "pipeline submitted");

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS));
    let token = coordinator.token();
    let signal_handler = create_signal_handler();
    let coordinator_for_signal = coordinator.clone();
    tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || {
                coordinator_for_signal.initiate_shutdown();
            }))
            .await;
    });

    tokio::select! {
        result = join_handle => {
            result??;
            println!("pipeline {pipeline_id} completed");
            Ok(())
        }
        _ = token.cancelled() => {
            info!(%pipeline_id, "shutdown signal received, cancelling pipeline");
            orchestrator.cancel_pipeline(pipeline_id, "shutdown signal received").await?;
            println!("pipeline {pipeline_id} cancelled");
            Ok(())
        }
    }
}

async fn show_status(orchestrator: &Arc<PipelineOrchestrator>, pipeline_id: &str) -> Result<(), BootstrapError> {
    let pipeline_id = ProcessingId::from_string(pipeline_id).map_err(|_| BootstrapError::InvalidPipelineId(pipeline_id.to_string()))?;

    match orchestrator.get_pipeline_status(pipeline_id).await {
        Some(status) => {
            println!("pipeline:  {}", status.pipeline_id);
            println!("video:     {}", status.video_id);
            println!("status:    {:?}", status.status);
            println!("progress:  {:.1}%", status.progress_percentage);
            if let Some(stage) = &status.current_stage {
                println!("stage:     {stage}");
            }
            Ok(())
        }
        None => Err(BootstrapError::Pipeline(pipeline_domain::PipelineError::unknown_stage(format!("no active pipeline {pipeline_id}")))),
    }
}

async fn cancel_pipeline(orchestrator: &Arc<PipelineOrchestrator>, pipeline_id: &str, reason: String) -> Result<(), BootstrapError> {
    let pipeline_id = ProcessingId::from_string(pipeline_id).map_err(|_| BootstrapError::InvalidPipelineId(pipeline_id.to_string()))?;
    orchestrator.cancel_pipeline(pipeline_id, reason).await?;
    println!("pipeline {pipeline_id} cancelled");
    Ok(())
}
