// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! [`ProgressNotifier`] that only logs via `tracing`, for demos and for
//! running without any push-socket transport.

use async_trait::async_trait;
use pipeline_domain::{ProcessingId, VideoId};

use crate::ports::ProgressNotifier;

#[derive(Default)]
pub struct LoggingProgressNotifier;

impl LoggingProgressNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressNotifier for LoggingProgressNotifier {
    async fn notify_stage_started(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str) {
        tracing::info!(%pipeline_id, %video_id, stage_name, "stage started");
    }

    async fn notify_stage_completed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, progress_percentage: f64) {
        tracing::info!(%pipeline_id, %video_id, stage_name, progress_percentage, "stage completed");
    }

    async fn notify_stage_failed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, error_message: &str) {
        tracing::warn!(%pipeline_id, %video_id, stage_name, error_message, "stage failed");
    }
}
