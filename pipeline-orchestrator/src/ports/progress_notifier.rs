// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Progress Notifier Port
//!
//! Fire-and-forget observer notifications. A notifier MUST NOT let a
//! single observer's failure prevent delivery to others — the
//! [`crate::infrastructure::adapters::progress_notifier::composite::CompositeProgressNotifier`]
//! isolates child failures for exactly this reason.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pipeline_domain::{ProcessingId, VideoId};
use serde::{Deserialize, Serialize};

/// The kind of progress event broadcast to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMessageType {
    StageStarted,
    StageCompleted,
    StageFailed,
    Connection,
    Pong,
}

/// Envelope broadcast to every connected progress observer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMessage {
    #[serde(rename = "type")]
    pub message_type: ProgressMessageType,
    pub pipeline_id: ProcessingId,
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressMessage {
    pub fn stage_started(pipeline_id: ProcessingId, video_id: VideoId, stage_name: impl Into<String>) -> Self {
        Self {
            message_type: ProgressMessageType::StageStarted,
            pipeline_id,
            video_id,
            stage_name: Some(stage_name.into()),
            progress_percentage: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn stage_completed(pipeline_id: ProcessingId, video_id: VideoId, stage_name: impl Into<String>, progress_percentage: f64) -> Self {
        Self {
            message_type: ProgressMessageType::StageCompleted,
            pipeline_id,
            video_id,
            stage_name: Some(stage_name.into()),
            progress_percentage: Some(progress_percentage),
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn stage_failed(pipeline_id: ProcessingId, video_id: VideoId, stage_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            message_type: ProgressMessageType::StageFailed,
            pipeline_id,
            video_id,
            stage_name: Some(stage_name.into()),
            progress_percentage: None,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Observer-facing progress notifications. Every method is
/// fire-and-forget: a notifier implementation may fail silently for one
/// observer without affecting others or the driving pipeline.
#[async_trait]
pub trait ProgressNotifier: Send + Sync {
    async fn notify_stage_started(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str);

    async fn notify_stage_completed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, progress_percentage: f64);

    async fn notify_stage_failed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, error_message: &str);
}
