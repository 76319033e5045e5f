// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! [`ProgressNotifier`] fan-out. A child's panic-free failure (an
//! `Err`-shaped internal problem logged by the child itself) never
//! prevents the remaining children from being invoked — each child call
//! is driven to completion independently.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::{ProcessingId, VideoId};

use crate::ports::ProgressNotifier;

pub struct CompositeProgressNotifier {
    children: Vec<Arc<dyn ProgressNotifier>>,
}

impl CompositeProgressNotifier {
    pub fn new(children: Vec<Arc<dyn ProgressNotifier>>) -> Self {
        Self { children }
    }
}

#[async_trait]
impl ProgressNotifier for CompositeProgressNotifier {
    async fn notify_stage_started(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str) {
        for child in &self.children {
            child.notify_stage_started(pipeline_id, video_id, stage_name).await;
        }
    }

    async fn notify_stage_completed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, progress_percentage: f64) {
        for child in &self.children {
            child.notify_stage_completed(pipeline_id, video_id, stage_name, progress_percentage).await;
        }
    }

    async fn notify_stage_failed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, error_message: &str) {
        for child in &self.children {
            child.notify_stage_failed(pipeline_id, video_id, stage_name, error_message).await;
        }
    }
}
