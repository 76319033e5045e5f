// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Metrics
//!
//! A small [`prometheus`] registry tracking stage-level outcomes and
//! timing. Orchestrator code records into a shared [`PipelineMetrics`];
//! an HTTP exposition endpoint (not part of this crate) can render it
//! via [`PipelineMetrics::gather`].

use prometheus::{
    CounterVec, HistogramVec, Opts, Registry,
};

pub struct PipelineMetrics {
    registry: Registry,
    pub stages_completed: CounterVec,
    pub stages_failed: CounterVec,
    pub stage_retries: CounterVec,
    pub pipelines_completed: CounterVec,
    pub pipelines_cancelled: CounterVec,
    pub stage_duration_ms: HistogramVec,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let stages_completed = CounterVec::new(
            Opts::new("pipeline_stages_completed_total", "Stages that finished successfully"),
            &["stage_name"],
        )?;
        let stages_failed = CounterVec::new(
            Opts::new("pipeline_stages_failed_total", "Stages that exhausted their retries"),
            &["stage_name"],
        )?;
        let stage_retries = CounterVec::new(
            Opts::new("pipeline_stage_retries_total", "Stage failures that will be retried"),
            &["stage_name"],
        )?;
        let pipelines_completed = CounterVec::new(
            Opts::new("pipelines_completed_total", "Pipelines that reached COMPLETED"),
            &["model_version"],
        )?;
        let pipelines_cancelled = CounterVec::new(
            Opts::new("pipelines_cancelled_total", "Pipelines that were cancelled"),
            &["reason"],
        )?;
        let stage_duration_ms = HistogramVec::new(
            prometheus::HistogramOpts::new("pipeline_stage_duration_milliseconds", "Stage processing time"),
            &["stage_name"],
        )?;

        registry.register(Box::new(stages_completed.clone()))?;
        registry.register(Box::new(stages_failed.clone()))?;
        registry.register(Box::new(stage_retries.clone()))?;
        registry.register(Box::new(pipelines_completed.clone()))?;
        registry.register(Box::new(pipelines_cancelled.clone()))?;
        registry.register(Box::new(stage_duration_ms.clone()))?;

        Ok(Self {
            registry,
            stages_completed,
            stages_failed,
            stage_retries,
            pipelines_completed,
            pipelines_cancelled,
            stage_duration_ms,
        })
    }

    pub fn record_stage_completed(&self, stage_name: &str, duration_ms: u64) {
        self.stages_completed.with_label_values(&[stage_name]).inc();
        self.stage_duration_ms
            .with_label_values(&[stage_name])
            .observe(duration_ms as f64);
    }

    pub fn record_stage_failed(&self, stage_name: &str, will_retry: bool) {
        if will_retry {
            self.stage_retries.with_label_values(&[stage_name]).inc();
        } else {
            self.stages_failed.with_label_values(&[stage_name]).inc();
        }
    }

    pub fn record_pipeline_completed(&self, model_version: &str) {
        self.pipelines_completed.with_label_values(&[model_version]).inc();
    }

    pub fn record_pipeline_cancelled(&self, reason: &str) {
        self.pipelines_cancelled.with_label_values(&[reason]).inc();
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new().expect("metric registration with static, non-conflicting names cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_show_up_in_gathered_output() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.record_stage_completed("download", 120);
        metrics.record_stage_failed("transcode", true);
        metrics.record_pipeline_completed("v1");

        let rendered = metrics.gather().unwrap();
        assert!(rendered.contains("pipeline_stages_completed_total"));
        assert!(rendered.contains("pipeline_stage_retries_total"));
        assert!(rendered.contains("pipelines_completed_total"));
    }
}
