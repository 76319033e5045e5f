// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Demo Stage Bodies
//!
//! Illustrative [`StageBody`] implementations for the `run` command.
//! These do no real video decoding, detection, or tracking work — they
//! exist so the CLI has something concrete to submit to the
//! orchestrator. A production deployment swaps these out for stage
//! bodies backed by an actual ML runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pipeline_domain::services::{Stage, StageBody, StageHarness};
use serde_json::{json, Value};

/// Reads the submitted `video_path` (the `input_ref` passed to
/// `submit_pipeline`) and pretends to decode it into frames, recording
/// a frame count derived from the stage config (or a default).
struct IngestBody;

#[async_trait]
impl StageBody for IngestBody {
    async fn execute(&self, input_data: &HashMap<String, Value>, stage_config: &Value) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String> {
        let video_path = input_data
            .get("video_path")
            .and_then(Value::as_str)
            .ok_or_else(|| "ingest requires a \"video_path\" input".to_string())?;

        let frame_count = stage_config.get("frame_count").and_then(Value::as_u64).unwrap_or(300);

        let mut output = HashMap::new();
        output.insert("video_path".to_string(), Value::String(video_path.to_string()));
        output.insert("frame_count".to_string(), json!(frame_count));

        let mut metadata = HashMap::new();
        metadata.insert("ingested_from".to_string(), Value::String(video_path.to_string()));

        Ok((output, metadata))
    }
}

/// Pretends to run a detection/tracking pass over the ingested frames,
/// producing a synthetic per-frame object count.
struct TransformBody;

#[async_trait]
impl StageBody for TransformBody {
    async fn execute(&self, input_data: &HashMap<String, Value>, stage_config: &Value) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String> {
        let frame_count = input_data
            .get("frame_count")
            .and_then(Value::as_u64)
            .ok_or_else(|| "transform requires an upstream \"frame_count\"".to_string())?;

        let objects_per_frame = stage_config.get("objects_per_frame").and_then(Value::as_u64).unwrap_or(1);

        let mut output = HashMap::new();
        output.insert("frame_count".to_string(), json!(frame_count));
        output.insert("detected_objects".to_string(), json!(frame_count * objects_per_frame));

        Ok((output, HashMap::new()))
    }
}

/// Pretends to package the transformed results into a final artifact
/// reference.
struct PackageBody;

#[async_trait]
impl StageBody for PackageBody {
    async fn execute(&self, input_data: &HashMap<String, Value>, _stage_config: &Value) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String> {
        let detected_objects = input_data
            .get("detected_objects")
            .and_then(Value::as_u64)
            .ok_or_else(|| "package requires an upstream \"detected_objects\"".to_string())?;

        let mut output = HashMap::new();
        output.insert("artifact_ref".to_string(), Value::String(format!("artifact://demo/{detected_objects}-objects")));

        let mut metadata = HashMap::new();
        metadata.insert("detected_objects".to_string(), json!(detected_objects));

        Ok((output, metadata))
    }
}

/// Builds the demo `ingest -> transform -> package` stage chain used by
/// the `run` command.
pub fn demo_stages() -> Vec<Arc<dyn Stage>> {
    vec![
        Arc::new(StageHarness::new("ingest", Vec::new(), IngestBody)),
        Arc::new(StageHarness::new("transform", vec!["ingest".to_string()], TransformBody)),
        Arc::new(StageHarness::new("package", vec!["transform".to_string()], PackageBody)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_domain::entities::PipelineConfiguration;

    #[tokio::test]
    async fn ingest_requires_input_ref() {
        let harness = StageHarness::new("ingest", Vec::new(), IngestBody);
        let result = harness.process(&HashMap::new(), &PipelineConfiguration::new("v1", 1)).await;
        assert!(result.is_failed());
    }

    #[tokio::test]
    async fn ingest_populates_frame_count() {
        let harness = StageHarness::new("ingest", Vec::new(), IngestBody);
        let mut input = HashMap::new();
        input.insert("video_path".to_string(), Value::String("video://clip-1".to_string()));

        let result = harness.process(&input, &PipelineConfiguration::new("v1", 1)).await;
        assert!(result.is_completed());
        assert_eq!(result.output_data.get("frame_count").unwrap(), &json!(300));
    }

    #[tokio::test]
    async fn transform_scales_detected_objects() {
        let harness = StageHarness::new("transform", vec!["ingest".to_string()], TransformBody);
        let mut input = HashMap::new();
        input.insert("frame_count".to_string(), json!(10));

        let mut config = PipelineConfiguration::new("v1", 1);
        config.stage_configs.insert("transform".to_string(), json!({"objects_per_frame": 2}));

        let result = harness.process(&input, &config).await;
        assert!(result.is_completed());
        assert_eq!(result.output_data.get("detected_objects").unwrap(), &json!(20));
    }

    #[tokio::test]
    async fn package_formats_artifact_ref() {
        let harness = StageHarness::new("package", vec!["transform".to_string()], PackageBody);
        let mut input = HashMap::new();
        input.insert("detected_objects".to_string(), json!(42));

        let result = harness.process(&input, &PipelineConfiguration::new("v1", 1)).await;
        assert!(result.is_completed());
        assert_eq!(result.output_data.get("artifact_ref").unwrap(), &Value::String("artifact://demo/42-objects".to_string()));
    }

    #[test]
    fn demo_stages_chain_has_expected_dependencies() {
        let stages = demo_stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].name(), "ingest");
        assert_eq!(stages[1].dependencies(), &["ingest".to_string()]);
        assert_eq!(stages[2].dependencies(), &["transform".to_string()]);
    }
}
