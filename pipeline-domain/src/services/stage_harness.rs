// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Harness
//!
//! Reusable [`Stage`] scaffolding for implementors who don't want to
//! hand-roll timing and result construction: [`StageHarness`] wraps a
//! [`StageBody`] and produces a timed [`StageResult`], translating a
//! body's `Err` into a `FAILED` result rather than propagating it —
//! matching §4.1's "return a FAILED result or signal failure equivalently"
//! contract.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crate::entities::{PipelineConfiguration, StageResult};
use crate::services::Stage;

/// The part of a stage a body implementor actually writes: given
/// accumulated input and this stage's own config slice, produce output
/// data and metadata, or an error message.
#[async_trait]
pub trait StageBody: Send + Sync {
    async fn execute(
        &self,
        input_data: &HashMap<String, Value>,
        stage_config: &Value,
    ) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String>;
}

/// Adapts a [`StageBody`] into a full [`Stage`], handling timing,
/// config lookup, and `StageResult` construction.
pub struct StageHarness<B: StageBody> {
    name: String,
    dependencies: Vec<String>,
    body: B,
}

impl<B: StageBody> StageHarness<B> {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>, body: B) -> Self {
        Self {
            name: name.into(),
            dependencies,
            body,
        }
    }
}

#[async_trait]
impl<B: StageBody> Stage for StageHarness<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn process(&self, input_data: &HashMap<String, Value>, config: &PipelineConfiguration) -> StageResult {
        let empty = Value::Object(serde_json::Map::new());
        let stage_config = config.stage_config(&self.name).unwrap_or(&empty);
        let start = Instant::now();

        match self.body.execute(input_data, stage_config).await {
            Ok((output_data, metadata)) => {
                let processing_time_ms = start.elapsed().as_millis() as u64;
                StageResult::completed(self.name.clone(), output_data, processing_time_ms).with_metadata(metadata)
            }
            Err(error_message) => {
                let processing_time_ms = start.elapsed().as_millis() as u64;
                StageResult::failed(self.name.clone(), format!("stage {} failed: {error_message}", self.name), processing_time_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysSucceeds;

    #[async_trait]
    impl StageBody for AlwaysSucceeds {
        async fn execute(
            &self,
            _input_data: &HashMap<String, Value>,
            _stage_config: &Value,
        ) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String> {
            let mut output = HashMap::new();
            output.insert("key".to_string(), Value::String("value".to_string()));
            Ok((output, HashMap::new()))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl StageBody for AlwaysFails {
        async fn execute(
            &self,
            _input_data: &HashMap<String, Value>,
            _stage_config: &Value,
        ) -> Result<(HashMap<String, Value>, HashMap<String, Value>), String> {
            Err("boom".to_string())
        }
    }

    #[tokio::test]
    async fn successful_body_yields_completed_result() {
        let harness = StageHarness::new("s", Vec::new(), AlwaysSucceeds);
        let result = harness.process(&HashMap::new(), &PipelineConfiguration::new("v1", 1)).await;
        assert!(result.is_completed());
        assert_eq!(result.output_data.get("key").unwrap(), "value");
    }

    #[tokio::test]
    async fn failing_body_yields_failed_result() {
        let harness = StageHarness::new("s", Vec::new(), AlwaysFails);
        let result = harness.process(&HashMap::new(), &PipelineConfiguration::new("v1", 1)).await;
        assert!(result.is_failed());
        assert!(result.error_message.unwrap().contains("boom"));
    }
}
