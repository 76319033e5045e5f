// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Configuration
//!
//! Immutable parameters a `Pipeline` run is constructed with. Distinct
//! from the orchestrator's own process-level configuration
//! (`infrastructure::config`): this type travels with the aggregate and
//! is what individual stages see.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default retry budget when a caller does not specify one: with
/// `max_retries = 3`, a stage gets up to 4 total attempts before the
/// pipeline is marked `FAILED`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default per-pipeline wall-clock budget, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3600;

/// Construction parameters for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfiguration {
    pub model_version: String,
    pub batch_size: u32,
    #[serde(default)]
    pub gpu_enabled: bool,
    #[serde(default)]
    pub checkpoint_enabled: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub stage_configs: HashMap<String, Value>,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl PipelineConfiguration {
    /// Builds a configuration with the given model version and batch
    /// size, defaulting every other field.
    pub fn new(model_version: impl Into<String>, batch_size: u32) -> Self {
        Self {
            model_version: model_version.into(),
            batch_size,
            gpu_enabled: false,
            checkpoint_enabled: false,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            stage_configs: HashMap::new(),
        }
    }

    /// Returns the per-stage configuration value for `stage_name`, if any.
    pub fn stage_config(&self, stage_name: &str) -> Option<&Value> {
        self.stage_configs.get(stage_name)
    }
}

impl Default for PipelineConfiguration {
    fn default() -> Self {
        Self::new("default", 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = PipelineConfiguration::new("v1", 8);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout_seconds, 3600);
        assert!(!config.gpu_enabled);
        assert!(!config.checkpoint_enabled);
    }
}
