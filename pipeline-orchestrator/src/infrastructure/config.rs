// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Orchestrator Configuration
//!
//! Process-level settings for the orchestrator, distinct from
//! [`pipeline_domain::PipelineConfiguration`] (which travels with a
//! single pipeline run). Loaded by layering, in increasing precedence:
//!
//! 1. compiled-in defaults
//! 2. an optional TOML file (`config/default.toml` unless overridden)
//! 3. environment variables prefixed `PIPELINE_`, with `__` as the
//!    nesting separator (e.g. `PIPELINE_CHECKPOINT__TTL_SECONDS`)

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EventBusSettings {
    pub topic_prefix: String,
}

impl Default for EventBusSettings {
    fn default() -> Self {
        Self {
            topic_prefix: "pipeline".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointSettings {
    pub key_prefix: String,
    pub ttl_seconds: u64,
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            key_prefix: "pipeline-checkpoint".to_string(),
            ttl_seconds: 7 * 24 * 60 * 60,
            redis_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressSettings {
    #[serde(default)]
    pub websocket_bind_addr: Option<String>,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self { websocket_bind_addr: None }
    }
}

/// Top-level settings for an orchestrator process.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineOrchestratorSettings {
    #[serde(default)]
    pub event_bus: EventBusSettings,
    #[serde(default)]
    pub checkpoint: CheckpointSettings,
    #[serde(default)]
    pub progress: ProgressSettings,
}

impl PipelineOrchestratorSettings {
    /// Loads settings layering an optional TOML file over
    /// `PIPELINE_`-prefixed environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("PIPELINE").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = PipelineOrchestratorSettings::default();
        assert_eq!(settings.event_bus.topic_prefix, "pipeline");
        assert_eq!(settings.checkpoint.ttl_seconds, 7 * 24 * 60 * 60);
    }
}
