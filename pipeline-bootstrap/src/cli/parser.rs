// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in the validator module after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline")]
#[command(about = concat!("Video Pipeline Orchestrator v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Orchestrator settings file (TOML), layered under `PIPELINE_*` env vars
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Submit a video for processing and run its pipeline to completion
    Run {
        /// Path or URI identifying the video to process
        video_path: String,

        /// Model version to record on the pipeline's configuration
        #[arg(long, default_value = "default")]
        model_version: String,

        /// Batch size passed to each stage
        #[arg(long, default_value = "1")]
        batch_size: u32,

        /// Enable GPU-accelerated stages
        #[arg(long)]
        gpu_enabled: bool,

        /// Persist a checkpoint after every completed stage
        #[arg(long)]
        checkpoint_enabled: bool,

        /// Maximum retry attempts per stage before the pipeline fails
        #[arg(long)]
        max_retries: Option<u32>,

        /// Wall-clock budget for the whole pipeline, in seconds
        #[arg(long, value_parser = parse_timeout_seconds)]
        timeout_seconds: Option<u64>,
    },

    /// Query the current status of a running pipeline
    Status {
        /// Processing id returned by `run`
        pipeline_id: String,
    },

    /// Request cancellation of a running pipeline
    Cancel {
        /// Processing id returned by `run`
        pipeline_id: String,

        /// Human-readable reason recorded on the cancellation event
        #[arg(long, default_value = "cancelled by operator")]
        reason: String,
    },
}

/// Parse and validate a timeout value from CLI argument
fn parse_timeout_seconds(s: &str) -> Result<u64, String> {
    let value: u64 = s.parse().map_err(|_| format!("'{s}' is not a valid number of seconds"))?;
    if value == 0 {
        return Err("timeout-seconds must be greater than 0".to_string());
    }
    Ok(value)
}

/// Parse CLI arguments
///
/// # Panics
///
/// Clap will exit the process with appropriate error message if parsing fails
pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout_seconds_valid() {
        assert_eq!(parse_timeout_seconds("30").unwrap(), 30);
    }

    #[test]
    fn test_parse_timeout_seconds_invalid() {
        assert!(parse_timeout_seconds("0").is_err());
        assert!(parse_timeout_seconds("soon").is_err());
    }
}
