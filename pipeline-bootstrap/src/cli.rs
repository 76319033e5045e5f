// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: all arguments security-checked.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Validated command variants
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Run {
        video_path: String,
        model_version: String,
        batch_size: u32,
        gpu_enabled: bool,
        checkpoint_enabled: bool,
        max_retries: Option<u32>,
        timeout_seconds: Option<u64>,
    },
    Status {
        pipeline_id: String,
    },
    Cancel {
        pipeline_id: String,
        reason: String,
    },
}

/// Parse and validate CLI arguments
///
/// # Errors
///
/// Returns `ParseError` if any validation fails
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

/// Validate parsed CLI arguments
fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match cli.config {
        Some(ref path) => Some(SecureArgParser::validate_config_path(path)?),
        None => None,
    };

    let command = match cli.command {
        Commands::Run {
            video_path,
            model_version,
            batch_size,
            gpu_enabled,
            checkpoint_enabled,
            max_retries,
            timeout_seconds,
        } => {
            SecureArgParser::validate_argument(&video_path)?;
            SecureArgParser::validate_argument(&model_version)?;

            if batch_size == 0 {
                return Err(ParseError::InvalidValue {
                    arg: "batch-size".to_string(),
                    reason: "must be greater than 0".to_string(),
                });
            }

            ValidatedCommand::Run {
                video_path,
                model_version,
                batch_size,
                gpu_enabled,
                checkpoint_enabled,
                max_retries,
                timeout_seconds,
            }
        }
        Commands::Status { pipeline_id } => {
            SecureArgParser::validate_argument(&pipeline_id)?;
            ValidatedCommand::Status { pipeline_id }
        }
        Commands::Cancel { pipeline_id, reason } => {
            SecureArgParser::validate_argument(&pipeline_id)?;
            SecureArgParser::validate_argument(&reason)?;
            ValidatedCommand::Cancel { pipeline_id, reason }
        }
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_cli_rejects_zero_batch_size() {
        let cli = Cli {
            command: Commands::Run {
                video_path: "video.mp4".to_string(),
                model_version: "v1".to_string(),
                batch_size: 0,
                gpu_enabled: false,
                checkpoint_enabled: false,
                max_retries: None,
                timeout_seconds: None,
            },
            verbose: false,
            config: None,
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::InvalidValue { .. })));
    }

    #[test]
    fn validate_cli_rejects_dangerous_video_path() {
        let cli = Cli {
            command: Commands::Run {
                video_path: "video.mp4; rm -rf /".to_string(),
                model_version: "v1".to_string(),
                batch_size: 1,
                gpu_enabled: false,
                checkpoint_enabled: false,
                max_retries: None,
                timeout_seconds: None,
            },
            verbose: false,
            config: None,
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::DangerousPattern { .. })));
    }

    #[test]
    fn validate_cli_accepts_well_formed_run() {
        let cli = Cli {
            command: Commands::Run {
                video_path: "s3://bucket/clip.mp4".to_string(),
                model_version: "v2".to_string(),
                batch_size: 8,
                gpu_enabled: true,
                checkpoint_enabled: true,
                max_retries: Some(5),
                timeout_seconds: Some(60),
            },
            verbose: true,
            config: None,
        };

        let validated = validate_cli(cli).unwrap();
        assert!(validated.verbose);
        assert!(matches!(validated.command, ValidatedCommand::Run { batch_size: 8, .. }));
    }
}
