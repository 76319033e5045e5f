// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Command-Line Argument Parsing
//!
//! This CLI accepts no filesystem paths for its domain arguments (a
//! video's location is an opaque `video_path` string the pipeline
//! never opens directly), so validation here is narrower than a
//! file-processing tool's: free-form strings are checked for shell
//! metacharacters and length, and `--config` is the only argument
//! that resolves to a path on disk.
//!
//! ## Dangerous Patterns Detected
//!
//! - `$` - Variable expansion
//! - Backticks - Command substitution
//! - `;` `&` `|` - Command chaining
//! - `>` `<` - Redirection
//! - Null bytes, newlines, carriage returns

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum single argument length
const MAX_ARG_LENGTH: usize = 1000;

/// Dangerous patterns that indicate potential shell injection
const DANGEROUS_PATTERNS: &[&str] = &["$", "`", ";", "&", "|", ">", "<", "\n", "\r", "\0"];

/// Secure argument parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// Argument exceeds maximum length
    #[error("Argument too long (max {MAX_ARG_LENGTH} characters): {0}")]
    ArgumentTooLong(String),

    /// Dangerous pattern detected
    #[error("Dangerous pattern detected in argument: {pattern} in {arg}")]
    DangerousPattern { pattern: String, arg: String },

    /// Config path does not exist
    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    /// Invalid argument value
    #[error("Invalid argument value for {arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

/// Secure argument parser
pub struct SecureArgParser;

impl SecureArgParser {
    /// Validate a single free-form argument for shell-injection patterns
    ///
    /// # Errors
    ///
    /// - `ArgumentTooLong` if exceeds max length
    /// - `DangerousPattern` if contains dangerous patterns
    pub fn validate_argument(arg: &str) -> Result<(), ParseError> {
        if arg.len() > MAX_ARG_LENGTH {
            return Err(ParseError::ArgumentTooLong(arg.chars().take(50).collect::<String>() + "..."));
        }

        for pattern in DANGEROUS_PATTERNS {
            if arg.contains(pattern) {
                return Err(ParseError::DangerousPattern {
                    pattern: pattern.to_string(),
                    arg: arg.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Validate that a config file path exists, without canonicalizing
    /// it (the orchestrator's own settings loader resolves it further).
    pub fn validate_config_path(path: &Path) -> Result<PathBuf, ParseError> {
        Self::validate_argument(&path.to_string_lossy())?;

        if !path.exists() {
            return Err(ParseError::PathNotFound(path.display().to_string()));
        }

        Ok(path.to_path_buf())
    }
}
