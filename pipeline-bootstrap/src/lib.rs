// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Bootstrap Module
//!
//! The bootstrap module sits **outside** `pipeline-domain` and
//! `pipeline-orchestrator` and provides:
//!
//! - **Entry point** - process lifecycle (`main.rs`)
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - graceful shutdown (SIGTERM, SIGINT, SIGHUP)
//! - **Argument parsing** - secure CLI argument validation
//! - **Error handling** - Unix exit code mapping
//! - **Async coordination** - shutdown coordination and cancellation
//! - **Demo stages** - illustrative `StageBody` chain for the `run` command
//!
//! Process-level logging uses [`tracing`] directly, initialized via
//! [`pipeline_orchestrator::infrastructure::logging::init`].
//!
//! ## Architecture Position
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          BOOTSTRAP (This Module)            │
//! │  - Entry Point                              │
//! │  - Platform Abstraction                     │
//! │  - Signal Handling                          │
//! │  - Secure Arg Parsing                       │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │         PIPELINE-ORCHESTRATOR               │
//! │  - PipelineOrchestrator                     │
//! │  - Ports & adapters                         │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │           PIPELINE-DOMAIN                   │
//! │  - Pipeline aggregate                       │
//! │  - Value objects & events                   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Separation from the domain/orchestrator layers**
//!    - Bootstrap can access both layers
//!    - Neither layer can access bootstrap
//!
//! 2. **Platform Abstraction**
//!    - Abstract OS-specific functionality behind a trait
//!    - POSIX implementation for Linux/macOS
//!    - Windows implementation
//!    - Compile-time platform selection
//!
//! 3. **Graceful Shutdown**
//!    - Signal handlers (SIGTERM, SIGINT, SIGHUP)
//!    - Cancellation token propagation
//!    - Grace period with timeout enforcement
//!
//! 4. **Security First**
//!    - Input validation for every CLI argument
//!    - Injection-pattern rejection
//!    - Privilege checking
//!
//! 5. **Testability**
//!    - All components behind traits
//!    - No-op implementations for testing
//!
//! ## Usage Example
//!
//! ```rust
//! use pipeline_bootstrap::platform::create_platform;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let platform = create_platform();
//!     println!("Running on: {}", platform.platform_name());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - `platform` - OS abstraction (Unix/Windows)
//! - `signals` - Signal handling (SIGTERM, SIGINT, SIGHUP)
//! - `cli` - Secure argument parsing
//! - `config` - Application configuration
//! - `exit_code` - Unix exit code enumeration
//! - `shutdown` - Shutdown coordination
//! - `demo_stages` - Illustrative stage chain for the `run` command

pub mod cli;
pub mod config;
pub mod demo_stages;
pub mod exit_code;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};

/// Bootstrap and parse CLI arguments.
///
/// This is the main entry point for the bootstrap layer. It handles:
/// 1. CLI parsing with clap
/// 2. Security validation
/// 3. Returns validated configuration
///
/// The caller is responsible for running the application logic and
/// mapping its result to an exit code using [`result_to_exit_code`].
///
/// # Errors
///
/// Returns `cli::ParseError` if CLI parsing or validation fails. Clap
/// handles `--help`/`--version` itself and exits the process.
///
/// # Example
///
/// ```no_run
/// use pipeline_bootstrap::{bootstrap_cli, result_to_exit_code};
///
/// #[tokio::main]
/// async fn main() -> std::process::ExitCode {
///     let validated_cli = match bootstrap_cli() {
///         Ok(cli) => cli,
///         Err(e) => {
///             eprintln!("CLI Error: {}", e);
///             return std::process::ExitCode::from(65); // EX_DATAERR
///         }
///     };
///
///     let result = run_application(validated_cli).await;
///     result_to_exit_code(result)
/// }
///
/// async fn run_application(cli: pipeline_bootstrap::ValidatedCli) -> Result<(), pipeline_domain::PipelineError> {
///     let _ = cli;
///     Ok(())
/// }
/// ```
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
