// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Abstraction Module
//!
//! Platform-specific abstractions for operating system functionality.
//!
//! ## Architecture Pattern
//!
//! - **Interface**: `Platform` trait defines the contract
//! - **Implementations**:
//!   - `UnixPlatform`: POSIX implementation (Linux + macOS)
//!   - `WindowsPlatform`: Windows API implementation
//! - **Selection**: Compile-time platform selection via `#[cfg]`
//!
//! This orchestrator does no file I/O or memory-mapping of its own, so
//! the trait here is narrower than a file-processing tool's: it covers
//! only what `run`/`status` diagnostics and resource-sizing decisions
//! need (core count, memory, elevation, platform identity).
//!
//! ## Usage
//!
//! ```rust
//! use pipeline_bootstrap::platform::create_platform;
//!
//! let platform = create_platform();
//! println!("Running on: {}", platform.platform_name());
//! println!("CPU cores: {}", platform.cpu_count());
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform;

#[cfg(windows)]
pub use windows::WindowsPlatform;

/// Platform-specific errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not supported on this platform: {0}")]
    NotSupported(String),

    #[error("Platform error: {0}")]
    Other(String),
}

/// Platform abstraction trait for OS-specific operations
///
/// ## Design Principles
///
/// - **Stateless**: All methods are stateless and thread-safe
/// - **Error-handling**: All fallible operations return `Result`
/// - **Cross-platform**: Same interface works on Unix and Windows
pub trait Platform: Send + Sync {
    /// Number of logical processors available to the process. Used for
    /// sizing the orchestrator's own concurrency, not a stage's.
    fn cpu_count(&self) -> usize;

    /// Total physical memory in bytes.
    fn total_memory(&self) -> Result<u64, PlatformError>;

    /// Available (free) memory in bytes.
    fn available_memory(&self) -> Result<u64, PlatformError>;

    /// Platform-specific line separator (`"\n"` on Unix, `"\r\n"` on
    /// Windows).
    fn line_separator(&self) -> &'static str;

    /// Platform-specific `PATH` separator (`:` on Unix, `;` on
    /// Windows).
    fn path_separator(&self) -> char;

    /// Platform identifier: "linux", "macos", "windows", etc.
    fn platform_name(&self) -> &'static str;

    /// Platform-specific temporary directory.
    fn temp_dir(&self) -> PathBuf;

    /// Whether the current process runs with elevated privileges
    /// (root on Unix, Administrator on Windows).
    fn is_elevated(&self) -> bool;
}

#[cfg(unix)]
type PlatformImpl = UnixPlatform;

#[cfg(windows)]
type PlatformImpl = WindowsPlatform;

/// Create the platform-specific implementation, selected at compile time.
pub fn create_platform() -> Box<dyn Platform> {
    Box::new(PlatformImpl::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_platform() {
        let platform = create_platform();
        assert!(platform.cpu_count() >= 1);
        assert!(!platform.platform_name().is_empty());
    }

    #[test]
    fn test_line_separator() {
        let platform = create_platform();
        let sep = platform.line_separator();

        #[cfg(unix)]
        assert_eq!(sep, "\n");

        #[cfg(windows)]
        assert_eq!(sep, "\r\n");
    }

    #[test]
    fn test_path_separator() {
        let platform = create_platform();
        let sep = platform.path_separator();

        #[cfg(unix)]
        assert_eq!(sep, ':');

        #[cfg(windows)]
        assert_eq!(sep, ';');
    }
}
