// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Structured Logging
//!
//! Initializes a global [`tracing`] subscriber. Verbosity is controlled
//! by the `RUST_LOG` environment variable (e.g. `RUST_LOG=pipeline_orchestrator=debug,info`);
//! when unset, `info` is used for every target.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the process-wide subscriber. Safe to call once per process;
/// a second call returns an error which callers may ignore (useful in
/// tests that run many times in one binary).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if subscriber.try_init().is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic_when_called_twice() {
        init();
        init();
    }
}
