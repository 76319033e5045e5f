// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Video Identifier Value Object
//!
//! Opaque, globally-unique identifier for the input artifact a pipeline
//! processes. Rendered as a canonical 128-bit UUID string. Two `VideoId`s
//! are equal iff their underlying UUIDs are equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PipelineError;

/// Type-safe identifier for a video submitted for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(Uuid);

impl VideoId {
    /// Generates a fresh, random video identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a video identifier from its canonical UUID string form.
    pub fn from_string(value: &str) -> Result<Self, PipelineError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| PipelineError::invalid_state(format!("invalid video id '{value}': {e}")))
    }

    /// Returns the canonical UUID string representation.
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl From<Uuid> for VideoId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}
