// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processing Identifier Value Object
//!
//! Opaque, globally-unique identifier for a single pipeline run (the
//! `Pipeline` aggregate's identity). Generated fresh at pipeline
//! construction and never reused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PipelineError;

/// Type-safe identifier for one pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingId(Uuid);

impl ProcessingId {
    /// Generates a fresh, random processing identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a processing identifier from its canonical UUID string form.
    pub fn from_string(value: &str) -> Result<Self, PipelineError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| PipelineError::invalid_state(format!("invalid processing id '{value}': {e}")))
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

impl fmt::Display for ProcessingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProcessingId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl From<Uuid> for ProcessingId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_unique_ids() {
        assert_ne!(ProcessingId::generate(), ProcessingId::generate());
    }

    #[test]
    fn round_trips_through_string() {
        let id = ProcessingId::generate();
        let parsed = ProcessingId::from_string(&id.as_str()).unwrap();
        assert_eq!(id, parsed);
    }
}
