// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Aggregates: consistency boundaries mutated only through their own
//! operations.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineSnapshot, StageContract};
