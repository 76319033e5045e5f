// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory [`CheckpointStore`] with TTL expiry, for tests and demos
//! (and for running without a Redis deployment).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pipeline_domain::{PipelineError, PipelineSnapshot, ProcessingId};
use tokio::sync::Mutex;

use crate::ports::{CheckpointStore, DEFAULT_CHECKPOINT_TTL_SECONDS};

struct Entry {
    snapshot: PipelineSnapshot,
    expires_at: Instant,
}

pub struct InMemoryCheckpointStore {
    ttl: Duration,
    entries: Mutex<HashMap<ProcessingId, Entry>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CHECKPOINT_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, pipeline_id: ProcessingId, snapshot: &PipelineSnapshot) -> Result<(), PipelineError> {
        self.entries.lock().await.insert(
            pipeline_id,
            Entry {
                snapshot: snapshot.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn load(&self, pipeline_id: ProcessingId) -> Result<Option<PipelineSnapshot>, PipelineError> {
        let mut entries = self.entries.lock().await;
        match entries.get(&pipeline_id) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.snapshot.clone())),
            Some(_) => {
                entries.remove(&pipeline_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, pipeline_id: ProcessingId) -> Result<(), PipelineError> {
        self.entries.lock().await.remove(&pipeline_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProcessingId>, PipelineError> {
        let now = Instant::now();
        Ok(self.entries.lock().await.iter().filter(|(_, e)| e.expires_at > now).map(|(id, _)| *id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_domain::{Pipeline, PipelineConfiguration, StageContract, VideoId};

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemoryCheckpointStore::new();
        let pipeline = Pipeline::create_for_video(
            VideoId::generate(),
            vec![StageContract::new("a", Vec::new())],
            PipelineConfiguration::new("v1", 1),
        );
        let snapshot = pipeline.checkpoint_snapshot();

        store.save(pipeline.id(), &snapshot).await.unwrap();
        let loaded = store.load(pipeline.id()).await.unwrap();
        assert!(loaded.is_some());
    }

    #[tokio::test]
    async fn expired_entry_is_absent() {
        let store = InMemoryCheckpointStore::with_ttl(Duration::from_millis(10));
        let pipeline = Pipeline::create_for_video(VideoId::generate(), Vec::new(), PipelineConfiguration::new("v1", 1));
        let snapshot = pipeline.checkpoint_snapshot();

        store.save(pipeline.id(), &snapshot).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.load(pipeline.id()).await.unwrap().is_none());
    }
}
