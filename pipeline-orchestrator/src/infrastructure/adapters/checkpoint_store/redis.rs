// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Redis-backed [`CheckpointStore`]. Available under the `redis-backend`
//! feature. Key format is `<prefix>:<pipeline_id>`; `save` writes the
//! snapshot as a UTF-8 JSON blob and refreshes the TTL in a single
//! pipelined round trip.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use pipeline_domain::{PipelineError, PipelineSnapshot, ProcessingId};

use crate::ports::{CheckpointStore, DEFAULT_CHECKPOINT_TTL_SECONDS};

pub struct RedisCheckpointStore {
    conn: ConnectionManager,
    key_prefix: String,
    ttl_seconds: u64,
}

impl RedisCheckpointStore {
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self, PipelineError> {
        let client = redis::Client::open(redis_url).map_err(|e| PipelineError::checkpoint_io(format!("redis connect: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| PipelineError::checkpoint_io(format!("redis connection manager: {e}")))?;

        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
            ttl_seconds: DEFAULT_CHECKPOINT_TTL_SECONDS,
        })
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    fn key_for(&self, pipeline_id: ProcessingId) -> String {
        format!("{}:{}", self.key_prefix, pipeline_id)
    }
}

#[async_trait]
impl CheckpointStore for RedisCheckpointStore {
    async fn save(&self, pipeline_id: ProcessingId, snapshot: &PipelineSnapshot) -> Result<(), PipelineError> {
        let mut conn = self.conn.clone();
        let key = self.key_for(pipeline_id);
        let blob = serde_json::to_string(snapshot).map_err(|e| PipelineError::checkpoint_io(format!("serialize snapshot: {e}")))?;

        redis::pipe()
            .set(&key, blob)
            .expire(&key, self.ttl_seconds as i64)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| PipelineError::checkpoint_io(format!("redis save: {e}")))
    }

    async fn load(&self, pipeline_id: ProcessingId) -> Result<Option<PipelineSnapshot>, PipelineError> {
        let mut conn = self.conn.clone();
        let key = self.key_for(pipeline_id);

        let blob: Option<String> = conn.get(&key).await.map_err(|e| PipelineError::checkpoint_io(format!("redis load: {e}")))?;

        blob.map(|b| serde_json::from_str(&b).map_err(|e| PipelineError::checkpoint_io(format!("deserialize snapshot: {e}"))))
            .transpose()
    }

    async fn delete(&self, pipeline_id: ProcessingId) -> Result<(), PipelineError> {
        let mut conn = self.conn.clone();
        let key = self.key_for(pipeline_id);
        conn.del::<_, ()>(&key).await.map_err(|e| PipelineError::checkpoint_io(format!("redis delete: {e}")))
    }

    async fn list(&self) -> Result<Vec<ProcessingId>, PipelineError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}:*", self.key_prefix);
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(|e| PipelineError::checkpoint_io(format!("redis list: {e}")))?;

        keys.into_iter()
            .filter_map(|k| k.rsplit(':').next().map(str::to_string))
            .map(|id| ProcessingId::from_string(&id))
            .collect()
    }
}

impl Clone for RedisCheckpointStore {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            key_prefix: self.key_prefix.clone(),
            ttl_seconds: self.ttl_seconds,
        }
    }
}
