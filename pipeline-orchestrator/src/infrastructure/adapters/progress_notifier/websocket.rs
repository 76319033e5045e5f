// /////////////////////////////////////////////////////////////////////////////
// Video Pipeline Orchestrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! WebSocket-backed [`ProgressNotifier`]. Available under the
//! `ws-backend` feature. Accepts inbound connections, broadcasts every
//! notification to all of them, answers `ping` with `pong`, records
//! `subscribe` requests (the current design broadcasts to everyone
//! regardless), and prunes connections that close mid-broadcast.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use pipeline_domain::{ProcessingId, VideoId};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;

use crate::ports::{ProgressMessage, ProgressNotifier};

pub struct WebSocketProgressNotifier {
    connections: Mutex<Vec<mpsc::UnboundedSender<Message>>>,
}

impl WebSocketProgressNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            connections: Mutex::new(Vec::new()),
        })
    }

    /// Binds `addr` and accepts connections until the process shuts
    /// down. Each accepted connection gets its own read/write tasks;
    /// errors accepting an individual connection are logged and do not
    /// stop the listener.
    pub async fn serve(self: Arc<Self>, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "progress notifier listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let notifier = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(error) = notifier.handle_connection(stream).await {
                    tracing::warn!(%peer, %error, "progress connection closed with error");
                }
            });
        }
    }

    async fn handle_connection(self: Arc<Self>, stream: TcpStream) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        self.connections.lock().await.push(tx.clone());

        let connected = json!({
            "type": "connection",
            "status": "connected",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "message": "connected to pipeline progress stream",
        });
        let _ = tx.send(Message::Text(connected.to_string().into()));

        let forward = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if write.send(message).await.is_err() {
                    break;
                }
            }
        });

        while let Some(Ok(message)) = read.next().await {
            if let Message::Text(text) = message {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                    match value.get("type").and_then(|t| t.as_str()) {
                        Some("ping") => {
                            let pong = json!({"type": "pong", "timestamp": chrono::Utc::now().to_rfc3339()});
                            let _ = tx.send(Message::Text(pong.to_string().into()));
                        }
                        Some("subscribe") => {
                            tracing::debug!("subscribe request recorded (broadcast is unfiltered)");
                        }
                        _ => {}
                    }
                }
            }
        }

        forward.abort();
        self.connections.lock().await.retain(|sender| !sender.same_channel(&tx));
        Ok(())
    }

    async fn broadcast(&self, message: &ProgressMessage) {
        let Ok(text) = serde_json::to_string(message) else { return };
        let payload = Message::Text(text.into());

        let mut connections = self.connections.lock().await;
        connections.retain(|sender| sender.send(payload.clone()).is_ok());
    }
}

#[async_trait]
impl ProgressNotifier for WebSocketProgressNotifier {
    async fn notify_stage_started(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str) {
        self.broadcast(&ProgressMessage::stage_started(pipeline_id, video_id, stage_name)).await;
    }

    async fn notify_stage_completed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, progress_percentage: f64) {
        self.broadcast(&ProgressMessage::stage_completed(pipeline_id, video_id, stage_name, progress_percentage)).await;
    }

    async fn notify_stage_failed(&self, pipeline_id: ProcessingId, video_id: VideoId, stage_name: &str, error_message: &str) {
        self.broadcast(&ProgressMessage::stage_failed(pipeline_id, video_id, stage_name, error_message)).await;
    }
}

