//! Socket loop for subscribe-only topic streams.
//!
//! Attendance dashboards only listen; the one client-to-server message we
//! honor is an application-level `{"type":"ping"}`. Everything else inbound
//! is ignored.

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{sync::mpsc, time};

use super::WebSocketManager;

pub struct WsServerOptions {
    pub ws_ping_sec: u64,
    pub enable_app_ping: bool,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self {
            ws_ping_sec: 30,
            enable_app_ping: true,
        }
    }
}

/// Serves one WebSocket connection subscribed to `topic` until either side
/// closes. Broadcasts from the manager are forwarded as text frames; a
/// periodic WS-level ping keeps intermediaries from dropping idle streams.
pub async fn serve_topic(
    socket: WebSocket,
    manager: WebSocketManager,
    topic: String,
    opts: WsServerOptions,
) {
    let mut rx = manager.subscribe(&topic).await;
    let (mut sink, mut stream) = socket.split();

    // Single writer task; all frames funnel through one queue.
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // Server → client: forward broadcasts on this topic.
    let forward_task = {
        let out_tx = out_tx.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            while let Ok(msg) = rx.recv().await {
                if out_tx.send(Message::Text(msg.into())).await.is_err() {
                    tracing::info!("client disconnected while sending to '{topic}'");
                    break;
                }
            }
        })
    };

    // WS-level periodic ping.
    let ping_task = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            loop {
                time::sleep(std::time::Duration::from_secs(opts.ws_ping_sec)).await;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    };

    // Client → server: answer pings, ignore the rest.
    let receive_task = {
        let out_tx = out_tx.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => {
                        if opts.enable_app_ping && is_app_ping(text.as_str()) {
                            let pong = serde_json::json!({
                                "event": "pong",
                                "topic": topic,
                                "payload": {},
                                "ts": Utc::now().to_rfc3339(),
                            });
                            let _ = out_tx.send(Message::Text(pong.to_string().into())).await;
                        }
                    }
                    Message::Ping(payload) => {
                        let _ = out_tx.send(Message::Pong(payload)).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        })
    };

    let _ = tokio::join!(forward_task, receive_task, ping_task, writer_task);
    tracing::info!("WS session ended for topic '{topic}'");
}

fn is_app_ping(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Object(map)) if map.get("type").and_then(Value::as_str) == Some("ping")
    )
}
