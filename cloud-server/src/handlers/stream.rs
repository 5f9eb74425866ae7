//! Live report stream over WebSocket
//!
//! Every report the change watcher publishes is pushed to each connected
//! client as `{"event": "new_wifi_data", "data": <report>}`.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;
use whispr_core::WifiReport;

use crate::AppState;

pub const NEW_WIFI_DATA_EVENT: &str = "new_wifi_data";

#[derive(Debug, Serialize)]
pub struct StreamFrame<'a> {
    pub event: &'static str,
    pub data: &'a WifiReport,
}

impl<'a> StreamFrame<'a> {
    pub fn new_wifi_data(data: &'a WifiReport) -> Self {
        Self {
            event: NEW_WIFI_DATA_EVENT,
            data,
        }
    }
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let mut reports = state.broadcaster.subscribe();

    tracing::info!(%client_id, "Client connected");

    let forward_task = tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => {
                    let json = match serde_json::to_string(&StreamFrame::new_wifi_data(&report)) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to encode report: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(%client_id, skipped = n, "Client lagged, reports dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Inbound messages are ignored; only close matters
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    forward_task.abort();
    tracing::info!(%client_id, "Client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use whispr_core::{FeaturePipeline, NetworkRecord, ThreatThreshold, WifiThreatResolver};

    #[test]
    fn test_frame_layout() {
        let resolver = WifiThreatResolver::new(FeaturePipeline::unavailable(ThreatThreshold::default()));
        let report = resolver.resolve(&[NetworkRecord::new().with("SSID", "HomeNet").with("Authentication", "WPA2")]);

        let json = serde_json::to_value(StreamFrame::new_wifi_data(&report)).unwrap();
        assert_eq!(json["event"], "new_wifi_data");
        assert_eq!(json["data"]["ssid"], "HomeNet");
        assert_eq!(json["data"]["result"], "PROCESSING_ERROR");
        assert_eq!(json["data"]["threat_tier"], "LOW");
    }
}
