//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;
use whispr_core::EngineStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    engine: EngineStatus,
    subscribers: usize,
    published_reports: u64,
    watcher_running: bool,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.wifi_resolver.pipeline().status();

    Json(HealthResponse {
        status: if engine.model_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        engine,
        subscribers: state.broadcaster.subscriber_count(),
        published_reports: state.broadcaster.published_count(),
        watcher_running: state.supervisor.is_running(),
    })
}
