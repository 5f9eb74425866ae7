//! Wi-Fi assessment handler

use std::sync::Arc;

use axum::{extract::State, Json};
use whispr_core::{SnapshotSource, WifiReport};

use crate::error::AppResult;
use crate::AppState;

/// One-shot report for the current snapshot. Also makes sure the live
/// watcher is running so subscribers get subsequent changes.
pub async fn score_signal(State(state): State<AppState>) -> AppResult<Json<WifiReport>> {
    let source = Arc::clone(&state.wifi_source);
    // Marker before payload: a write landing after the marker read is
    // newer than the watcher's seed and will be broadcast
    let (seen, fetched) = tokio::task::spawn_blocking(move || {
        let seen = source.last_modified().ok();
        (seen, source.fetch())
    })
    .await?;

    let networks = fetched.unwrap_or_else(|e| {
        tracing::warn!("Wi-Fi snapshot unavailable, reporting no networks: {}", e);
        Vec::new()
    });

    let report = state.wifi_resolver.resolve(&networks);
    tracing::info!(
        result = %report.risk_level,
        tier = %report.threat_tier,
        "Initial Wi-Fi scan returned"
    );

    if state.start_watcher(seen) {
        tracing::info!("Started background file monitor");
    }

    Ok(Json(report))
}
