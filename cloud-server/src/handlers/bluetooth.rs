//! Bluetooth scan handler

use std::sync::Arc;

use axum::{extract::State, Json};
use whispr_core::{BluetoothReport, SnapshotSource};

use crate::error::AppResult;
use crate::AppState;

/// Latest scan, limited to devices within the proximity limit
pub async fn scan(State(state): State<AppState>) -> AppResult<Json<BluetoothReport>> {
    let source = Arc::clone(&state.bt_source);
    let limit = state.config.assessment.bt_proximity_limit;

    let report = match tokio::task::spawn_blocking(move || source.fetch()).await? {
        Ok(scan) => BluetoothReport::from_scan(scan, limit),
        Err(e) => {
            tracing::debug!("No Bluetooth scan available: {}", e);
            BluetoothReport::empty()
        }
    };

    Ok(Json(report))
}
