//! WHISPR Host Server
//!
//! Exposes the signal threat assessment core over HTTP + WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        WHISPR HOST                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /score_signal ──► WifiThreatResolver (one-shot)        │
//! │          │                                                   │
//! │          └─ ensure_started ──► ChangeWatcher (background)    │
//! │                                     │                        │
//! │  GET /ws ◄──────────── Broadcaster ◄┘                        │
//! │                                                              │
//! │  GET /bluetooth_scan ──► BluetoothReport::from_scan          │
//! │  GET /health                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;


use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whispr_core::{
    BluetoothScan, Broadcaster, ChangeWatcher, FeaturePipeline, JsonFileSource, NetworkRecord,
    ThreatThreshold, WatcherSupervisor, WifiThreatResolver,
};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    init_tracing(config.log_json);

    tracing::info!("{} host v{} starting...", whispr_core::constants::APP_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Wi-Fi snapshot: {}", config.assessment.wifi_data_file.display());
    tracing::info!("Bluetooth snapshot: {}", config.assessment.bt_data_file.display());

    // Load the scoring pipeline once; degrade instead of refusing to start
    let pipeline = FeaturePipeline::load_or_degraded(
        &config.assessment.model_dir,
        ThreatThreshold::new(config.assessment.threat_threshold),
    );

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    // Build application state
    let state = AppState::new(config, pipeline);
    let supervisor = Arc::clone(&state.supervisor);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    supervisor.stop().await;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

pub type WifiSource = JsonFileSource<Vec<NetworkRecord>>;
pub type BluetoothSource = JsonFileSource<BluetoothScan>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub wifi_resolver: WifiThreatResolver,
    pub wifi_source: Arc<WifiSource>,
    pub bt_source: Arc<BluetoothSource>,
    pub broadcaster: Broadcaster,
    pub supervisor: Arc<WatcherSupervisor>,
}

impl AppState {
    pub fn new(config: config::Config, pipeline: FeaturePipeline) -> Self {
        let assessment = &config.assessment;
        let retry_delay = Duration::from_millis(whispr_core::constants::READ_RETRY_DELAY_MS);

        let wifi_source = JsonFileSource::new(&assessment.wifi_data_file)
            .with_retries(assessment.max_read_attempts, retry_delay);
        let bt_source = JsonFileSource::new(&assessment.bt_data_file)
            .with_retries(assessment.max_read_attempts, retry_delay);
        let broadcaster = Broadcaster::new(assessment.broadcast_capacity);

        Self {
            config: Arc::new(config),
            wifi_resolver: WifiThreatResolver::new(pipeline),
            wifi_source: Arc::new(wifi_source),
            bt_source: Arc::new(bt_source),
            broadcaster,
            supervisor: Arc::new(WatcherSupervisor::new()),
        }
    }

    /// Start the Wi-Fi change watcher unless it is already running.
    /// `seen` is the snapshot marker the caller has already answered.
    pub fn start_watcher(&self, seen: Option<SystemTime>) -> bool {
        self.supervisor.ensure_started(|| {
            ChangeWatcher::new(
                Arc::clone(&self.wifi_source),
                self.wifi_resolver.clone(),
                self.broadcaster.clone(),
            )
            .with_intervals(
                self.config.assessment.poll_interval(),
                self.config.assessment.backoff_interval(),
            )
            .seeded_with(seen)
        })
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/score_signal", post(handlers::wifi::score_signal))
        .route("/bluetooth_scan", get(handlers::bluetooth::scan))
        .route("/ws", get(handlers::stream::ws_handler))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
