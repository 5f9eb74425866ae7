//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Runtime overrides are read in `logic::config::AssessmentConfig::from_env`.

/// Default threat threshold on the anomaly score.
///
/// Scores strictly below this value are classified as THREAT.
pub const DEFAULT_THREAT_THRESHOLD: f64 = -0.01;

/// Score reported when the pipeline cannot produce a real score
pub const PROCESSING_ERROR_SCORE: f64 = 999.0;

/// Directory holding the three persisted pipeline stages
pub const DEFAULT_MODEL_DIR: &str = ".";

pub const SCALER_FILE: &str = "whispr_scaler.json";
pub const PCA_FILE: &str = "whispr_pca.json";
pub const MODEL_FILE: &str = "whispr_model.json";

/// Wi-Fi snapshot written by the scan bridge
pub const DEFAULT_WIFI_DATA_FILE: &str = "scan_results.json";

/// Bluetooth snapshot written by the BLE scanner
pub const DEFAULT_BT_DATA_FILE: &str = "threat_results.json";

/// Devices further away than this (meters) are not reported
pub const DEFAULT_BT_PROXIMITY_LIMIT: f64 = 10.0;

/// Watcher cadence (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Watcher backoff while the source is missing or failing (milliseconds)
pub const DEFAULT_BACKOFF_INTERVAL_MS: u64 = 5_000;

/// Snapshot file read attempts before giving up for this tick
pub const DEFAULT_MAX_READ_ATTEMPTS: u32 = 5;

/// Pause between snapshot read attempts (milliseconds)
pub const READ_RETRY_DELAY_MS: u64 = 100;

/// Reports buffered per subscriber before the oldest are dropped
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Product name
pub const APP_NAME: &str = "WHISPR";
