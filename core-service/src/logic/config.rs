//! Assessment configuration
//!
//! Every knob has a default in `crate::constants` and an environment
//! override. Malformed values fall back to the default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Directory containing the scaler / PCA / boundary artifacts
    pub model_dir: PathBuf,
    /// Anomaly scores below this are THREAT
    pub threat_threshold: f64,
    /// Wi-Fi network snapshot (JSON array of records)
    pub wifi_data_file: PathBuf,
    /// Bluetooth scan snapshot (JSON object)
    pub bt_data_file: PathBuf,
    /// Maximum reported Bluetooth distance (meters)
    pub bt_proximity_limit: f64,
    pub poll_interval_ms: u64,
    pub backoff_interval_ms: u64,
    pub max_read_attempts: u32,
    pub broadcast_capacity: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            threat_threshold: DEFAULT_THREAT_THRESHOLD,
            wifi_data_file: PathBuf::from(DEFAULT_WIFI_DATA_FILE),
            bt_data_file: PathBuf::from(DEFAULT_BT_DATA_FILE),
            bt_proximity_limit: DEFAULT_BT_PROXIMITY_LIMIT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            backoff_interval_ms: DEFAULT_BACKOFF_INTERVAL_MS,
            max_read_attempts: DEFAULT_MAX_READ_ATTEMPTS,
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl AssessmentConfig {
    /// Load configuration from `WHISPR_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model_dir: env_path("WHISPR_MODEL_DIR").unwrap_or(defaults.model_dir),
            threat_threshold: env_parse("WHISPR_THREAT_THRESHOLD")
                .filter(|t: &f64| t.is_finite())
                .unwrap_or(defaults.threat_threshold),
            wifi_data_file: env_path("WHISPR_WIFI_DATA_FILE").unwrap_or(defaults.wifi_data_file),
            bt_data_file: env_path("WHISPR_BT_DATA_FILE").unwrap_or(defaults.bt_data_file),
            bt_proximity_limit: env_parse("WHISPR_BT_PROXIMITY_LIMIT")
                .filter(|l: &f64| l.is_finite() && *l >= 0.0)
                .unwrap_or(defaults.bt_proximity_limit),
            poll_interval_ms: env_parse("WHISPR_POLL_INTERVAL_MS")
                .filter(|ms: &u64| *ms > 0)
                .unwrap_or(defaults.poll_interval_ms),
            backoff_interval_ms: env_parse("WHISPR_BACKOFF_INTERVAL_MS")
                .filter(|ms: &u64| *ms > 0)
                .unwrap_or(defaults.backoff_interval_ms),
            max_read_attempts: env_parse("WHISPR_MAX_READ_ATTEMPTS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.max_read_attempts),
            broadcast_capacity: env_parse("WHISPR_BROADCAST_CAPACITY")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.broadcast_capacity),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn backoff_interval(&self) -> Duration {
        Duration::from_millis(self.backoff_interval_ms)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = AssessmentConfig::default();
        assert_eq!(config.threat_threshold, -0.01);
        assert_eq!(config.bt_proximity_limit, 10.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.backoff_interval(), Duration::from_secs(5));
        assert_eq!(config.max_read_attempts, 5);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("WHISPR_TEST_GARBAGE_NUMBER", "not-a-number");
        assert_eq!(env_parse::<f64>("WHISPR_TEST_GARBAGE_NUMBER"), None);
        std::env::set_var("WHISPR_TEST_GARBAGE_NUMBER", " -0.1 ");
        assert_eq!(env_parse::<f64>("WHISPR_TEST_GARBAGE_NUMBER"), Some(-0.1));
        std::env::remove_var("WHISPR_TEST_GARBAGE_NUMBER");
    }
}
