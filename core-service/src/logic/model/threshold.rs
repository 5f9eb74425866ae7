//! Threat Threshold
//!
//! Decision threshold on the one-class boundary distance. Independent of
//! the value used at training time so deployments can widen or tighten
//! the boundary without refitting.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THREAT_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatThreshold {
    value: f64,
}

impl Default for ThreatThreshold {
    fn default() -> Self {
        Self { value: DEFAULT_THREAT_THRESHOLD }
    }
}

impl ThreatThreshold {
    /// Non-finite values fall back to the default
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self { value }
        } else {
            log::warn!("Ignoring non-finite threat threshold {}, using {}", value, DEFAULT_THREAT_THRESHOLD);
            Self::default()
        }
    }

    pub fn get(&self) -> f64 {
        self.value
    }

    /// Scores strictly below the threshold are threats
    pub fn is_threat(&self, anomaly_score: f64) -> bool {
        anomaly_score < self.value
    }
}
